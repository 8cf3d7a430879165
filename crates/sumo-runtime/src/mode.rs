//! [`ModeMachine`] – the active operating mode and the hack counter.

use sumo_hal::hub::StatusLight;
use sumo_hal::remote::Remote;
use sumo_types::{Mode, ModeSet};
use tracing::{debug, info};

/// Exactly one active [`Mode`] out of a [`ModeSet`].
///
/// Modes change only by [`cycle`][Self::cycle] (remote centre-button edge)
/// or by a successful [`hack`][Self::hack].  The hack counter is never
/// reset during a session.
#[derive(Debug, Clone)]
pub struct ModeMachine {
    set: ModeSet,
    mode: Mode,
    hacks_used: i32,
}

impl ModeMachine {
    /// Start in [`Mode::Drive`].
    pub fn new(set: ModeSet) -> Self {
        Self {
            set,
            mode: Mode::Drive,
            hacks_used: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn hacks_used(&self) -> i32 {
        self.hacks_used
    }

    /// Advance to the next mode of the set, wrapping around.
    pub fn cycle(&mut self) -> Mode {
        let from = self.mode;
        self.mode = self.set.next(from);
        info!(from = %from, to = %self.mode, "mode change");
        self.mode
    }

    /// Spend one hack and force [`Mode::CombatSemi`].  No-op (returns
    /// `false`) once `limit` hacks have been used or when the set has no
    /// hacker mode.
    pub fn hack(&mut self, limit: i32) -> bool {
        if !self.set.contains(Mode::Hacker) || self.hacks_used >= limit {
            debug!(used = self.hacks_used, limit, "hack refused");
            return false;
        }
        self.hacks_used += 1;
        let from = self.mode;
        self.mode = Mode::CombatSemi;
        info!(from = %from, used = self.hacks_used, limit, "hack applied");
        true
    }

    /// Show the mode colour on the hub light and, when connected, on the
    /// remote.
    pub fn indicate(&self, light: &mut dyn StatusLight, remote: &mut Option<Box<dyn Remote>>) {
        let color = self.mode.color();
        light.on(color);
        if let Some(remote) = remote.as_mut() {
            // The link may have dropped since the last read; the next tick
            // notices and reconnects.
            let _ = remote.set_light(color);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sumo_hal::sim::{HwEvent, SimRig};
    use sumo_types::Color;

    #[test]
    fn cycle_is_modulo_set_size() {
        for set in [ModeSet::Three, ModeSet::Four] {
            let mut m = ModeMachine::new(set);
            for _ in 0..set.count() {
                m.cycle();
            }
            assert_eq!(m.mode(), Mode::Drive);
        }
    }

    #[test]
    fn hack_forces_combat_semi_until_limit() {
        let mut m = ModeMachine::new(ModeSet::Four);
        for _ in 0..3 {
            m.cycle();
        }
        assert_eq!(m.mode(), Mode::Hacker);

        assert!(m.hack(2));
        assert_eq!(m.mode(), Mode::CombatSemi);
        assert!(m.hack(2));
        assert_eq!(m.hacks_used(), 2);

        m.cycle();
        m.cycle();
        assert_eq!(m.mode(), Mode::Hacker);
        assert!(!m.hack(2));
        assert_eq!(m.mode(), Mode::Hacker);
        assert_eq!(m.hacks_used(), 2);
    }

    #[test]
    fn three_mode_set_never_hacks() {
        let mut m = ModeMachine::new(ModeSet::Three);
        assert!(!m.hack(3));
        assert_eq!(m.hacks_used(), 0);
    }

    #[test]
    fn indicate_sets_hub_and_remote() {
        let rig = SimRig::full();
        let world = rig.world();
        let mut p = rig.build();
        let mut remote = p.link.connect(0).ok();

        let mut m = ModeMachine::new(ModeSet::Four);
        m.cycle();
        m.indicate(p.light.as_mut(), &mut remote);

        let journal = world.journal();
        assert!(journal.contains(&HwEvent::Light(Color::Orange)));
        assert!(journal.contains(&HwEvent::RemoteLight(Color::Orange)));
    }

    #[test]
    fn indicate_tolerates_dead_remote() {
        let rig = SimRig::full();
        let world = rig.world();
        let mut p = rig.build();
        let mut remote = p.link.connect(0).ok();
        world.set_remote_online(false);

        let m = ModeMachine::new(ModeSet::Four);
        m.indicate(p.light.as_mut(), &mut remote);
        assert!(world.journal().contains(&HwEvent::Light(Color::Green)));
        assert!(!world.journal().contains(&HwEvent::RemoteLight(Color::Green)));
    }
}
