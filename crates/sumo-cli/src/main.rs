//! `sumo-cli` – host runner for the sumo controller
//!
//! This binary runs the full controller on the development machine.  It:
//!
//! 1. Installs structured logging (`RUST_LOG`, `SUMO_LOG_FORMAT=json`,
//!    optional OTLP export).
//! 2. Loads the session preset from `$SUMO_PRESET` or `./sumo.toml`, with
//!    `SUMO_*` environment overrides.
//! 3. Wires the controller to simulated peripherals paced by the wall clock,
//!    with stdin as the keyboard channel.
//! 4. Echoes every hardware command until **Ctrl-C**, then halts the drive
//!    and the weapon.

mod config;
mod keyboard;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

use sumo_hal::SystemClock;
use sumo_hal::sim::{HwEvent, SimRig};
use sumo_kernel::Configuration;
use sumo_runtime::{Controller, init_tracing};

use crate::config::HostConfig;
use crate::keyboard::StdinKeys;

fn main() {
    let _telemetry = init_tracing("sumo");

    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – halting motors …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; the loop can only be stopped by killing the process");
    }

    // ── Preset ────────────────────────────────────────────────────────────
    let path = config::preset_path();
    let mut host = match config::load() {
        Ok(Some(host)) => {
            println!("  Preset loaded from {}", path.display().to_string().bold());
            host
        }
        Ok(None) => {
            println!(
                "  No preset at {}; using defaults.",
                path.display().to_string().dimmed()
            );
            HostConfig::default()
        }
        Err(e) => {
            warn!(error = %e, "preset rejected; using defaults");
            println!("{}: {}", "Preset error".red(), e);
            println!("  Using default configuration.");
            HostConfig::default()
        }
    };
    config::apply_env_overrides(&mut host);

    let cfg = Configuration::from_preset(&host.robot);
    print_session(&host, &cfg);

    // ── Controller ────────────────────────────────────────────────────────
    let rig = SimRig::full()
        .with_console_input(Box::new(StdinKeys::spawn()))
        .with_clock(Box::new(SystemClock::new()));
    let world = rig.world();
    let mut controller = Controller::new(rig.build(), cfg, host.profile);

    let mut echo = Echo::default();
    controller.run(&shutdown, || echo.flush(world.take_journal()));
    println!("{}", "  ✓ Controller stopped.".green());
}

// ─────────────────────────────────────────────────────────────────────────────
// Command echo
// ─────────────────────────────────────────────────────────────────────────────

/// Prints hardware commands, collapsing runs of identical ones (the drive
/// command is reissued every tick).
#[derive(Default)]
struct Echo {
    last: Option<HwEvent>,
}

impl Echo {
    fn flush(&mut self, events: Vec<HwEvent>) {
        for event in events {
            if self.last.as_ref() == Some(&event) {
                continue;
            }
            println!("  {} {:?}", "»".dimmed(), event);
            self.last = Some(event);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   _____ __  ______  ___ "#.bold().cyan());
    println!("{}", r#"  / ___// / / /  |/  /___ "#.bold().cyan());
    println!("{}", r#"  \__ \/ / / / /|_/ / __ \"#.bold().cyan());
    println!("{}", r#" ___/ / /_/ / /  / / /_/ /"#.bold().cyan());
    println!("{}", r#"/____/\____/_/  /_/\____/ "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "sumo".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Sumo robot controller (host simulation)");
    println!();
}

fn print_session(host: &HostConfig, cfg: &Configuration) {
    println!();
    println!(
        "  Modes {}   defeat {}   console {}   tick {} ms",
        format!("{:?}", host.profile.modes).bold(),
        format!("{:?}", host.profile.defeat).bold(),
        format!("{:?}", host.profile.console).bold(),
        host.profile.tick_ms
    );
    println!(
        "  Max speed {} mm/s   strike {}°   ghost {}",
        cfg.max_speed(),
        cfg.strike_angle(),
        cfg.ghost_mode()
    );
    println!();
    println!(
        "  Keys (then Enter): {} forward  {} back  {} left  {} right  {} strike  {} release",
        "w".bold().cyan(),
        "s".bold().cyan(),
        "a".bold().cyan(),
        "d".bold().cyan(),
        "space".bold().cyan(),
        "x".bold().cyan()
    );
    println!();
}
