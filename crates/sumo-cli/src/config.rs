//! Host preset – reads `$SUMO_PRESET` or `./sumo.toml`.
//!
//! ```toml
//! [profile]
//! modes = "three"
//! defeat = "latch"
//! console = "tuning"
//!
//! [robot]
//! gears = [400, 700, 1000]
//! gear = 2
//! ghost_mode = true
//! ```
//!
//! The preset only seeds the session.  Edits made on the robot's console are
//! never written back.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use sumo_kernel::ConfigPreset;
use sumo_runtime::ControllerProfile;
use sumo_types::{ModeSet, SumoError};

/// Environment variable naming the preset file.
pub const PRESET_VAR: &str = "SUMO_PRESET";

/// Preset file looked up in the working directory when [`PRESET_VAR`] is
/// unset.
pub const DEFAULT_PRESET_FILE: &str = "sumo.toml";

/// Everything the host binary needs to start a controller.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Controller generation: mode set, defeat policy, console layout, tick.
    pub profile: ControllerProfile,
    /// Starting parameter values and feature flags.
    pub robot: ConfigPreset,
}

/// `$SUMO_PRESET`, or `./sumo.toml`.
pub fn preset_path() -> PathBuf {
    std::env::var(PRESET_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_PRESET_FILE))
}

/// Load the preset from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<HostConfig>, SumoError> {
    load_from(&preset_path())
}

pub(crate) fn load_from(path: &Path) -> Result<Option<HostConfig>, SumoError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        SumoError::Preset(format!("failed to read {}: {}", path.display(), e))
    })?;
    let cfg: HostConfig = toml::from_str(&raw)
        .map_err(|e| SumoError::Preset(format!("failed to parse {}: {}", path.display(), e)))?;
    Ok(Some(cfg))
}

/// Apply `SUMO_*` environment variable overrides to `cfg`.
///
/// | Variable | Field |
/// |---|---|
/// | `SUMO_TICK_MS` | `profile.tick_ms` |
/// | `SUMO_MODES` | `profile.modes` (`three` / `four`) |
/// | `SUMO_VOLUME` | `robot.volume` |
/// | `SUMO_GHOST` | `robot.ghost_mode` |
///
/// Unparseable values are ignored.
pub fn apply_env_overrides(cfg: &mut HostConfig) {
    apply_overrides(cfg, |key| std::env::var(key).ok());
}

pub(crate) fn apply_overrides(cfg: &mut HostConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("SUMO_TICK_MS")
        && let Ok(ms) = v.trim().parse::<u64>()
        && ms > 0
    {
        cfg.profile.tick_ms = ms;
    }
    if let Some(v) = var("SUMO_MODES") {
        match v.trim().to_ascii_lowercase().as_str() {
            "three" | "3" => cfg.profile.modes = ModeSet::Three,
            "four" | "4" => cfg.profile.modes = ModeSet::Four,
            _ => {}
        }
    }
    if let Some(v) = var("SUMO_VOLUME")
        && let Ok(volume) = v.trim().parse::<i32>()
    {
        cfg.robot.volume = Some(volume);
    }
    if let Some(v) = var("SUMO_GHOST")
        && let Some(on) = parse_switch(&v)
    {
        cfg.robot.ghost_mode = Some(on);
    }
}

fn parse_switch(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
