//! Persisted filter configuration
//!
//! A flat string-keyed map on disk; the UI shell re-serializes it on every
//! toggle. Unknown keys round-trip untouched so older and newer shells can
//! share one file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::types::{SpeedCompare, TriState};

// ============================================================================
// KEYS
// ============================================================================

pub const KEY_MISMATCH: &str = "mismatchFilter";
pub const KEY_CABLE_FAULT: &str = "cableFaultFilter";
pub const KEY_CONGESTION: &str = "congestionFilter";
pub const KEY_DUPLEX: &str = "duplexFilter";
pub const KEY_NEW_CONGESTION: &str = "newCongestionFilter";
pub const KEY_INITIAL_PEAK_SPEED: &str = "initialPeakSpeedFilter";
/// Comma-joined list of client addresses excluded from every view.
pub const KEY_DISABLED: &str = "disabled";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO Error: {}", e),
            ConfigError::Serialization(e) => write!(f, "Serialization Error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serialization(err)
    }
}

// ============================================================================
// CONFIG
// ============================================================================

/// Filter state as persisted between sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub mismatch: TriState,
    pub cable_fault: TriState,
    pub congestion: TriState,
    pub duplex: TriState,
    pub new_congestion: TriState,
    pub initial_peak_speed: SpeedCompare,
    /// Excluded client addresses, stored comma-joined.
    pub disabled: Vec<String>,
    /// Keys this engine does not interpret, preserved across save.
    pub extra: HashMap<String, String>,
}

fn tri_from(map: &HashMap<String, String>, key: &str) -> TriState {
    match map.get(key).map(|v| v.parse::<i64>()) {
        None => TriState::default(),
        Some(Ok(code)) => TriState::from_code(code).unwrap_or_else(|| {
            log::warn!("{}={} out of range, using default", key, code);
            TriState::default()
        }),
        Some(Err(_)) => {
            log::warn!("{} is not a number, using default", key);
            TriState::default()
        }
    }
}

impl FilterConfig {
    /// Default on-disk location.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("netdiag")
            .join("filters_v1.json")
    }

    /// Build from a flat key/value map; malformed values fall back to the
    /// defaults with a warning.
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        let known = [
            KEY_MISMATCH,
            KEY_CABLE_FAULT,
            KEY_CONGESTION,
            KEY_DUPLEX,
            KEY_NEW_CONGESTION,
            KEY_INITIAL_PEAK_SPEED,
            KEY_DISABLED,
        ];
        let initial_peak_speed = match map.get(KEY_INITIAL_PEAK_SPEED).map(|v| v.parse::<i64>()) {
            None => SpeedCompare::default(),
            Some(Ok(code)) => SpeedCompare::from_code(code).unwrap_or_else(|| {
                log::warn!("{}={} out of range, using default", KEY_INITIAL_PEAK_SPEED, code);
                SpeedCompare::default()
            }),
            Some(Err(_)) => {
                log::warn!("{} is not a number, using default", KEY_INITIAL_PEAK_SPEED);
                SpeedCompare::default()
            }
        };
        let disabled = map
            .get(KEY_DISABLED)
            .map(|joined| {
                joined
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        FilterConfig {
            mismatch: tri_from(map, KEY_MISMATCH),
            cable_fault: tri_from(map, KEY_CABLE_FAULT),
            congestion: tri_from(map, KEY_CONGESTION),
            duplex: tri_from(map, KEY_DUPLEX),
            new_congestion: tri_from(map, KEY_NEW_CONGESTION),
            initial_peak_speed,
            disabled,
            extra: map
                .iter()
                .filter(|(k, _)| !known.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Flatten back into the key/value map, unknown keys included.
    pub fn to_map(&self) -> HashMap<String, String> {
        let mut map = self.extra.clone();
        map.insert(KEY_MISMATCH.into(), self.mismatch.code().to_string());
        map.insert(KEY_CABLE_FAULT.into(), self.cable_fault.code().to_string());
        map.insert(KEY_CONGESTION.into(), self.congestion.code().to_string());
        map.insert(KEY_DUPLEX.into(), self.duplex.code().to_string());
        map.insert(
            KEY_NEW_CONGESTION.into(),
            self.new_congestion.code().to_string(),
        );
        map.insert(
            KEY_INITIAL_PEAK_SPEED.into(),
            self.initial_peak_speed.code().to_string(),
        );
        map.insert(KEY_DISABLED.into(), self.disabled.join(","));
        map
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read(path)?;
        let map: HashMap<String, String> = serde_json::from_slice(&data)?;
        Ok(FilterConfig::from_map(&map))
    }

    /// Load, or fall back to defaults when the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        match FilterConfig::load(path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                FilterConfig::default()
            }
            Err(e) => {
                log::warn!("filter config unreadable ({}), using defaults", e);
                FilterConfig::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(&self.to_map())?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
