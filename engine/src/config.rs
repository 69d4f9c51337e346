use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::input::TapTracker;

/// Window, input and asset settings. Every field has a default, so a config
/// file only needs the keys it wants to change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub title: String,
    /// Logical window size, which is also the scene size.
    pub width: u32,
    pub height: u32,
    pub asset_dir: PathBuf,
    /// `env_logger` filter; `RUST_LOG` overrides it.
    pub log_filter: String,
    /// Two presses closer than this (and within `tap_slop`) are one double tap.
    pub tap_window_ms: u64,
    pub tap_slop: f32,
    pub audio: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "engine".to_owned(),
            width: 1024,
            height: 768,
            asset_dir: PathBuf::from("assets"),
            log_filter: "info".to_owned(),
            tap_window_ms: 300,
            tap_slop: 12.0,
            audio: true,
        }
    }
}

impl EngineConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn tap_tracker(&self) -> TapTracker {
        TapTracker::new(Duration::from_millis(self.tap_window_ms), self.tap_slop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = EngineConfig::from_toml("title = \"cards\"\naudio = false\n").unwrap();
        assert_eq!(config.title, "cards");
        assert!(!config.audio);
        assert_eq!(config.width, 1024);
        assert_eq!(config.tap_window_ms, 300);
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(EngineConfig::from_toml("width = \"wide\"").is_err());
    }
}
