//! Tunables of the session manager.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ─── Config ───────────────────────────────────────────────────────────────

/// Timing and interaction settings.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Quiet period after the last inputs-list edit before the graph is
    /// updated. Default: **100 ms**.
    pub inputs_debounce_ms: u64,

    /// Delay of a scheduled tree rebuild. Default: **0** (next tick).
    pub tree_update_delay_ms: u64,

    /// Delay of a scheduled folder re-sort after drops. Default: **0**.
    pub folder_sort_delay_ms: u64,

    /// Half-size in pixels of the square around a corner that grabs it.
    pub corner_grab_radius: f64,

    /// Smallest scale a corner drag may produce.
    pub min_scale: f64,

    /// Directory searched for auxiliary panel resources.
    pub support_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inputs_debounce_ms: 100,
            tree_update_delay_ms: 0,
            folder_sort_delay_ms: 0,
            corner_grab_radius: 25.0,
            min_scale: 0.01,
            support_dir: None,
        }
    }
}

impl SessionConfig {
    pub fn inputs_debounce(&self) -> Duration {
        Duration::from_millis(self.inputs_debounce_ms)
    }

    pub fn tree_update_delay(&self) -> Duration {
        Duration::from_millis(self.tree_update_delay_ms)
    }

    pub fn folder_sort_delay(&self) -> Duration {
        Duration::from_millis(self.folder_sort_delay_ms)
    }

    /// Parse a JSON config.
    pub fn from_json(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|e| format!("invalid config: {e}"))
    }

    /// Read and parse a JSON config file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        Self::from_json(&text)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg = SessionConfig::from_json(r#"{ "inputs_debounce_ms": 250 }"#).unwrap();
        assert_eq!(cfg.inputs_debounce(), Duration::from_millis(250));
        assert_eq!(cfg.corner_grab_radius, 25.0);
        assert_eq!(cfg.tree_update_delay(), Duration::ZERO);
    }

    #[test]
    fn bad_config_is_an_error() {
        assert!(SessionConfig::from_json("{ \"min_scale\": \"tiny\" }").is_err());
    }
}
