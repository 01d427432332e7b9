//! Editor configuration.
//!
//! Every field has a default, so a front end can pass a partial JSON object
//! (or nothing) and override only what it cares about.

use mm_core::ViewportConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Maximum history entries kept; the oldest are evicted first.
    pub history_limit: usize,
    /// Quiet period before an edit burst becomes a history entry.
    pub debounce_ms: f64,
    /// How often the live scene is written to recovery storage.
    pub autosave_interval_ms: f64,
    /// Storage key for the recovery snapshot.
    pub recovery_key: String,
    /// Width new stickers are scaled to, in logical units.
    pub sticker_width: f32,
    pub viewport: ViewportConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 50,
            debounce_ms: 400.0,
            autosave_interval_ms: 5000.0,
            recovery_key: "merrymaker.recovery".into(),
            sticker_width: 100.0,
            viewport: ViewportConfig::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            EditorConfig::from_json(r#"{"historyLimit": 10, "viewport": {"maxTotalScale": 3}}"#)
                .unwrap();
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.debounce_ms, 400.0);
        assert_eq!(config.viewport.max_total_scale, 3.0);
        assert_eq!(config.viewport.logical_width, 320.0);
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(EditorConfig::from_json("{}").unwrap(), EditorConfig::default());
    }
}
