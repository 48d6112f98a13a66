//! Widget configuration.
//!
//! Every field has a default so a host page can pass a partial JSON object
//! (or nothing at all).

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WidgetConfig {
    pub highlight: HighlightConfig,
    pub tracker: TrackerConfig,
    /// How long the "Copied!" acknowledgment stays up, in milliseconds.
    pub copy_ack_ms: u32,
    /// Highlight everything before the first paint instead of showing a
    /// loading indicator.
    pub precompute: bool,
}

/// Fixed language and theme applied to every section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HighlightConfig {
    /// Grammar token, matched against syntax names and file extensions.
    pub language: SmolStr,
    /// Name of a bundled syntect theme.
    pub theme: SmolStr,
}

/// Geometry parameters for active-section selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerConfig {
    /// Anchor position as a fraction of viewport height, from the top.
    pub anchor_ratio: f64,
    /// Viewport height assumed when the real one cannot be read.
    pub fallback_viewport_height: f64,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            highlight: HighlightConfig::default(),
            tracker: TrackerConfig::default(),
            copy_ack_ms: 2000,
            precompute: false,
        }
    }
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            language: SmolStr::new_static("javascript"),
            theme: SmolStr::new_static("base16-ocean.dark"),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            anchor_ratio: 0.15,
            fallback_viewport_height: 800.0,
        }
    }
}

impl TrackerConfig {
    /// Anchor offset for a viewport height, falling back when the height is
    /// missing, non-finite or not positive.
    pub fn anchor_for(&self, viewport_height: Option<f64>) -> f64 {
        let height = viewport_height
            .filter(|h| h.is_finite() && *h > 0.0)
            .unwrap_or(self.fallback_viewport_height);
        height * self.anchor_ratio
    }
}
