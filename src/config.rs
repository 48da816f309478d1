//! Decoder and export configuration
//!
//! Both structures deserialize from YAML with every key optional:
//!
//! ```yaml
//! channels: [SPEED, BRAKE, THROTTLE]
//! speed_scale: 3.6
//! include_distance: true
//! decoder:
//!   eager_samples: false
//! ```

use serde::{Deserialize, Serialize};

use crate::Result;

/// Options controlling [`crate::LogDecoder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Reconstruct every channel's samples during decode instead of on first access
    pub eager_samples: bool,
    /// Log a warning when the header's channel count disagrees with the list
    pub check_channel_count: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self { eager_samples: true, check_channel_count: true }
    }
}

/// Options for rendering a session to export files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Channels written per lap
    pub channels: Vec<String>,
    /// Velocity channel, scaled for display and integrated into distance
    pub speed_channel: String,
    /// Display factor applied to the speed channel (m/s to km/h by default)
    pub speed_scale: f64,
    /// Separator between rendered values
    pub line_separator: String,
    /// Also write a per-lap distance channel
    pub include_distance: bool,
    pub decoder: DecoderConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            channels: ["SPEED", "BRAKE", "STEERANGLE", "THROTTLE", "GEAR"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
            speed_channel: "SPEED".to_string(),
            speed_scale: 3.6,
            line_separator: "\r\n".to_string(),
            include_distance: false,
            decoder: DecoderConfig::default(),
        }
    }
}

impl ExportConfig {
    /// Parses a YAML document, falling back to defaults for missing keys.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Display scale for a channel: `speed_scale` for the speed channel, 1 otherwise.
    pub fn display_scale(&self, channel: &str) -> f64 {
        if channel == self.speed_channel { self.speed_scale } else { 1.0 }
    }
}
