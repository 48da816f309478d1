//! Serializable session snapshot and plain-text sample rendering
//!
//! Rendering is pure: nothing here touches the filesystem. The `ldx-export`
//! binary decides where the rendered text lands.

use serde::Serialize;
use tracing::warn;

use crate::Result;
use crate::config::ExportConfig;
use crate::session::Session;
use crate::sidecar::SessionSummary;
use crate::types::{Channel, Event, Header, NumericKind};

/// Everything known about a session, ready for `serde_json`.
#[derive(Debug, Serialize)]
pub struct SessionExport<'a> {
    pub header: &'a Header,
    pub event: Option<&'a Event>,
    pub beacons: &'a [f64],
    pub summary: &'a SessionSummary,
    pub channels: Vec<ChannelExport<'a>>,
}

/// Channel metadata plus its physical samples.
#[derive(Debug, Serialize)]
pub struct ChannelExport<'a> {
    #[serde(flatten)]
    pub channel: &'a Channel,
    pub kind: NumericKind,
    /// `None` for metadata-only channels and channels that failed to decode
    pub data: Option<&'a [f64]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<'a> SessionExport<'a> {
    /// Snapshot of a session. Channels whose samples cannot be reconstructed
    /// are kept with their metadata and the error message.
    pub fn from_session(session: &'a Session) -> Self {
        let log = session.log();
        let channels = log
            .channels()
            .iter()
            .map(|channel| {
                let (data, error) = match log.samples(channel) {
                    Ok(data) => (data, None),
                    Err(err) => {
                        warn!("Exporting channel '{}' without samples: {}", channel.name, err);
                        (None, Some(err.to_string()))
                    }
                };
                ChannelExport { channel, kind: channel.kind(), data, error }
            })
            .collect();

        Self {
            header: log.header(),
            event: log.event(),
            beacons: session.sidecar().beacons(),
            summary: session.sidecar().summary(),
            channels,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Joins `values * scale` with `separator`, one value per entry.
pub fn render_samples(values: &[f64], scale: f64, separator: &str) -> String {
    values
        .iter()
        .map(|value| (value * scale).to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Text of one channel over one lap, scaled for display.
pub fn render_lap_channel(
    session: &Session,
    lap: usize,
    channel: &str,
    config: &ExportConfig,
) -> Result<String> {
    let samples = session.lap_channel(lap, channel)?;
    Ok(render_samples(samples, config.display_scale(channel), &config.line_separator))
}

/// Text of the integrated distance over one lap, in the speed channel's units times seconds.
pub fn render_lap_distance(session: &Session, lap: usize, config: &ExportConfig) -> Result<String> {
    let distance = session.lap_distance(lap, &config.speed_channel)?;
    Ok(render_samples(&distance, 1.0, &config.line_separator))
}
