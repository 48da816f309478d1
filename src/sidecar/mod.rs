//! Lap sidecar: beacon timestamps and session totals
//!
//! The logger writes lap markers and a session summary next to the binary
//! log in an XML sidecar. [`ldx::parse_ldx`] extracts them; segmentation only
//! consumes the resulting [`Sidecar`].

pub mod ldx;

use serde::{Deserialize, Serialize};

use crate::{LdError, Result};

pub use ldx::parse_ldx;

/// Session totals reported by the logger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub total_laps: usize,
    /// 1-based lap index of the fastest lap
    pub fastest_lap: usize,
    /// Fastest lap time as written by the logger, e.g. `2:17.871`
    pub fastest_time: String,
}

impl SessionSummary {
    /// Fastest lap time in seconds, accepting `ss.fff`, `m:ss.fff` and `h:mm:ss.fff`.
    pub fn fastest_time_seconds(&self) -> Option<f64> {
        let text = self.fastest_time.trim();
        if text.is_empty() {
            return None;
        }
        let parts: Vec<&str> = text.split(':').collect();
        if parts.len() > 3 {
            return None;
        }
        parts.iter().try_fold(0.0, |acc, part| {
            let value: f64 = part.trim().parse().ok()?;
            (value.is_finite() && value >= 0.0).then_some(acc * 60.0 + value)
        })
    }
}

/// Lap boundaries plus session totals for one log.
///
/// `beacons[0]` is the session start and `beacons[i]` the start of lap
/// `i + 1`, in seconds. Beacons never decrease.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sidecar {
    beacons: Vec<f64>,
    summary: SessionSummary,
}

impl Sidecar {
    /// # Errors
    ///
    /// [`LdError::Sidecar`] when a beacon is not finite or precedes its predecessor.
    pub fn new(beacons: Vec<f64>, summary: SessionSummary) -> Result<Self> {
        if let Some(index) = beacons.iter().position(|t| !t.is_finite()) {
            return Err(LdError::sidecar(
                "beacon validation",
                format!("beacon {} is not a finite timestamp", index),
            ));
        }
        if let Some(index) = beacons.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(LdError::sidecar(
                "beacon validation",
                format!(
                    "beacon {} ({}s) precedes beacon {} ({}s)",
                    index + 1,
                    beacons[index + 1],
                    index,
                    beacons[index]
                ),
            ));
        }
        Ok(Self { beacons, summary })
    }

    pub fn beacons(&self) -> &[f64] {
        &self.beacons
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    pub fn total_laps(&self) -> usize {
        self.summary.total_laps
    }

    /// Lap numbers `1..=total_laps`.
    pub fn laps(&self) -> std::ops::RangeInclusive<usize> {
        1..=self.summary.total_laps
    }
}
