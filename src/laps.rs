//! Lap segmentation and distance derivation
//!
//! Lap `n` spans `[beacons[n - 1], beacons[n])` seconds, the last lap being
//! open-ended. Each channel maps that window to sample indices with its own
//! recording frequency, so the same lap covers different index ranges on a
//! 100 Hz and a 20 Hz channel.

use std::ops::Range;

use crate::sidecar::Sidecar;
use crate::{LdError, Result};

/// Time window of one lap in seconds; `end` is `+inf` for an open last lap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LapWindow {
    pub lap: usize,
    pub start: f64,
    pub end: f64,
}

impl LapWindow {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Sample index range `[round(start * f), round(end * f))`, clamped to
    /// `0..n_data`. Empty when `rec_freq` is 0.
    pub fn indices(&self, rec_freq: u16, n_data: usize) -> Range<usize> {
        if rec_freq == 0 {
            return 0..0;
        }
        let freq = rec_freq as f64;
        let to_index = |t: f64| -> usize {
            let scaled = (t * freq).round();
            if scaled.is_nan() || scaled <= 0.0 {
                0
            } else if scaled >= n_data as f64 {
                n_data
            } else {
                scaled as usize
            }
        };
        let start = to_index(self.start);
        let end = to_index(self.end).max(start);
        start..end
    }
}

/// Time window of a 1-based lap.
///
/// # Errors
///
/// [`LdError::LapOutOfRange`] when `lap` is outside `1..=total_laps` or the
/// sidecar has no beacon for the lap start.
pub fn lap_window(lap: usize, sidecar: &Sidecar) -> Result<LapWindow> {
    let beacons = sidecar.beacons();
    let out_of_range = || LdError::LapOutOfRange {
        lap,
        total_laps: sidecar.total_laps(),
        beacons: beacons.len(),
    };

    if lap == 0 || lap > sidecar.total_laps() {
        return Err(out_of_range());
    }
    let start = *beacons.get(lap - 1).ok_or_else(out_of_range)?;
    let end = beacons.get(lap).copied().unwrap_or(f64::INFINITY);
    Ok(LapWindow { lap, start, end })
}

/// Physical samples of one lap.
pub fn slice_for_lap<'a>(
    samples: &'a [f64],
    rec_freq: u16,
    lap: usize,
    sidecar: &Sidecar,
) -> Result<&'a [f64]> {
    let window = lap_window(lap, sidecar)?;
    Ok(&samples[window.indices(rec_freq, samples.len())])
}

/// Cumulative distance over one lap from a velocity channel.
///
/// Rectangular integration: `d[0] = 0`, `d[i] = d[i - 1] + v[i] / rec_freq`.
/// The result has one value per sample of the lap's speed slice and is in
/// the speed channel's units multiplied by seconds.
///
/// # Errors
///
/// [`LdError::LapOutOfRange`] as for [`lap_window`], and
/// [`LdError::InvalidChannel`] when `rec_freq` is 0.
pub fn generate_distance(
    lap: usize,
    sidecar: &Sidecar,
    speed: &[f64],
    rec_freq: u16,
) -> Result<Vec<f64>> {
    if rec_freq == 0 {
        return Err(LdError::invalid_channel(
            "speed",
            "recording frequency is zero, cannot integrate distance",
        ));
    }
    let slice = slice_for_lap(speed, rec_freq, lap, sidecar)?;
    let dt = 1.0 / rec_freq as f64;

    let mut distance = Vec::with_capacity(slice.len());
    let mut total = 0.0;
    for (i, v) in slice.iter().enumerate() {
        if i > 0 {
            total += v * dt;
        }
        distance.push(total);
    }
    Ok(distance)
}
