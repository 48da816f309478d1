//! Sample reconstruction
//!
//! Turns a channel's raw sample array into physical values:
//!
//! ```text
//! physical = ((raw / scale) * 10^(-dec_places) + shift) * mul
//! ```
//!
//! The formula is applied in `f64` to integer and float samples alike.

use crate::types::{Channel, NumericKind};
use crate::{LdError, Result};
use tracing::trace;

/// Applies the channel's scaling parameters to a single raw value.
///
/// Callers must ensure `channel.scale != 0`; [`reconstruct`] checks it.
pub fn physical_value(raw: f64, channel: &Channel) -> f64 {
    ((raw / channel.scale as f64) * 10f64.powi(-(channel.dec_places as i32))
        + channel.shift as f64)
        * channel.mul as f64
}

/// Inverse of [`physical_value`], for `mul != 0` and `scale != 0`.
pub fn raw_value(physical: f64, channel: &Channel) -> f64 {
    (physical / channel.mul as f64 - channel.shift as f64) * channel.scale as f64
        / 10f64.powi(-(channel.dec_places as i32))
}

/// Decodes `channel.n_data` samples at `channel.data_ptr` and converts them
/// to physical values.
///
/// # Errors
///
/// - [`LdError::UnsupportedType`] for unresolved type codes and for Float16
/// - [`LdError::TruncatedRecord`] when the array extends past the buffer
/// - [`LdError::InvalidChannel`] when `scale` is 0
pub fn reconstruct(channel: &Channel, buffer: &[u8]) -> Result<Vec<f64>> {
    let kind = channel.kind();
    let width = match (kind.is_decodable(), kind.size()) {
        (true, Some(width)) => width,
        _ => {
            return Err(LdError::UnsupportedType {
                channel: channel.name.clone(),
                type_class: channel.datatype_a,
                type_code: channel.datatype,
            });
        }
    };

    let start = channel.data_ptr as usize;
    let count = channel.n_data as usize;
    let needed = count.checked_mul(width).ok_or_else(|| {
        LdError::truncated(format!("sample array of '{}'", channel.name), start, usize::MAX, 0)
    })?;
    let bytes = start
        .checked_add(needed)
        .and_then(|end| buffer.get(start..end))
        .ok_or_else(|| {
            LdError::truncated(
                format!("sample array of '{}'", channel.name),
                start,
                needed,
                buffer.len().saturating_sub(start),
            )
        })?;

    // a truncated array is structural and takes precedence over bad scaling
    if channel.scale == 0 {
        return Err(LdError::invalid_channel(&channel.name, "scale factor is zero"));
    }

    trace!("Reconstructing {} {:?} samples of '{}' at {:#x}", count, kind, channel.name, start);

    let samples = bytes
        .chunks_exact(width)
        .map(|chunk| {
            let raw = match kind {
                NumericKind::Int16 => i16::from_le_bytes([chunk[0], chunk[1]]) as f64,
                NumericKind::Int32 => {
                    i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as f64
                }
                NumericKind::Float32 => {
                    f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as f64
                }
                // rejected above
                NumericKind::Float16 | NumericKind::Unresolved => f64::NAN,
            };
            physical_value(raw, channel)
        })
        .collect();

    Ok(samples)
}
