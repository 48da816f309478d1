//! Channel metadata and memoized sample storage

use serde::Serialize;
use std::sync::OnceLock;

use super::{NumericKind, resolve};
use crate::Result;
use crate::format::Record;
use crate::samples;

/// One node of the channel list plus its lazily reconstructed samples.
///
/// `prev_ptr`/`next_ptr` are the neighbor record offsets (0 at either end of
/// the list), `ptr` the offset this record was decoded from. A channel with
/// `data_ptr == 0` carries metadata only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Channel {
    pub ptr: u32,
    pub prev_ptr: u32,
    pub next_ptr: u32,
    pub data_ptr: u32,
    pub n_data: u32,
    pub counter: u16,
    #[serde(rename = "datatypeA")]
    pub datatype_a: u16,
    pub datatype: u16,
    /// Samples per second
    pub rec_freq: u16,
    pub shift: i16,
    pub mul: i16,
    pub scale: i16,
    pub dec_places: i16,
    pub name: String,
    pub short_name: String,
    pub unit: String,
    #[serde(skip)]
    samples: OnceLock<Vec<f64>>,
}

impl Channel {
    pub(crate) fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            ptr: record.offset() as u32,
            prev_ptr: record.u32("prev_ptr")?,
            next_ptr: record.u32("next_ptr")?,
            data_ptr: record.u32("data_ptr")?,
            n_data: record.u32("n_data")?,
            counter: record.u16("counter")?,
            datatype_a: record.u16("datatype_a")?,
            datatype: record.u16("datatype")?,
            rec_freq: record.u16("rec_freq")?,
            shift: record.i16("shift")?,
            mul: record.i16("mul")?,
            scale: record.i16("scale")?,
            dec_places: record.i16("dec_places")?,
            name: record.string("name")?,
            short_name: record.string("short_name")?,
            unit: record.string("unit")?,
            samples: OnceLock::new(),
        })
    }

    /// Numeric kind resolved from the two type-code fields.
    pub fn kind(&self) -> NumericKind {
        resolve(self.datatype_a, self.datatype)
    }

    /// Whether the channel points at a sample array.
    pub fn has_data(&self) -> bool {
        self.data_ptr != 0
    }

    /// Samples already reconstructed, without touching the buffer.
    pub fn cached_samples(&self) -> Option<&[f64]> {
        self.samples.get().map(Vec::as_slice)
    }

    /// Physical samples of this channel, reconstructed from `buffer` on first
    /// access and cached afterwards. `Ok(None)` for metadata-only channels.
    ///
    /// `buffer` must be the buffer the channel was decoded from. Failures are
    /// not cached, so a failed channel fails again on the next call.
    pub(crate) fn samples(&self, buffer: &[u8]) -> Result<Option<&[f64]>> {
        if !self.has_data() {
            return Ok(None);
        }
        if let Some(cached) = self.samples.get() {
            return Ok(Some(cached));
        }
        let decoded = samples::reconstruct(self, buffer)?;
        // a concurrent fill computed the same values from the same bytes
        Ok(Some(self.samples.get_or_init(|| decoded)))
    }

    /// Duration covered by the samples in seconds, 0 when `rec_freq` is 0.
    pub fn duration(&self) -> f64 {
        if self.rec_freq == 0 { 0.0 } else { self.n_data as f64 / self.rec_freq as f64 }
    }
}

impl PartialEq for Channel {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
            && self.prev_ptr == other.prev_ptr
            && self.next_ptr == other.next_ptr
            && self.data_ptr == other.data_ptr
            && self.n_data == other.n_data
            && self.counter == other.counter
            && self.datatype_a == other.datatype_a
            && self.datatype == other.datatype
            && self.rec_freq == other.rec_freq
            && self.shift == other.shift
            && self.mul == other.mul
            && self.scale == other.scale
            && self.dec_places == other.dec_places
            && self.name == other.name
            && self.short_name == other.short_name
            && self.unit == other.unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::channel_with;

    #[test]
    fn metadata_only_channel_has_no_samples() -> Result<()> {
        let channel = channel_with(0x03, 2, 0, 10);
        assert!(!channel.has_data());
        assert_eq!(channel.samples(&[])?, None);
        assert!(channel.cached_samples().is_none());
        Ok(())
    }

    #[test]
    fn samples_are_memoized() -> Result<()> {
        let mut buffer = vec![0u8; 4];
        buffer.extend(5i16.to_le_bytes());
        buffer.extend(6i16.to_le_bytes());
        let channel = channel_with(0x00, 2, 4, 2);

        assert!(channel.cached_samples().is_none());
        let first = channel.samples(&buffer)?.map(<[f64]>::to_vec);
        assert_eq!(first, Some(vec![5.0, 6.0]));

        // served from the cache, the buffer is not read again
        assert_eq!(channel.samples(&[])?, Some(&[5.0, 6.0][..]));
        assert_eq!(channel.cached_samples(), Some(&[5.0, 6.0][..]));
        Ok(())
    }

    #[test]
    fn failed_reconstruction_is_not_cached() {
        let channel = channel_with(0x07, 2, 4, 1);
        assert!(channel.samples(&[0u8; 8]).is_err());
        assert!(channel.cached_samples().is_none());
        assert!(channel.samples(&[0u8; 8]).is_err());
    }

    #[test]
    fn duration_uses_rec_freq() {
        let mut channel = channel_with(0x00, 2, 4, 250);
        channel.rec_freq = 100;
        assert_eq!(channel.duration(), 2.5);
        channel.rec_freq = 0;
        assert_eq!(channel.duration(), 0.0);
    }
}
