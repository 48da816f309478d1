//! LD log decoder
//!
//! Decodes the header at offset 0, follows the optional
//! event -> venue -> vehicle chain and walks the channel list from
//! `header.chann_meta_ptr` along `next_ptr` until a 0 terminator.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use ldx::LogDecoder;
//!
//! fn list_channels(bytes: &[u8]) -> ldx::Result<()> {
//!     let log = LogDecoder::default().decode(bytes)?;
//!     for channel in log.channels() {
//!         println!("{} [{}] @ {} Hz", channel.name, channel.unit, channel.rec_freq);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Failure Semantics
//!
//! Decoding is atomic: a truncated record or a cyclic channel list fails the
//! whole call. Per-channel sample failures (unsupported type, zero scale) are
//! isolated; with eager samples enabled they are logged and the channel keeps
//! its metadata with an empty cache.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::config::DecoderConfig;
use crate::format::{
    CHANNEL_LAYOUT, EVENT_LAYOUT, HEADER_LAYOUT, VEHICLE_LAYOUT, VENUE_LAYOUT, decode_record,
};
use crate::log_file::LogFile;
use crate::types::{Channel, Event, Header, Vehicle, Venue};
use crate::{LdError, Result};

/// Decodes complete LD buffers into [`LogFile`]s.
#[derive(Debug, Clone, Default)]
pub struct LogDecoder {
    config: DecoderConfig,
}

impl LogDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a borrowed buffer; the bytes are copied into the returned log.
    pub fn decode(&self, buffer: &[u8]) -> Result<LogFile> {
        self.decode_shared(Arc::from(buffer))
    }

    /// Decode a buffer already owned by the caller without copying it.
    pub fn decode_shared(&self, buffer: Arc<[u8]>) -> Result<LogFile> {
        let header = Header::from_record(&decode_record(&buffer, 0, &HEADER_LAYOUT)?)?;
        debug!(
            "Parsed LD header: marker={:#x}, device={} v{}, num_channs={}, event_ptr={:#x}",
            header.ldmarker,
            header.device_type,
            header.device_version,
            header.num_channs,
            header.event_ptr
        );

        let event = decode_event_chain(&buffer, header.event_ptr)?;
        let channels = walk_channels(&buffer, header.chann_meta_ptr)?;

        if self.config.check_channel_count && header.num_channs as usize != channels.len() {
            warn!(
                "Channel count mismatch: header reports {} channels, list contains {}",
                header.num_channs,
                channels.len()
            );
        }

        if self.config.eager_samples {
            for channel in channels.iter().filter(|channel| channel.has_data()) {
                match channel.samples(&buffer) {
                    Ok(_) => {}
                    Err(err) if err.is_channel_local() => {
                        warn!("Omitting samples of channel '{}': {}", channel.name, err);
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        debug!("Decoded {} channels from {} bytes", channels.len(), buffer.len());
        Ok(LogFile::new(buffer, header, event, channels))
    }
}

/// Decode a buffer with the default configuration.
pub fn decode(buffer: &[u8]) -> Result<LogFile> {
    LogDecoder::default().decode(buffer)
}

fn decode_event_chain(buffer: &[u8], event_ptr: u32) -> Result<Option<Event>> {
    if event_ptr == 0 {
        return Ok(None);
    }
    let mut event = Event::from_record(&decode_record(buffer, event_ptr as usize, &EVENT_LAYOUT)?)?;
    trace!("Event '{}' at {:#x}", event.name, event_ptr);

    if event.venue_ptr != 0 {
        let mut venue =
            Venue::from_record(&decode_record(buffer, event.venue_ptr as usize, &VENUE_LAYOUT)?)?;
        trace!("Venue '{}' at {:#x}", venue.name, event.venue_ptr);

        if venue.vehicle_ptr != 0 {
            let record = decode_record(buffer, venue.vehicle_ptr as usize, &VEHICLE_LAYOUT)?;
            venue.vehicle = Some(Vehicle::from_record(&record)?);
        }
        event.venue = Some(venue);
    }

    Ok(Some(event))
}

fn walk_channels(buffer: &[u8], head: u32) -> Result<Vec<Channel>> {
    let mut channels = Vec::new();
    let mut visited = HashSet::new();
    let mut ptr = head;

    while ptr != 0 {
        if !visited.insert(ptr) {
            return Err(LdError::CorruptChannelList {
                offset: ptr as usize,
                visited: channels.len(),
            });
        }
        let channel = Channel::from_record(&decode_record(buffer, ptr as usize, &CHANNEL_LAYOUT)?)?;
        trace!(
            "Channel '{}' at {:#x}: {} samples @ {} Hz, next={:#x}",
            channel.name, ptr, channel.n_data, channel.rec_freq, channel.next_ptr
        );
        ptr = channel.next_ptr;
        channels.push(channel);
    }

    Ok(channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ChannelSpec, LdBuilder, SampleData};
    use crate::types::NumericKind;
    use anyhow::{Context, Result, ensure};
    use proptest::prelude::*;

    fn speed_spec() -> ChannelSpec {
        ChannelSpec::new("SPEED", "m/s", 10, SampleData::Int16(vec![0, 10, 20, 30]))
    }

    #[test]
    fn decodes_full_metadata_chain() -> Result<()> {
        let data = LdBuilder::new()
            .event("GT World Challenge", "Qualifying", "dry")
            .venue("Spa-Francorchamps")
            .vehicle("M4 GT3", 1300, "GT3", "car 5")
            .channel(speed_spec())
            .build();

        let log = decode(&data).context("decoding synthetic log")?;
        assert_eq!(log.header().driver, "Test Driver");
        assert_eq!(log.header().venue, "Spa");
        assert_eq!(log.header().session, "Race");
        assert_eq!(log.header().short_comment, "synthetic");
        assert_eq!(log.header().device_serial, 12345);
        assert_eq!(log.header().device_version, 420);

        let event = log.event().context("event present")?;
        assert_eq!(event.name, "GT World Challenge");
        assert_eq!(event.session, "Qualifying");
        assert_eq!(event.comment, "dry");
        assert_eq!(log.venue().map(|v| v.name.as_str()), Some("Spa-Francorchamps"));

        let vehicle = log.vehicle().context("vehicle present")?;
        assert_eq!(vehicle.id, "M4 GT3");
        assert_eq!(vehicle.weight, 1300);
        assert_eq!(vehicle.vehicle_type, "GT3");
        assert_eq!(vehicle.comment, "car 5");
        Ok(())
    }

    #[test]
    fn zero_pointers_mean_absent() -> Result<()> {
        let log = decode(&LdBuilder::new().build())?;
        assert!(log.event().is_none());
        assert!(log.channels().is_empty());

        let log = decode(&LdBuilder::new().event("e", "s", "c").build())?;
        let event = log.event().context("event present")?;
        assert_eq!(event.venue_ptr, 0);
        assert!(event.venue.is_none());
        assert!(log.vehicle().is_none());

        let log = decode(&LdBuilder::new().event("e", "s", "c").venue("v").build())?;
        ensure!(log.venue().is_some(), "venue should be present");
        assert!(log.vehicle().is_none());
        Ok(())
    }

    #[test]
    fn metadata_only_channel_keeps_metadata() -> Result<()> {
        let data = LdBuilder::new()
            .channel(ChannelSpec::new("LAP_BEACON", "", 20, SampleData::None))
            .build();
        let log = decode(&data)?;
        let channel = log.channel("LAP_BEACON").context("channel present")?;
        assert_eq!(channel.data_ptr, 0);
        assert_eq!(channel.rec_freq, 20);
        assert_eq!(log.samples(channel)?, None);
        Ok(())
    }

    #[test]
    fn walks_list_in_order_with_links() -> Result<()> {
        let builder = LdBuilder::new()
            .channel(speed_spec())
            .channel(ChannelSpec::new("BRAKE", "%", 20, SampleData::Float32(vec![0.5; 8])))
            .channel(ChannelSpec::new("GEAR", "", 5, SampleData::Int32(vec![1, 2])));
        let log = decode(&builder.build())?;

        assert_eq!(log.channel_names(), vec!["SPEED", "BRAKE", "GEAR"]);
        let channels = log.channels();
        assert_eq!(channels[0].prev_ptr, 0);
        assert_eq!(channels[0].ptr as usize, builder.channel_offset(0));
        assert_eq!(channels[1].prev_ptr, channels[0].ptr);
        assert_eq!(channels[2].next_ptr, 0);
        assert_eq!(channels[1].kind(), NumericKind::Float32);
        assert_eq!(channels[2].kind(), NumericKind::Int32);

        // eager decoding filled every cache
        assert_eq!(channels[0].cached_samples(), Some(&[0.0, 10.0, 20.0, 30.0][..]));
        assert_eq!(channels[2].cached_samples(), Some(&[1.0, 2.0][..]));
        Ok(())
    }

    #[test]
    fn lazy_config_defers_samples() -> Result<()> {
        let data = LdBuilder::new().channel(speed_spec()).build();
        let decoder = LogDecoder::new(DecoderConfig { eager_samples: false, ..Default::default() });
        let log = decoder.decode(&data)?;
        assert!(log.channels()[0].cached_samples().is_none());
        assert_eq!(log.channel_samples("SPEED")?.map(<[f64]>::len), Some(4));
        assert!(log.channels()[0].cached_samples().is_some());
        Ok(())
    }

    #[test]
    fn bad_channels_are_isolated() -> Result<()> {
        let data = LdBuilder::new()
            .channel(speed_spec().with_type_codes(0x07, 2))
            .channel(
                ChannelSpec::new("ZERO", "", 10, SampleData::Int16(vec![1]))
                    .with_scaling(0, 1, 0, 0),
            )
            .channel(ChannelSpec::new("OK", "", 10, SampleData::Int16(vec![7])))
            .build();

        let log = decode(&data)?;
        assert_eq!(log.channels().len(), 3);
        assert!(matches!(log.channel_samples("SPEED"), Err(LdError::UnsupportedType { .. })));
        assert!(matches!(log.channel_samples("ZERO"), Err(LdError::InvalidChannel { .. })));
        assert_eq!(log.channel_samples("OK")?, Some(&[7.0][..]));
        assert!(matches!(log.channel_samples("NOPE"), Err(LdError::ChannelNotFound { .. })));
        Ok(())
    }

    #[test]
    fn truncated_sample_array_fails_eager_decode() {
        let data = LdBuilder::new()
            .channel(ChannelSpec::new(
                "SHORT",
                "",
                10,
                SampleData::Raw { bytes: vec![0; 4], n_data: 100 },
            ))
            .build();
        let err = decode(&data).unwrap_err();
        assert!(matches!(err, crate::LdError::TruncatedRecord { .. }));

        let lazy = LogDecoder::new(DecoderConfig { eager_samples: false, ..Default::default() });
        let log = lazy.decode(&data).expect("metadata decodes lazily");
        assert!(log.channel_samples("SHORT").is_err());
    }

    #[test]
    fn truncated_zero_scale_channel_fails_eager_decode() {
        let raw = SampleData::Raw { bytes: vec![0; 2], n_data: 1000 };
        let data = LdBuilder::new()
            .channel(ChannelSpec::new("BROKEN", "", 10, raw).with_scaling(0, 1, 0, 0))
            .build();
        let err = decode(&data).unwrap_err();
        assert!(matches!(err, crate::LdError::TruncatedRecord { .. }), "got {:?}", err);
    }

    #[test]
    fn truncated_buffers_fail() {
        let data = LdBuilder::new().event("e", "s", "c").channel(speed_spec()).build();

        let err = decode(&data[..100]).unwrap_err();
        assert!(matches!(err, crate::LdError::TruncatedRecord { offset: 0, .. }));

        // header intact, event record cut off
        let err = decode(&data[..1800]).unwrap_err();
        assert!(matches!(err, crate::LdError::TruncatedRecord { offset: 1762, .. }));
    }

    #[test]
    fn advisory_channel_count_is_not_checked_strictly() -> anyhow::Result<()> {
        let data = LdBuilder::new().num_channs(42).channel(speed_spec()).build();
        let log = decode(&data)?;
        assert_eq!(log.header().num_channs, 42);
        assert_eq!(log.channels().len(), 1);
        Ok(())
    }

    #[test]
    fn self_referencing_channel_is_corrupt() {
        let data = LdBuilder::new().channel(speed_spec()).cycle_to(0).build();
        match decode(&data) {
            Err(crate::LdError::CorruptChannelList { visited, .. }) => assert_eq!(visited, 1),
            other => {
                panic!("Expected CorruptChannelList, got {:?}", other.map(|l| l.channels().len()))
            }
        }
    }

    proptest! {
        #[test]
        fn cycles_are_detected_within_n_plus_one_steps(
            n in 1usize..12,
            target_seed in any::<usize>(),
        ) {
            let target = target_seed % n;
            let mut builder = LdBuilder::new();
            for i in 0..n {
                let name = format!("CH{}", i);
                builder = builder.channel(ChannelSpec::new(&name, "", 10, SampleData::None));
            }
            let data = builder.clone().cycle_to(target).build();

            match decode(&data) {
                Err(crate::LdError::CorruptChannelList { offset, visited }) => {
                    prop_assert_eq!(visited, n);
                    prop_assert_eq!(offset, builder.channel_offset(target));
                }
                other => prop_assert!(false, "expected cycle error, got {:?}", other.is_ok()),
            }

            // same list without the back edge terminates
            let log = decode(&builder.build()).unwrap();
            prop_assert_eq!(log.channels().len(), n);
        }
    }
}
