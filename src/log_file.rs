//! Decoded log: the record tree plus the buffer it was decoded from

use std::sync::Arc;

use crate::types::{Channel, Event, Header, Vehicle, Venue};
use crate::{LdError, Result};

/// A completely decoded LD log.
///
/// Records refer to each other by byte offset into the shared buffer; the
/// buffer is kept so channel samples can be reconstructed on demand.
#[derive(Debug, Clone)]
pub struct LogFile {
    buffer: Arc<[u8]>,
    header: Header,
    event: Option<Event>,
    channels: Vec<Channel>,
}

impl LogFile {
    pub(crate) fn new(
        buffer: Arc<[u8]>,
        header: Header,
        event: Option<Event>,
        channels: Vec<Channel>,
    ) -> Self {
        Self { buffer, header, event, channels }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    pub fn venue(&self) -> Option<&Venue> {
        self.event.as_ref().and_then(|event| event.venue.as_ref())
    }

    pub fn vehicle(&self) -> Option<&Vehicle> {
        self.event.as_ref().and_then(Event::vehicle)
    }

    /// Channels in list order.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|channel| channel.name.as_str()).collect()
    }

    /// First channel with the given name.
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|channel| channel.name == name)
    }

    /// Raw bytes the log was decoded from.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Physical samples of a channel of this log, memoized per channel.
    ///
    /// # Errors
    ///
    /// [`LdError::ChannelNotFound`] when `channel` belongs to another log,
    /// plus the reconstruction errors of [`crate::samples::reconstruct`].
    pub fn samples<'a>(&'a self, channel: &'a Channel) -> Result<Option<&'a [f64]>> {
        if !self.channels.iter().any(|own| std::ptr::eq(own, channel)) {
            return Err(LdError::ChannelNotFound { name: channel.name.clone() });
        }
        channel.samples(&self.buffer)
    }

    /// Physical samples of the named channel.
    ///
    /// # Errors
    ///
    /// [`LdError::ChannelNotFound`] when no channel has this name, plus the
    /// reconstruction errors of [`crate::samples::reconstruct`].
    pub fn channel_samples(&self, name: &str) -> Result<Option<&[f64]>> {
        let channel =
            self.channel(name).ok_or_else(|| LdError::ChannelNotFound { name: name.to_string() })?;
        self.samples(channel)
    }
}
