//! Test utilities: synthetic LD buffers and channel fixtures
//!
//! Real logger recordings are large and proprietary, so unit tests and
//! benchmarks build their buffers with [`LdBuilder`], which writes every
//! record at the wire offsets declared in [`crate::format::layouts`].

#![cfg(any(test, feature = "benchmark"))]

use crate::format::{
    CHANNEL_LAYOUT, CHANNEL_SIZE, EVENT_LAYOUT, EVENT_SIZE, HEADER_LAYOUT, HEADER_SIZE, Layout,
    VEHICLE_LAYOUT, VEHICLE_SIZE, VENUE_LAYOUT, VENUE_SIZE,
};
use crate::types::Channel;

/// Marker value written to `ldmarker` by loggers.
pub const LD_MARKER: u32 = 0x40;

/// Channel with unit scaling, for sample-level tests.
pub fn channel_with(type_class: u16, type_code: u16, data_ptr: u32, n_data: u32) -> Channel {
    let mut channel = Channel::default();
    channel.name = "TEST".to_string();
    channel.datatype_a = type_class;
    channel.datatype = type_code;
    channel.data_ptr = data_ptr;
    channel.n_data = n_data;
    channel.rec_freq = 10;
    channel.mul = 1;
    channel.scale = 1;
    channel
}

/// Raw sample payload of a synthetic channel.
#[derive(Debug, Clone)]
pub enum SampleData {
    None,
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Float32(Vec<f32>),
    /// Arbitrary bytes with an explicit declared sample count
    Raw { bytes: Vec<u8>, n_data: u32 },
}

impl SampleData {
    fn encode(&self) -> (Vec<u8>, u32) {
        match self {
            SampleData::None => (Vec::new(), 0),
            SampleData::Int16(v) => {
                (v.iter().flat_map(|x| x.to_le_bytes()).collect(), v.len() as u32)
            }
            SampleData::Int32(v) => {
                (v.iter().flat_map(|x| x.to_le_bytes()).collect(), v.len() as u32)
            }
            SampleData::Float32(v) => {
                (v.iter().flat_map(|x| x.to_le_bytes()).collect(), v.len() as u32)
            }
            SampleData::Raw { bytes, n_data } => (bytes.clone(), *n_data),
        }
    }

    fn type_codes(&self) -> (u16, u16) {
        match self {
            SampleData::Int16(_) | SampleData::None => (0x03, 2),
            SampleData::Int32(_) => (0x05, 4),
            SampleData::Float32(_) => (0x07, 4),
            SampleData::Raw { .. } => (0x00, 2),
        }
    }
}

/// Description of one synthetic channel record.
#[derive(Debug, Clone)]
pub struct ChannelSpec {
    pub name: String,
    pub short_name: String,
    pub unit: String,
    pub type_codes: (u16, u16),
    pub rec_freq: u16,
    pub shift: i16,
    pub mul: i16,
    pub scale: i16,
    pub dec_places: i16,
    pub data: SampleData,
}

impl ChannelSpec {
    pub fn new(name: &str, unit: &str, rec_freq: u16, data: SampleData) -> Self {
        Self {
            name: name.to_string(),
            short_name: name.chars().take(8).collect(),
            unit: unit.to_string(),
            type_codes: data.type_codes(),
            rec_freq,
            shift: 0,
            mul: 1,
            scale: 1,
            dec_places: 0,
            data,
        }
    }

    pub fn with_type_codes(mut self, type_class: u16, type_code: u16) -> Self {
        self.type_codes = (type_class, type_code);
        self
    }

    pub fn with_scaling(mut self, shift: i16, mul: i16, scale: i16, dec_places: i16) -> Self {
        self.shift = shift;
        self.mul = mul;
        self.scale = scale;
        self.dec_places = dec_places;
        self
    }
}

/// Builder for complete synthetic LD buffers.
#[derive(Debug, Clone, Default)]
pub struct LdBuilder {
    driver: String,
    venue: String,
    date: String,
    time: String,
    num_channs: Option<u32>,
    event: Option<(String, String, String)>,
    venue_record: Option<String>,
    vehicle: Option<(String, u32, String, String)>,
    channels: Vec<ChannelSpec>,
    cycle_to: Option<usize>,
}

impl LdBuilder {
    pub fn new() -> Self {
        Self {
            driver: "Test Driver".to_string(),
            venue: "Spa".to_string(),
            date: "10/09/2024".to_string(),
            time: "18:59:58".to_string(),
            ..Default::default()
        }
    }

    pub fn event(mut self, name: &str, session: &str, comment: &str) -> Self {
        self.event = Some((name.to_string(), session.to_string(), comment.to_string()));
        self
    }

    /// Venue record; only written when an event is present.
    pub fn venue(mut self, name: &str) -> Self {
        self.venue_record = Some(name.to_string());
        self
    }

    /// Vehicle record; only written when a venue is present.
    pub fn vehicle(mut self, id: &str, weight: u32, vehicle_type: &str, comment: &str) -> Self {
        self.vehicle =
            Some((id.to_string(), weight, vehicle_type.to_string(), comment.to_string()));
        self
    }

    pub fn channel(mut self, spec: ChannelSpec) -> Self {
        self.channels.push(spec);
        self
    }

    /// Overrides the advisory channel count written to the header.
    pub fn num_channs(mut self, count: u32) -> Self {
        self.num_channs = Some(count);
        self
    }

    /// Points the last channel's `next_ptr` back at channel `index`.
    pub fn cycle_to(mut self, index: usize) -> Self {
        self.cycle_to = Some(index);
        self
    }

    /// Offset of channel record `index` in the built buffer.
    pub fn channel_offset(&self, index: usize) -> usize {
        self.metadata_end() + index * CHANNEL_SIZE
    }

    fn metadata_end(&self) -> usize {
        HEADER_SIZE + EVENT_SIZE + VENUE_SIZE + VEHICLE_SIZE
    }

    pub fn build(&self) -> Vec<u8> {
        let event_ptr = HEADER_SIZE;
        let venue_ptr = event_ptr + EVENT_SIZE;
        let vehicle_ptr = venue_ptr + VENUE_SIZE;
        let data_start = self.channel_offset(self.channels.len());

        let mut buffer = vec![0u8; data_start];

        // sample arrays follow the channel records
        let mut data_ptrs = Vec::with_capacity(self.channels.len());
        for spec in &self.channels {
            let (bytes, n_data) = spec.data.encode();
            if matches!(spec.data, SampleData::None) {
                data_ptrs.push((0, n_data));
            } else {
                data_ptrs.push((buffer.len(), n_data));
                buffer.extend(bytes);
            }
        }

        let head = &HEADER_LAYOUT;
        put_uint(&mut buffer, 0, head, "ldmarker", LD_MARKER as u64);
        if !self.channels.is_empty() {
            put_uint(&mut buffer, 0, head, "chann_meta_ptr", self.channel_offset(0) as u64);
            put_uint(&mut buffer, 0, head, "chann_data_ptr", data_start as u64);
        }
        put_uint(&mut buffer, 0, head, "device_serial", 12345);
        put_str(&mut buffer, 0, head, "device_type", "ADL", 8);
        put_uint(&mut buffer, 0, head, "device_version", 420);
        let num_channs = self.num_channs.unwrap_or(self.channels.len() as u32);
        put_uint(&mut buffer, 0, head, "num_channs", num_channs as u64);
        put_str(&mut buffer, 0, head, "date", &self.date, 16);
        put_str(&mut buffer, 0, head, "time", &self.time, 16);
        put_str(&mut buffer, 0, head, "driver", &self.driver, 64);
        put_str(&mut buffer, 0, head, "vehicleid", "M4 GT3", 64);
        put_str(&mut buffer, 0, head, "venue", &self.venue, 64);
        put_uint(&mut buffer, 0, head, "pro_logging", 0xc81a4);
        put_str(&mut buffer, 0, head, "session", "Race", 64);
        put_str(&mut buffer, 0, head, "short_comment", "synthetic", 64);

        if let Some((name, session, comment)) = &self.event {
            put_uint(&mut buffer, 0, head, "event_ptr", event_ptr as u64);
            put_str(&mut buffer, event_ptr, &EVENT_LAYOUT, "name", name, 64);
            put_str(&mut buffer, event_ptr, &EVENT_LAYOUT, "session", session, 64);
            put_str(&mut buffer, event_ptr, &EVENT_LAYOUT, "comment", comment, 1024);

            if let Some(venue) = &self.venue_record {
                put_uint(&mut buffer, event_ptr, &EVENT_LAYOUT, "venue_ptr", venue_ptr as u64);
                put_str(&mut buffer, venue_ptr, &VENUE_LAYOUT, "name", venue, 64);

                if let Some((id, weight, vehicle_type, comment)) = &self.vehicle {
                    let layout = &VEHICLE_LAYOUT;
                    let pointer = vehicle_ptr as u64;
                    put_uint(&mut buffer, venue_ptr, &VENUE_LAYOUT, "vehicle_ptr", pointer);
                    put_str(&mut buffer, vehicle_ptr, layout, "id", id, 64);
                    put_uint(&mut buffer, vehicle_ptr, layout, "weight", *weight as u64);
                    put_str(&mut buffer, vehicle_ptr, layout, "type", vehicle_type, 32);
                    put_str(&mut buffer, vehicle_ptr, layout, "comment", comment, 32);
                }
            }
        }

        let count = self.channels.len();
        for (index, spec) in self.channels.iter().enumerate() {
            let base = self.channel_offset(index);
            let layout = &CHANNEL_LAYOUT;
            let prev = if index == 0 { 0 } else { self.channel_offset(index - 1) };
            let next = match (index + 1 == count, self.cycle_to) {
                (true, Some(target)) => self.channel_offset(target),
                (true, None) => 0,
                (false, _) => self.channel_offset(index + 1),
            };
            let (data_ptr, n_data) = data_ptrs[index];

            put_uint(&mut buffer, base, layout, "prev_ptr", prev as u64);
            put_uint(&mut buffer, base, layout, "next_ptr", next as u64);
            put_uint(&mut buffer, base, layout, "data_ptr", data_ptr as u64);
            put_uint(&mut buffer, base, layout, "n_data", n_data as u64);
            put_uint(&mut buffer, base, layout, "counter", index as u64);
            put_uint(&mut buffer, base, layout, "datatype_a", spec.type_codes.0 as u64);
            put_uint(&mut buffer, base, layout, "datatype", spec.type_codes.1 as u64);
            put_uint(&mut buffer, base, layout, "rec_freq", spec.rec_freq as u64);
            put_int(&mut buffer, base, layout, "shift", spec.shift);
            put_int(&mut buffer, base, layout, "mul", spec.mul);
            put_int(&mut buffer, base, layout, "scale", spec.scale);
            put_int(&mut buffer, base, layout, "dec_places", spec.dec_places);
            put_str(&mut buffer, base, layout, "name", &spec.name, 32);
            put_str(&mut buffer, base, layout, "short_name", &spec.short_name, 8);
            put_str(&mut buffer, base, layout, "unit", &spec.unit, 12);
        }

        buffer
    }
}

fn field_offset(base: usize, layout: &Layout, name: &str) -> usize {
    let offset = layout
        .offset_of(name)
        .unwrap_or_else(|| panic!("{} layout has no field {}", layout.name, name));
    base + offset
}

fn put_uint(buffer: &mut [u8], base: usize, layout: &Layout, name: &str, value: u64) {
    let at = field_offset(base, layout, name);
    let width = layout
        .fields
        .iter()
        .find(|f| f.name == name)
        .map(|f| f.kind.width())
        .unwrap_or(0);
    buffer[at..at + width].copy_from_slice(&value.to_le_bytes()[..width]);
}

fn put_int(buffer: &mut [u8], base: usize, layout: &Layout, name: &str, value: i16) {
    let at = field_offset(base, layout, name);
    buffer[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_str(buffer: &mut [u8], base: usize, layout: &Layout, name: &str, value: &str, width: usize) {
    let at = field_offset(base, layout, name);
    let bytes = value.as_bytes();
    let len = bytes.len().min(width);
    buffer[at..at + len].copy_from_slice(&bytes[..len]);
}
