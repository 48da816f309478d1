//! Wire layouts of the LD record types
//!
//! All records are packed (no alignment padding besides the explicit opaque
//! ranges) and little-endian. Unknown byte ranges are modeled as skip fields.

use super::record::{Field, FieldKind, Layout};

/// Header record, always at offset 0 (1762 bytes)
pub const HEADER_LAYOUT: Layout = Layout {
    name: "header",
    fields: &[
        Field::new("ldmarker", FieldKind::U32),
        Field::skip(4),
        Field::new("chann_meta_ptr", FieldKind::U32),
        Field::new("chann_data_ptr", FieldKind::U32),
        Field::skip(20),
        Field::new("event_ptr", FieldKind::U32),
        Field::skip(24),
        Field::new("unknown_a", FieldKind::U16),
        Field::new("unknown_b", FieldKind::U16),
        Field::new("unknown_c", FieldKind::U16),
        Field::new("device_serial", FieldKind::U32),
        Field::new("device_type", FieldKind::Str(8)),
        Field::new("device_version", FieldKind::U16),
        Field::new("unknown_d", FieldKind::U16),
        Field::new("num_channs", FieldKind::U32),
        Field::skip(4),
        Field::new("date", FieldKind::Str(16)),
        Field::skip(16),
        Field::new("time", FieldKind::Str(16)),
        Field::skip(16),
        Field::new("driver", FieldKind::Str(64)),
        Field::new("vehicleid", FieldKind::Str(64)),
        Field::skip(64),
        Field::new("venue", FieldKind::Str(64)),
        Field::skip(64),
        Field::skip(1024),
        Field::new("pro_logging", FieldKind::U32),
        Field::skip(2),
        Field::new("session", FieldKind::Str(64)),
        Field::new("short_comment", FieldKind::Str(64)),
        Field::skip(126),
    ],
};

/// Event record (1154 bytes)
pub const EVENT_LAYOUT: Layout = Layout {
    name: "event",
    fields: &[
        Field::new("name", FieldKind::Str(64)),
        Field::new("session", FieldKind::Str(64)),
        Field::new("comment", FieldKind::Str(1024)),
        Field::new("venue_ptr", FieldKind::U16),
    ],
};

/// Venue record (1100 bytes)
pub const VENUE_LAYOUT: Layout = Layout {
    name: "venue",
    fields: &[
        Field::new("name", FieldKind::Str(64)),
        Field::skip(1034),
        Field::new("vehicle_ptr", FieldKind::U16),
    ],
};

/// Vehicle record (260 bytes)
pub const VEHICLE_LAYOUT: Layout = Layout {
    name: "vehicle",
    fields: &[
        Field::new("id", FieldKind::Str(64)),
        Field::skip(128),
        Field::new("weight", FieldKind::U32),
        Field::new("type", FieldKind::Str(32)),
        Field::new("comment", FieldKind::Str(32)),
    ],
};

/// Channel metadata record (124 bytes). The trailing opaque range is 40 bytes
/// in the files this crate targets; some loggers write 32.
pub const CHANNEL_LAYOUT: Layout = Layout {
    name: "channel",
    fields: &[
        Field::new("prev_ptr", FieldKind::U32),
        Field::new("next_ptr", FieldKind::U32),
        Field::new("data_ptr", FieldKind::U32),
        Field::new("n_data", FieldKind::U32),
        Field::new("counter", FieldKind::U16),
        Field::new("datatype_a", FieldKind::U16),
        Field::new("datatype", FieldKind::U16),
        Field::new("rec_freq", FieldKind::U16),
        Field::new("shift", FieldKind::I16),
        Field::new("mul", FieldKind::I16),
        Field::new("scale", FieldKind::I16),
        Field::new("dec_places", FieldKind::I16),
        Field::new("name", FieldKind::Str(32)),
        Field::new("short_name", FieldKind::Str(8)),
        Field::new("unit", FieldKind::Str(12)),
        Field::skip(40),
    ],
};

pub const HEADER_SIZE: usize = HEADER_LAYOUT.size();
pub const EVENT_SIZE: usize = EVENT_LAYOUT.size();
pub const VENUE_SIZE: usize = VENUE_LAYOUT.size();
pub const VEHICLE_SIZE: usize = VEHICLE_LAYOUT.size();
pub const CHANNEL_SIZE: usize = CHANNEL_LAYOUT.size();
