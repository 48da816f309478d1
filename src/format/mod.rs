//! LD binary format: record layouts and fixed-layout decoding
//!
//! ## LD File Structure
//!
//! An LD log is one flat buffer of packed little-endian records linked by
//! absolute byte offsets (0 means "absent"):
//!
//! 1. **Header** (1762 bytes at offset 0) - device info, session strings and
//!    pointers to the event record and the first channel record
//! 2. **Event** (optional) -> **Venue** (optional) -> **Vehicle** (optional)
//! 3. **Channel records** - a doubly-linked list of 124-byte metadata records
//! 4. **Sample arrays** - one raw numeric array per channel, at `data_ptr`

pub mod layouts;
pub mod record;

pub use layouts::{
    CHANNEL_LAYOUT, CHANNEL_SIZE, EVENT_LAYOUT, EVENT_SIZE, HEADER_LAYOUT, HEADER_SIZE,
    VEHICLE_LAYOUT, VEHICLE_SIZE, VENUE_LAYOUT, VENUE_SIZE,
};
pub use record::{Field, FieldKind, FieldValue, Layout, Record, decode_record};
