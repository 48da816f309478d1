//! Decoded data model of an LD log.
//!
//! - [`Header`] is the fixed record at offset 0
//! - [`Event`] / [`Venue`] / [`Vehicle`] form the optional metadata chain
//! - [`Channel`] is one node of the channel list with memoized samples
//! - [`NumericKind`] and [`resolve`] map type codes to sample widths

mod channel;
mod event;
mod header;
mod numeric_kind;

pub use channel::Channel;
pub use event::{Event, Vehicle, Venue};
pub use header::Header;
pub use numeric_kind::{NumericKind, TYPE_CLASS_FLOAT, TYPE_CLASSES_INT, resolve};
