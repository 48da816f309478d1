//! Type-safe Rust library for LD motorsport telemetry logs.
//!
//! `ldx` decodes the binary LD log written by data loggers and simulators,
//! pairs it with the lap beacons of its LDX sidecar and cuts channels into
//! per-lap slices.
//!
//! # Features
//!
//! - **Record decoding**: header, event, venue, vehicle and the channel list
//!   from one in-memory buffer, with cycle and bounds checks
//! - **Samples**: int16/int32/float32 arrays scaled to physical values, memoized per channel
//! - **Laps**: beacon windows mapped to each channel's own sample rate, plus distance from speed
//!
//! ## Example
//!
//! ```rust,no_run
//! use ldx::Session;
//!
//! fn main() -> ldx::Result<()> {
//!     let session = Session::open("Spa-bmw_m4_gt3-5.ldx")?;
//!     println!("{} laps by {}", session.sidecar().total_laps(), session.log().header().driver);
//!
//!     let fastest = session.sidecar().summary().fastest_lap;
//!     let throttle = session.lap_channel(fastest, "THROTTLE")?;
//!     println!("fastest lap: {} throttle samples", throttle.len());
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod config;
mod error;
pub mod format;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Decoding
pub mod decoder;
pub mod log_file;
pub mod samples;

// Laps and sessions
pub mod export;
pub mod laps;
pub mod session;
pub mod sidecar;

// Core exports
pub use config::{DecoderConfig, ExportConfig};
pub use error::*;
pub use types::*;

pub use decoder::{LogDecoder, decode};
pub use export::{ChannelExport, SessionExport};
pub use laps::{LapWindow, generate_distance, lap_window, slice_for_lap};
pub use log_file::LogFile;
pub use session::Session;
pub use sidecar::{SessionSummary, Sidecar, parse_ldx};
