//! Error types for log decoding and lap segmentation.
//!
//! All errors implement the `std::error::Error` trait and carry structured
//! context (byte offsets, channel names, lap numbers) for diagnostics.
//!
//! ## Error Categories
//!
//! - **Structural Errors**: truncated records and corrupt channel lists. These
//!   abort the whole decode since every pointer after them is meaningless.
//! - **Channel Errors**: unsupported sample types and invalid scaling. These
//!   only affect the samples of one channel; its metadata stays available.
//! - **Request Errors**: lap numbers outside the session or missing beacons.
//!   They fail a single slice/distance request, never the decoded log.
//! - **Sidecar/Config/File Errors**: problems with the collaborator inputs.
//!
//! ## Classification
//!
//! ```rust
//! use ldx::LdError;
//!
//! let error = LdError::truncated("channel record", 0x40, 124, 80);
//! assert!(error.is_fatal());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for decoding operations.
pub type Result<T, E = LdError> = std::result::Result<T, E>;

/// Main error type for decoding operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LdError {
    #[error(
        "Truncated {context} at offset {offset:#x}: need {needed} bytes, {available} available"
    )]
    TruncatedRecord { context: String, offset: usize, needed: usize, available: usize },

    #[error("Channel list revisits offset {offset:#x} after {visited} records")]
    CorruptChannelList { offset: usize, visited: usize },

    #[error(
        "Channel '{channel}' uses unsupported sample type (class {type_class:#04x}, code {type_code})"
    )]
    UnsupportedType { channel: String, type_class: u16, type_code: u16 },

    #[error("Channel '{channel}' is invalid: {reason}")]
    InvalidChannel { channel: String, reason: String },

    #[error("Lap {lap} out of range (session has {total_laps} laps, {beacons} beacons)")]
    LapOutOfRange { lap: usize, total_laps: usize, beacons: usize },

    #[error("Field '{field}' not found in {record} record")]
    FieldNotFound { field: String, record: String },

    #[error("Channel '{name}' not found in log")]
    ChannelNotFound { name: String },

    #[error("Sidecar error in {context}: {details}")]
    Sidecar { context: String, details: String },

    #[error("Sidecar XML error")]
    Xml(#[from] quick_xml::Error),

    #[error("Log file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {details}")]
    Config { details: String },
}

impl LdError {
    /// Returns whether this error invalidates the whole decode.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LdError::TruncatedRecord { .. } | LdError::CorruptChannelList { .. })
    }

    /// Returns whether this error is isolated to the samples of a single channel.
    pub fn is_channel_local(&self) -> bool {
        matches!(self, LdError::UnsupportedType { .. } | LdError::InvalidChannel { .. })
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            LdError::TruncatedRecord { .. } => vec![
                "Check the log file was copied completely",
                "Verify the file is an LD log and not the LDX sidecar",
            ],
            LdError::CorruptChannelList { .. } => vec![
                "Re-export the session from the data logger",
                "Verify the file has not been modified by another tool",
            ],
            LdError::UnsupportedType { .. } => vec![
                "Skip this channel and read the remaining ones",
                "Check the channel's data type in the logger configuration",
            ],
            LdError::InvalidChannel { .. } => vec![
                "Skip this channel and read the remaining ones",
                "Check the channel's scaling parameters",
            ],
            LdError::LapOutOfRange { .. } => vec![
                "Use a lap number between 1 and the session's total laps",
                "Verify the sidecar contains a beacon for every lap",
            ],
            LdError::FieldNotFound { .. } => vec!["Check the record layout definition"],
            LdError::ChannelNotFound { .. } => vec![
                "Check channel name spelling",
                "List the log's channels to find the recorded name",
            ],
            LdError::Sidecar { .. } | LdError::Xml(_) => vec![
                "Verify the LDX sidecar belongs to this log",
                "Check the sidecar is well-formed XML",
            ],
            LdError::File { .. } => {
                vec!["Check file exists and is readable", "Check file permissions"]
            }
            LdError::Config { .. } => vec![
                "Check the configuration file is valid YAML",
                "Remove unknown keys from the configuration",
            ],
        }
    }

    /// Helper constructor for truncated record errors.
    pub fn truncated(
        context: impl Into<String>,
        offset: usize,
        needed: usize,
        available: usize,
    ) -> Self {
        LdError::TruncatedRecord { context: context.into(), offset, needed, available }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        LdError::File { path, source }
    }

    /// Helper constructor for sidecar content errors.
    pub fn sidecar(context: impl Into<String>, details: impl Into<String>) -> Self {
        LdError::Sidecar { context: context.into(), details: details.into() }
    }

    /// Helper constructor for invalid channel errors.
    pub fn invalid_channel(channel: impl Into<String>, reason: impl Into<String>) -> Self {
        LdError::InvalidChannel { channel: channel.into(), reason: reason.into() }
    }
}

impl From<std::io::Error> for LdError {
    fn from(err: std::io::Error) -> Self {
        LdError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

impl From<serde_yaml_ng::Error> for LdError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        LdError::Config { details: err.to_string() }
    }
}
