//! Log header record

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::format::Record;

/// Fixed header at offset 0 of every LD log.
///
/// All `*_ptr` fields are absolute byte offsets into the same buffer, 0 when
/// the target is absent. `num_channs` is advisory: the channel list traversal
/// is the source of truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub ldmarker: u32,
    pub chann_meta_ptr: u32,
    pub chann_data_ptr: u32,
    pub event_ptr: u32,
    pub device_serial: u32,
    pub device_type: String,
    pub device_version: u16,
    pub num_channs: u32,
    pub date: String,
    pub time: String,
    pub driver: String,
    pub vehicleid: String,
    pub venue: String,
    pub pro_logging: u32,
    pub session: String,
    pub short_comment: String,
}

impl Header {
    pub(crate) fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            ldmarker: record.u32("ldmarker")?,
            chann_meta_ptr: record.u32("chann_meta_ptr")?,
            chann_data_ptr: record.u32("chann_data_ptr")?,
            event_ptr: record.u32("event_ptr")?,
            device_serial: record.u32("device_serial")?,
            device_type: record.string("device_type")?,
            device_version: record.u16("device_version")?,
            num_channs: record.u32("num_channs")?,
            date: record.string("date")?,
            time: record.string("time")?,
            driver: record.string("driver")?,
            vehicleid: record.string("vehicleid")?,
            venue: record.string("venue")?,
            pro_logging: record.u32("pro_logging")?,
            session: record.string("session")?,
            short_comment: record.string("short_comment")?,
        })
    }

    /// Whether the header points at an event record.
    pub fn has_event(&self) -> bool {
        self.event_ptr != 0
    }

    /// Recording start, combining the `dd/mm/YYYY` date and `HH:MM[:SS]` time.
    pub fn recorded_at(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::parse_from_str(&self.date, "%d/%m/%Y").ok()?;
        let time = NaiveTime::parse_from_str(&self.time, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(&self.time, "%H:%M"))
            .ok()?;
        Some(date.and_time(time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_at_parses_logger_format() {
        let header = Header {
            date: "10/09/2024".to_string(),
            time: "18:59:58".to_string(),
            ..Default::default()
        };
        let at = header.recorded_at().expect("valid timestamp");
        assert_eq!(at.to_string(), "2024-09-10 18:59:58");

        let short = Header { time: "07:05".to_string(), ..header.clone() };
        assert_eq!(short.recorded_at().map(|t| t.to_string()), Some("2024-09-10 07:05:00".into()));
    }

    #[test]
    fn recorded_at_rejects_garbage() {
        let header =
            Header { date: "2024-09-10".to_string(), time: "x".to_string(), ..Default::default() };
        assert!(header.recorded_at().is_none());
        assert!(!header.has_event());
    }
}
