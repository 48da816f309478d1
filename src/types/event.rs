//! Event, venue and vehicle metadata records
//!
//! The three records form an optional chain: the header points at the event,
//! the event at the venue, the venue at the vehicle. Each link is absent when
//! its pointer is 0.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::format::Record;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub session: String,
    pub comment: String,
    pub venue_ptr: u32,
    pub venue: Option<Venue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    pub vehicle_ptr: u32,
    pub vehicle: Option<Vehicle>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub weight: u32,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub comment: String,
}

impl Event {
    pub(crate) fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            name: record.string("name")?,
            session: record.string("session")?,
            comment: record.string("comment")?,
            venue_ptr: u32::from(record.u16("venue_ptr")?),
            venue: None,
        })
    }

    /// Vehicle at the end of the chain, if every link is present.
    pub fn vehicle(&self) -> Option<&Vehicle> {
        self.venue.as_ref().and_then(|venue| venue.vehicle.as_ref())
    }
}

impl Venue {
    pub(crate) fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            name: record.string("name")?,
            vehicle_ptr: u32::from(record.u16("vehicle_ptr")?),
            vehicle: None,
        })
    }
}

impl Vehicle {
    pub(crate) fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: record.string("id")?,
            weight: record.u32("weight")?,
            vehicle_type: record.string("type")?,
            comment: record.string("comment")?,
        })
    }
}
