//! LDX sidecar extraction.
//!
//! Only two parts of the document are consumed:
//!
//! ```xml
//! <LDXFile>
//!   <Layers>
//!     <Layer>
//!       <MarkerBlock>
//!         <MarkerGroup Name="Beacons">
//!           <Marker Time="10000000.0"/>      <!-- microseconds -->
//!         </MarkerGroup>
//!       </MarkerBlock>
//!     </Layer>
//!     <Details>
//!       <String Id="Total Laps" Value="2"/>
//!     </Details>
//!   </Layers>
//! </LDXFile>
//! ```
//!
//! Beacons come from the first `MarkerGroup` only, in document order.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, trace};

use super::{SessionSummary, Sidecar};
use crate::{LdError, Result};

const MICROS_PER_SECOND: f64 = 1e6;

#[derive(Debug, Default)]
struct ParserState {
    path: Vec<String>,
    marker_groups: usize,
    beacons: Vec<f64>,
    summary: SessionSummary,
}

impl ParserState {
    fn parent_is(&self, name: &str) -> bool {
        self.path.last().is_some_and(|parent| parent == name)
    }

    fn handle_element(&mut self, e: &BytesStart) -> Result<()> {
        let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
        match name.as_str() {
            "MarkerGroup" => self.marker_groups += 1,
            "Marker" if self.parent_is("MarkerGroup") && self.marker_groups == 1 => {
                let time = required_attribute(e, "Time", "Marker")?;
                let micros = parse_number::<f64>(&time, "Marker Time")?;
                trace!("Beacon at {}us", micros);
                self.beacons.push(micros / MICROS_PER_SECOND);
            }
            "String" if self.parent_is("Details") => {
                let id = get_attribute(e, "Id").unwrap_or_default();
                let value = get_attribute(e, "Value").unwrap_or_default();
                match id.as_str() {
                    "Total Laps" => self.summary.total_laps = parse_number(&value, "Total Laps")?,
                    "Fastest Lap" => {
                        self.summary.fastest_lap = parse_number(&value, "Fastest Lap")?
                    }
                    "Fastest Time" => self.summary.fastest_time = value,
                    _ => {}
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Extract beacons and session summary from an LDX document.
///
/// # Errors
///
/// [`LdError::Xml`] on malformed XML, [`LdError::Sidecar`] on missing
/// marker times, non-numeric values or decreasing beacons.
pub fn parse_ldx(xml: &str) -> Result<Sidecar> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut state = ParserState::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                state.handle_element(e)?;
                state.path.push(String::from_utf8_lossy(e.name().as_ref()).to_string());
            }
            Event::Empty(ref e) => state.handle_element(e)?,
            Event::End(_) => {
                state.path.pop();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    debug!(
        "Parsed LDX sidecar: {} beacons, {} laps, fastest lap {} ({})",
        state.beacons.len(),
        state.summary.total_laps,
        state.summary.fastest_lap,
        state.summary.fastest_time
    );
    Sidecar::new(state.beacons, state.summary)
}

fn get_attribute(e: &BytesStart, name: &str) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name.as_bytes() {
            return Some(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
    None
}

fn required_attribute(e: &BytesStart, name: &str, element: &str) -> Result<String> {
    get_attribute(e, name).ok_or_else(|| {
        LdError::sidecar("LDX markers", format!("{} without {} attribute", element, name))
    })
}

fn parse_number<T: std::str::FromStr>(value: &str, context: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| LdError::sidecar(context, format!("'{}' is not a number", value)))
}
