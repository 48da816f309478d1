//! Fixed-layout record decoding
//!
//! Every structure in an LD log is a packed little-endian record at some byte
//! offset of the file buffer. A [`Layout`] lists the record's fields in wire
//! order; [`decode_record`] reads exactly [`Layout::size`] bytes and yields a
//! [`Record`] holding the materialized fields by name.

use crate::{LdError, Result};
use tracing::trace;

/// Wire representation of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    /// Fixed-length text, truncated at the first NUL byte
    Str(usize),
    /// Opaque bytes, consumed but not materialized
    Skip(usize),
}

impl FieldKind {
    /// Width of the field in bytes.
    pub const fn width(&self) -> usize {
        match self {
            FieldKind::U8 | FieldKind::I8 => 1,
            FieldKind::U16 | FieldKind::I16 => 2,
            FieldKind::U32 | FieldKind::I32 => 4,
            FieldKind::U64 | FieldKind::I64 => 8,
            FieldKind::Str(n) | FieldKind::Skip(n) => *n,
        }
    }
}

/// Named field in a record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }

    pub const fn skip(width: usize) -> Self {
        Self { name: "", kind: FieldKind::Skip(width) }
    }
}

/// Ordered field list describing one record type.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub name: &'static str,
    pub fields: &'static [Field],
}

impl Layout {
    /// Total record width in bytes.
    pub const fn size(&self) -> usize {
        let mut total = 0;
        let mut i = 0;
        while i < self.fields.len() {
            total += self.fields[i].kind.width();
            i += 1;
        }
        total
    }

    /// Byte offset of a named field relative to the record start.
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        let mut offset = 0;
        for field in self.fields {
            if !name.is_empty() && field.name == name {
                return Some(offset);
            }
            offset += field.kind.width();
        }
        None
    }
}

/// Materialized field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

/// A decoded record: its source offset plus its named field values.
#[derive(Debug, Clone)]
pub struct Record {
    layout: &'static str,
    offset: usize,
    values: Vec<(&'static str, FieldValue)>,
}

impl Record {
    /// Byte offset the record was decoded from.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.iter().find(|(field, _)| *field == name).map(|(_, value)| value)
    }

    fn missing(&self, name: &str, expected: &str) -> LdError {
        LdError::FieldNotFound {
            field: format!("{} ({})", name, expected),
            record: self.layout.to_string(),
        }
    }

    pub fn unsigned(&self, name: &str) -> Result<u64> {
        match self.get(name) {
            Some(FieldValue::Unsigned(v)) => Ok(*v),
            _ => Err(self.missing(name, "unsigned")),
        }
    }

    pub fn signed(&self, name: &str) -> Result<i64> {
        match self.get(name) {
            Some(FieldValue::Signed(v)) => Ok(*v),
            _ => Err(self.missing(name, "signed")),
        }
    }

    pub fn text(&self, name: &str) -> Result<&str> {
        match self.get(name) {
            Some(FieldValue::Text(s)) => Ok(s),
            _ => Err(self.missing(name, "text")),
        }
    }

    pub fn u32(&self, name: &str) -> Result<u32> {
        u32::try_from(self.unsigned(name)?).map_err(|_| self.missing(name, "u32"))
    }

    pub fn u16(&self, name: &str) -> Result<u16> {
        u16::try_from(self.unsigned(name)?).map_err(|_| self.missing(name, "u16"))
    }

    pub fn i16(&self, name: &str) -> Result<i16> {
        i16::try_from(self.signed(name)?).map_err(|_| self.missing(name, "i16"))
    }

    pub fn string(&self, name: &str) -> Result<String> {
        self.text(name).map(str::to_string)
    }
}

/// Decodes one record of `layout` starting at `offset` in `buffer`.
pub fn decode_record(buffer: &[u8], offset: usize, layout: &Layout) -> Result<Record> {
    let size = layout.size();
    let end = offset
        .checked_add(size)
        .filter(|end| *end <= buffer.len())
        .ok_or_else(|| {
            LdError::truncated(
                format!("{} record", layout.name),
                offset,
                size,
                buffer.len().saturating_sub(offset),
            )
        })?;
    trace!("Decoding {} record at {:#x}..{:#x}", layout.name, offset, end);

    let data = &buffer[offset..end];
    let mut values = Vec::with_capacity(layout.fields.len());
    let mut pos = 0;

    for field in layout.fields {
        let width = field.kind.width();
        let bytes = &data[pos..pos + width];
        let value = match field.kind {
            FieldKind::U8 | FieldKind::U16 | FieldKind::U32 | FieldKind::U64 => {
                Some(FieldValue::Unsigned(read_unsigned_le(bytes)))
            }
            FieldKind::I8 | FieldKind::I16 | FieldKind::I32 | FieldKind::I64 => {
                Some(FieldValue::Signed(read_signed_le(bytes)))
            }
            FieldKind::Str(_) => Some(FieldValue::Text(extract_null_terminated_string(bytes))),
            FieldKind::Skip(_) => None,
        };
        if let Some(value) = value {
            values.push((field.name, value));
        }
        pos += width;
    }

    Ok(Record { layout: layout.name, offset, values })
}

fn read_unsigned_le(bytes: &[u8]) -> u64 {
    bytes.iter().rev().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

fn read_signed_le(bytes: &[u8]) -> i64 {
    let raw = read_unsigned_le(bytes);
    let bits = bytes.len() * 8;
    if bits >= 64 {
        return raw as i64;
    }
    // sign-extend from the field width
    let shift = 64 - bits;
    ((raw << shift) as i64) >> shift
}

/// Extract null-terminated Latin-1 text from a byte slice
pub(crate) fn extract_null_terminated_string(bytes: &[u8]) -> String {
    let null_pos = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    bytes[..null_pos].iter().map(|&b| b as char).collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_LAYOUT: Layout = Layout {
        name: "sample",
        fields: &[
            Field::new("a", FieldKind::U32),
            Field::skip(2),
            Field::new("b", FieldKind::I16),
            Field::new("label", FieldKind::Str(8)),
            Field::new("c", FieldKind::U8),
        ],
    };

    fn sample_bytes() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&0xdead_beefu32.to_le_bytes());
        data.extend_from_slice(&[0xff, 0xff]);
        data.extend_from_slice(&(-42i16).to_le_bytes());
        data.extend_from_slice(b"SPEED\0xy");
        data.push(7);
        data
    }

    #[test]
    fn layout_size_is_sum_of_widths() {
        assert_eq!(SAMPLE_LAYOUT.size(), 4 + 2 + 2 + 8 + 1);
        assert_eq!(SAMPLE_LAYOUT.offset_of("b"), Some(6));
        assert_eq!(SAMPLE_LAYOUT.offset_of("label"), Some(8));
        assert_eq!(SAMPLE_LAYOUT.offset_of("missing"), None);
        assert_eq!(SAMPLE_LAYOUT.offset_of(""), None);
    }

    #[test]
    fn decodes_fields_at_offset() -> Result<()> {
        let mut buffer = vec![0u8; 3];
        buffer.extend(sample_bytes());

        let record = decode_record(&buffer, 3, &SAMPLE_LAYOUT)?;
        assert_eq!(record.offset(), 3);
        assert_eq!(record.u32("a")?, 0xdead_beef);
        assert_eq!(record.i16("b")?, -42);
        assert_eq!(record.text("label")?, "SPEED");
        assert_eq!(record.unsigned("c")?, 7);
        Ok(())
    }

    #[test]
    fn wrong_type_or_name_is_reported() -> Result<()> {
        let record = decode_record(&sample_bytes(), 0, &SAMPLE_LAYOUT)?;
        assert!(matches!(record.text("a"), Err(LdError::FieldNotFound { .. })));
        assert!(matches!(record.u32("nope"), Err(LdError::FieldNotFound { .. })));
        assert!(matches!(record.u16("a"), Err(LdError::FieldNotFound { .. })));
        Ok(())
    }

    #[test]
    fn short_buffer_is_truncated() {
        let data = sample_bytes();
        match decode_record(&data, 1, &SAMPLE_LAYOUT) {
            Err(LdError::TruncatedRecord { offset, needed, available, .. }) => {
                assert_eq!(offset, 1);
                assert_eq!(needed, SAMPLE_LAYOUT.size());
                assert_eq!(available, data.len() - 1);
            }
            other => panic!("Expected TruncatedRecord, got {:?}", other),
        }
        assert!(decode_record(&data, usize::MAX, &SAMPLE_LAYOUT).is_err());
    }

    #[test]
    fn strings_stop_at_first_nul_and_trim() {
        assert_eq!(extract_null_terminated_string(b"km/h\0\0\0\0"), "km/h");
        assert_eq!(extract_null_terminated_string(b"  Spa \0junk"), "Spa");
        assert_eq!(extract_null_terminated_string(b"NO_NUL"), "NO_NUL");
        assert_eq!(extract_null_terminated_string(&[0xe9, 0]), "\u{e9}");
        assert_eq!(extract_null_terminated_string(b"\0abc"), "");
    }

    #[test]
    fn signed_fields_sign_extend() {
        assert_eq!(read_signed_le(&[0xff]), -1);
        assert_eq!(read_signed_le(&[0x00, 0x80]), i16::MIN as i64);
        assert_eq!(read_signed_le(&(-5i32).to_le_bytes()), -5);
        assert_eq!(read_signed_le(&i64::MIN.to_le_bytes()), i64::MIN);
    }
}
