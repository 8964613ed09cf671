//! Record decoding (C4): `header_size | serial_type0..n | payload0..n`.
//!
//! Grounded on the teacher's `record.rs::Record::from_be_bytes`, trimmed to
//! the in-scope case (§1 Non-goals exclude overflow-page chasing, so the
//! teacher's `OverflowRecord` linked-list walk is not carried forward; see
//! DESIGN.md). Operates directly on an in-memory byte slice rather than
//! seeking a file handle per column, matching the pure
//! `(buffer, offset) -> (value, new_offset)` style Design Note §9 calls for.

use crate::error::{EngineError, Result};
use crate::serial_type::{SerialType, Value};
use crate::varint::read_varint;

#[derive(Debug, Clone)]
pub struct Record {
    pub columns: Vec<Value>,
}

impl Record {
    /// Decodes a record whose bytes start at `bytes[0]`. `origin` is the
    /// absolute file offset of `bytes[0]`, used only to annotate errors.
    pub fn decode(bytes: &[u8], origin: u64) -> Result<Self> {
        let (header_size, header_size_len) = read_varint(bytes, origin)?;
        let header_size = header_size as u64;

        let mut serial_types = Vec::new();
        let mut offset = header_size_len as u64;
        while offset < header_size {
            if offset as usize >= bytes.len() {
                return Err(EngineError::RecordHeaderOverrun { header_size });
            }
            let (code, len) = read_varint(&bytes[offset as usize..], origin + offset)?;
            offset += len as u64;
            if offset > header_size {
                return Err(EngineError::RecordHeaderOverrun { header_size });
            }
            serial_types.push(SerialType(code));
        }

        let mut columns = Vec::with_capacity(serial_types.len());
        let mut body_offset = header_size as usize;
        for serial in serial_types {
            let width = serial.width()?;
            let end = body_offset
                .checked_add(width)
                .ok_or(EngineError::UnexpectedEof)?;
            if end > bytes.len() {
                return Err(EngineError::UnexpectedEof);
            }
            columns.push(Value::decode(serial, &bytes[body_offset..end])?);
            body_offset = end;
        }

        Ok(Record { columns })
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.columns.get(index)
    }
}

/// A column value as a test author would name it, independent of its wire
/// serial-type code — used only by `encode_record` to build fixture rows
/// for this module's tests and for `btree.rs`/`catalog.rs`/`query.rs`.
#[cfg(test)]
pub(crate) enum FieldValue {
    Null,
    Int(i64),
    Text(String),
}

/// Encodes a row the way `Record::decode` expects to read it back:
/// `header_size | serial_type0..n | payload0..n`. Picks the narrowest
/// integer width that fits each `Int` value; assumes the encoded header
/// fits in a single-byte varint, which holds for every fixture this crate
/// builds (a handful of columns).
#[cfg(test)]
pub(crate) fn encode_record(fields: &[FieldValue]) -> Vec<u8> {
    use crate::varint::encode_varint;

    let mut serials = Vec::new();
    let mut payload = Vec::new();
    for field in fields {
        match field {
            FieldValue::Null => serials.push(0i64),
            FieldValue::Int(v) => {
                if (-128..=127).contains(v) {
                    serials.push(1);
                    payload.push(*v as i8 as u8);
                } else if (-32768..=32767).contains(v) {
                    serials.push(2);
                    payload.extend((*v as i16).to_be_bytes());
                } else {
                    serials.push(6);
                    payload.extend(v.to_be_bytes());
                }
            }
            FieldValue::Text(s) => {
                serials.push(13 + 2 * s.len() as i64);
                payload.extend(s.as_bytes());
            }
        }
    }

    let mut header_body = Vec::new();
    for serial in &serials {
        header_body.extend(encode_varint(*serial as u64));
    }
    let header_size = 1 + header_body.len();
    assert!(header_size < 128, "fixture header too large for a 1-byte varint");

    let mut out = Vec::with_capacity(header_size + payload.len());
    out.extend(encode_varint(header_size as u64));
    out.extend(header_body);
    out.extend(payload);
    out
}
