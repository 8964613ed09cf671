//! Serial-type decoding (C3): maps a record's per-column serial-type code to
//! its on-disk width and, given the matching payload bytes, to a typed
//! value. Grounded on the teacher's `sql_data_types::SerialType` /
//! `SerialData`, flattened into one enum per value so the record decoder
//! (C4) can hand back typed columns directly instead of a parallel
//! type/data pair.

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialType(pub i64);

impl SerialType {
    /// Width in bytes of the payload for this serial type. Per spec.md §4.2
    /// a width of -1 must never be returned; any code that would produce
    /// one is rejected up front.
    pub fn width(self) -> Result<usize> {
        let n = self.0;
        let width = match n {
            0 => 0,
            1 => 1,
            2 => 2,
            3 => 3,
            4 => 4,
            5 => 6,
            6 => 8,
            7 => 8,
            8 | 9 => 0,
            n if n >= 12 && n % 2 == 0 => ((n - 12) / 2) as usize,
            n if n >= 13 && n % 2 == 1 => ((n - 13) / 2) as usize,
            _ => return Err(EngineError::BadSerialType(n)),
        };
        Ok(width)
    }

    pub fn is_text(self) -> bool {
        self.0 >= 13 && self.0 % 2 == 1
    }

    pub fn is_blob(self) -> bool {
        self.0 >= 12 && self.0 % 2 == 0
    }
}

/// A decoded column value. Integer widths narrower than 64 bits are widened
/// to `i64` once decoded since the spec treats columns as logical values
/// past the wire width; the raw byte slice is never interpreted further
/// than this by the record decoder (§4.3).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Zero,
    One,
    Blob(Vec<u8>),
    Text(String),
}

impl Value {
    pub fn decode(serial: SerialType, bytes: &[u8]) -> Result<Self> {
        let width = serial.width()?;
        if bytes.len() < width {
            return Err(EngineError::UnexpectedEof);
        }
        let body = &bytes[..width];

        Ok(match serial.0 {
            0 => Value::Null,
            1 => Value::Integer(body[0] as i8 as i64),
            2 => Value::Integer(i16::from_be_bytes(body.try_into().unwrap()) as i64),
            3 => Value::Integer(sign_extend_i24(body)),
            4 => Value::Integer(i32::from_be_bytes(body.try_into().unwrap()) as i64),
            5 => Value::Integer(sign_extend_i48(body)),
            6 => Value::Integer(i64::from_be_bytes(body.try_into().unwrap())),
            7 => Value::Float(f64::from_be_bytes(body.try_into().unwrap())),
            8 => Value::Zero,
            9 => Value::One,
            n if n >= 12 && n % 2 == 0 => Value::Blob(body.to_vec()),
            n if n >= 13 && n % 2 == 1 => {
                Value::Text(String::from_utf8_lossy(body).into_owned())
            }
            n => return Err(EngineError::BadSerialType(n)),
        })
    }

    /// Renders the value the way the command-line surface prints a
    /// projected column (§4.6.5): text as-is, integers as decimal, blobs as
    /// nothing meaningful is specified so we fall back to lossy text.
    pub fn display(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Zero => "0".to_string(),
            Value::One => "1".to_string(),
            Value::Blob(b) => String::from_utf8_lossy(b).into_owned(),
            Value::Text(s) => s.clone(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Zero => Some(0),
            Value::One => Some(1),
            _ => None,
        }
    }

    /// Raw bytes for byte-lexicographic comparison (§4.6.3). Text and blob
    /// columns compare on their content bytes; integers compare on their
    /// big-endian representation, which is sufficient for the predicate
    /// comparisons this engine performs (equality only, never range scans).
    pub fn comparison_bytes(&self) -> Vec<u8> {
        match self {
            Value::Null => Vec::new(),
            Value::Text(s) => s.as_bytes().to_vec(),
            Value::Blob(b) => b.clone(),
            Value::Integer(i) => i.to_be_bytes().to_vec(),
            Value::Zero => 0i64.to_be_bytes().to_vec(),
            Value::One => 1i64.to_be_bytes().to_vec(),
            Value::Float(f) => f.to_be_bytes().to_vec(),
        }
    }
}

fn sign_extend_i24(body: &[u8]) -> i64 {
    let mut widened = [0u8; 4];
    widened[1..4].copy_from_slice(body);
    let mut v = i32::from_be_bytes(widened);
    if body[0] & 0x80 != 0 {
        v |= !0xff_ffffu32 as i32;
    }
    v as i64
}

fn sign_extend_i48(body: &[u8]) -> i64 {
    let mut widened = [0u8; 8];
    widened[2..8].copy_from_slice(body);
    let mut v = i64::from_be_bytes(widened);
    if body[0] & 0x80 != 0 {
        v |= !0x0000_ffff_ffff_ffffi64;
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_match_the_format_table() {
        assert_eq!(SerialType(0).width().unwrap(), 0);
        assert_eq!(SerialType(1).width().unwrap(), 1);
        assert_eq!(SerialType(5).width().unwrap(), 6);
        assert_eq!(SerialType(6).width().unwrap(), 8);
        assert_eq!(SerialType(8).width().unwrap(), 0);
        assert_eq!(SerialType(12).width().unwrap(), 0); // empty blob
        assert_eq!(SerialType(14).width().unwrap(), 1); // 1-byte blob
        assert_eq!(SerialType(13).width().unwrap(), 0); // empty text
        assert_eq!(SerialType(15).width().unwrap(), 1); // 1-byte text
    }

    #[test]
    fn reserved_codes_are_rejected() {
        assert!(matches!(
            SerialType(10).width(),
            Err(EngineError::BadSerialType(10))
        ));
        assert!(matches!(
            SerialType(11).width(),
            Err(EngineError::BadSerialType(11))
        ));
    }

    #[test]
    fn decodes_negative_i24_and_i48_with_sign_extension() {
        let v = Value::decode(SerialType(3), &[0xff, 0xff, 0xff]).unwrap();
        assert_eq!(v, Value::Integer(-1));

        let v = Value::decode(SerialType(5), &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff]).unwrap();
        assert_eq!(v, Value::Integer(-1));
    }

    #[test]
    fn decodes_text() {
        let v = Value::decode(SerialType(13 + 2 * 5), b"hello").unwrap();
        assert_eq!(v, Value::Text("hello".to_string()));
    }
}
