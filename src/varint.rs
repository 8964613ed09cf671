//! Variable-length integer decoding (C2).
//!
//! A varint is a static Huffman encoding of 64-bit twos-complement integers
//! that uses less space for small positive values. It is between 1 and 9
//! bytes: zero or more bytes with the high bit set, followed by one byte
//! with the high bit clear, or nine bytes total, whichever is shorter. The
//! lower seven bits of each of the first eight bytes and all eight bits of
//! the ninth are used to reconstruct the value, most-significant byte
//! first.

use crate::error::{EngineError, Result};

/// Decodes a varint starting at `bytes[0]`. Returns the decoded value and
/// the number of bytes consumed (1..=9). `origin` is only used to annotate
/// the error with an absolute file offset.
pub fn read_varint(bytes: &[u8], origin: u64) -> Result<(i64, u8)> {
    let mut value: i64 = 0;
    let mut consumed: u8 = 0;

    for (i, &byte) in bytes.iter().take(9).enumerate() {
        consumed += 1;
        if i == 8 {
            // the ninth byte contributes all 8 bits, no continuation bit
            value = (value << 8) | byte as i64;
            return Ok((value, consumed));
        }

        value = (value << 7) | (byte & 0x7f) as i64;
        if byte & 0x80 == 0 {
            return Ok((value, consumed));
        }
    }

    Err(EngineError::TruncatedVarint {
        offset: origin + consumed as u64,
    })
}

/// Encodes `v` the way SQLite itself would — the inverse of `read_varint`,
/// used only by fixture-building tests elsewhere in the crate (`btree.rs`,
/// `catalog.rs`, `query.rs`) that need to hand-assemble page bytes.
#[cfg(test)]
pub(crate) fn encode_varint(v: u64) -> Vec<u8> {
    fn group7_msb_first(v: u64, groups: usize) -> Vec<u8> {
        (0..groups)
            .rev()
            .map(|i| ((v >> (7 * i)) & 0x7f) as u8)
            .collect()
    }

    if v >= 1 << 56 {
        let high56 = v >> 8;
        let mut out: Vec<u8> = group7_msb_first(high56, 8)
            .into_iter()
            .map(|b| b | 0x80)
            .collect();
        out.push((v & 0xff) as u8);
        return out;
    }

    let mut groups = 1;
    while groups < 8 && v >= 1 << (7 * groups) {
        groups += 1;
    }
    let mut bytes = group7_msb_first(v, groups);
    let last = bytes.len() - 1;
    for b in &mut bytes[..last] {
        *b |= 0x80;
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_byte() {
        assert_eq!(read_varint(&[0x00], 0).unwrap(), (0, 1));
        assert_eq!(read_varint(&[0x04], 0).unwrap(), (4, 1));
        assert_eq!(read_varint(&[0x7f], 0).unwrap(), (127, 1));
    }

    #[test]
    fn two_byte() {
        assert_eq!(read_varint(&[0x81, 0x01], 0).unwrap(), (129, 2));
    }

    #[test]
    fn nine_byte_uses_all_bits_of_last_byte() {
        let bytes = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
        let (value, consumed) = read_varint(&bytes, 0).unwrap();
        assert_eq!(consumed, 9);
        assert_eq!(value, -1i64);
    }

    #[test]
    fn truncated_stream_is_an_error() {
        let err = read_varint(&[0x81, 0x81], 0).unwrap_err();
        assert!(matches!(err, EngineError::TruncatedVarint { .. }));
    }

    #[test]
    fn round_trips_through_sqlite_varint_encoder() {
        // testable property 5 in spec.md §8.
        for v in [0u64, 1, 127, 128, 16384, 2u64.pow(35), u64::MAX] {
            let encoded = encode_varint(v);
            assert!(encoded.len() <= 9);
            let (decoded, consumed) = read_varint(&encoded, 0).unwrap();
            assert_eq!(consumed as usize, encoded.len());
            assert_eq!(decoded as u64, v);
        }
    }
}
