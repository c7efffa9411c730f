//! Shared varint encoding and decoding utilities.
//!
//! Avro uses the same varint encoding as Protocol Buffers:
//! - Each byte has 7 bits of data and 1 continuation bit (MSB)
//! - The continuation bit indicates if more bytes follow
//! - Bytes are in little-endian order
//!
//! For signed integers, Avro uses zigzag encoding to map signed values to unsigned:
//! - 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, 2 -> 4, ...
//! - Encoding formula: (n << 1) ^ (n >> 63)
//! - Decoding formula: (n >> 1) ^ -(n & 1)

use bytes::{BufMut, BytesMut};

use crate::error::DecodeError;

/// Longest valid encoding of a 64-bit varint.
pub const MAX_VARINT_LEN: usize = 10;

// ============================================================================
// Decoding Functions
// ============================================================================

/// Decode an unsigned variable-length integer.
///
/// # Errors
/// - `DecodeError::UnexpectedEof` if the input is truncated
/// - `DecodeError::Overflow` if the accumulated value exceeds 64 bits
/// - `DecodeError::InvalidVarint` if the varint runs past 10 bytes
#[inline]
pub fn decode_varint(data: &mut &[u8]) -> Result<u64, DecodeError> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let Some((&byte, rest)) = data.split_first() else {
            return Err(DecodeError::UnexpectedEof);
        };
        *data = rest;

        let bits = (byte & 0x7F) as u64;
        // The tenth byte may only carry the top bit of a u64
        if shift == 63 && bits > 1 {
            return Err(DecodeError::Overflow(
                "varint exceeds 64 bits".to_string(),
            ));
        }
        result |= bits << shift;

        if byte & 0x80 == 0 {
            return Ok(result);
        }

        shift += 7;
        if shift >= 64 {
            return Err(DecodeError::InvalidVarint);
        }
    }
}

/// Decode a signed variable-length integer (zigzag encoded).
#[inline]
pub fn decode_zigzag(data: &mut &[u8]) -> Result<i64, DecodeError> {
    let unsigned = decode_varint(data)?;
    Ok(((unsigned >> 1) as i64) ^ (-((unsigned & 1) as i64)))
}

/// Skip over a varint without decoding its value.
#[inline]
pub fn skip_varint(data: &mut &[u8]) -> Result<(), DecodeError> {
    for _ in 0..MAX_VARINT_LEN {
        let Some((&byte, rest)) = data.split_first() else {
            return Err(DecodeError::UnexpectedEof);
        };
        *data = rest;
        if byte & 0x80 == 0 {
            return Ok(());
        }
    }
    Err(DecodeError::InvalidVarint)
}

// ============================================================================
// Encoding Functions
// ============================================================================

/// Encode an unsigned integer as a variable-length integer.
#[inline]
pub fn encode_varint(buf: &mut BytesMut, mut value: u64) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.put_u8(byte);
            return;
        }
        buf.put_u8(byte | 0x80);
    }
}

/// Encode a signed integer as a zigzag-encoded variable-length integer.
#[inline]
pub fn encode_zigzag(buf: &mut BytesMut, value: i64) {
    let zigzag = ((value << 1) ^ (value >> 63)) as u64;
    encode_varint(buf, zigzag);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded_varint(value: u64) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_varint(&mut buf, value);
        buf.to_vec()
    }

    fn encoded_zigzag(value: i64) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_zigzag(&mut buf, value);
        buf.to_vec()
    }

    #[test]
    fn test_decode_varint_single_byte() {
        let data: &[u8] = &[0x00];
        let mut cursor = data;
        assert_eq!(decode_varint(&mut cursor).unwrap(), 0);
        assert!(cursor.is_empty());

        let mut cursor: &[u8] = &[0x7F];
        assert_eq!(decode_varint(&mut cursor).unwrap(), 127);
    }

    #[test]
    fn test_decode_varint_multi_byte() {
        let mut cursor: &[u8] = &[0x80, 0x01];
        assert_eq!(decode_varint(&mut cursor).unwrap(), 128);
        assert!(cursor.is_empty());

        let mut cursor: &[u8] = &[0xAC, 0x02];
        assert_eq!(decode_varint(&mut cursor).unwrap(), 300);

        let mut cursor: &[u8] = &[0x80, 0x80, 0x01];
        assert_eq!(decode_varint(&mut cursor).unwrap(), 16384);
    }

    #[test]
    fn test_decode_varint_u64_max() {
        let encoded = encoded_varint(u64::MAX);
        assert_eq!(encoded.len(), MAX_VARINT_LEN);
        let mut cursor = &encoded[..];
        assert_eq!(decode_varint(&mut cursor).unwrap(), u64::MAX);
    }

    #[test]
    fn test_decode_varint_eof() {
        let mut cursor: &[u8] = &[];
        assert!(matches!(
            decode_varint(&mut cursor),
            Err(DecodeError::UnexpectedEof)
        ));

        let mut cursor: &[u8] = &[0x80];
        assert!(matches!(
            decode_varint(&mut cursor),
            Err(DecodeError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_decode_varint_overflowing_tenth_byte() {
        let mut cursor: &[u8] = &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x02];
        assert!(matches!(
            decode_varint(&mut cursor),
            Err(DecodeError::Overflow(_))
        ));
    }

    #[test]
    fn test_decode_varint_too_long() {
        let mut cursor: &[u8] = &[0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x81, 0x00];
        assert!(matches!(
            decode_varint(&mut cursor),
            Err(DecodeError::InvalidVarint)
        ));
    }

    #[test]
    fn test_decode_zigzag() {
        let mut cursor: &[u8] = &[0x02];
        assert_eq!(decode_zigzag(&mut cursor).unwrap(), 1);
        let mut cursor: &[u8] = &[0x03];
        assert_eq!(decode_zigzag(&mut cursor).unwrap(), -2);
    }

    #[test]
    fn test_skip_varint() {
        let mut cursor: &[u8] = &[0x80, 0x80, 0x01, 0xFF];
        skip_varint(&mut cursor).unwrap();
        assert_eq!(cursor, &[0xFF]);
    }

    #[test]
    fn test_encode_varint() {
        assert_eq!(encoded_varint(0), vec![0x00]);
        assert_eq!(encoded_varint(127), vec![0x7F]);
        assert_eq!(encoded_varint(128), vec![0x80, 0x01]);
        assert_eq!(encoded_varint(300), vec![0xAC, 0x02]);
    }

    #[test]
    fn test_encode_zigzag() {
        assert_eq!(encoded_zigzag(0), vec![0x00]);
        assert_eq!(encoded_zigzag(-1), vec![0x01]);
        assert_eq!(encoded_zigzag(1), vec![0x02]);
        assert_eq!(encoded_zigzag(-64), vec![0x7F]);
        assert_eq!(encoded_zigzag(64), vec![0x80, 0x01]);
    }

    #[test]
    fn test_zigzag_extremes_roundtrip() {
        for value in [0i64, 1, -1, i32::MAX as i64, i32::MIN as i64, i64::MAX, i64::MIN] {
            let encoded = encoded_zigzag(value);
            let mut cursor = &encoded[..];
            assert_eq!(decode_zigzag(&mut cursor).unwrap(), value);
            assert!(cursor.is_empty());
        }
    }
}
