//! Avro binary encoding of primitive wire types.

use std::any::type_name;
use std::fmt::Display;

use bytes::{BufMut, BytesMut};

use crate::error::EncodeError;

use super::varint::{encode_varint, encode_zigzag};

/// Encode a boolean as a single byte.
#[inline]
pub fn encode_boolean(buf: &mut BytesMut, value: bool) {
    buf.put_u8(value as u8);
}

/// Encode a 64-bit signed integer (zigzag varint).
#[inline]
pub fn encode_long(buf: &mut BytesMut, value: i64) {
    encode_zigzag(buf, value);
}

/// Encode any integer as an `int`, failing when it does not fit in 32 bits.
#[inline]
pub fn encode_int_from<T>(buf: &mut BytesMut, value: T) -> Result<(), EncodeError>
where
    T: TryInto<i32> + Copy + Display,
{
    let int: i32 = value.try_into().map_err(|_| {
        EncodeError::Overflow(format!(
            "{} ({}) does not fit in an int",
            value,
            type_name::<T>()
        ))
    })?;
    encode_zigzag(buf, int as i64);
    Ok(())
}

/// Encode any integer as a `long`, failing when it does not fit in 64 bits.
#[inline]
pub fn encode_long_from<T>(buf: &mut BytesMut, value: T) -> Result<(), EncodeError>
where
    T: TryInto<i64> + Copy + Display,
{
    let long: i64 = value.try_into().map_err(|_| {
        EncodeError::Overflow(format!(
            "{} ({}) does not fit in a long",
            value,
            type_name::<T>()
        ))
    })?;
    encode_zigzag(buf, long);
    Ok(())
}

/// Encode an unsigned varint (no zigzag).
#[inline]
pub fn encode_unsigned(buf: &mut BytesMut, value: u64) {
    encode_varint(buf, value);
}

/// Encode a 32-bit IEEE 754 float, little-endian.
#[inline]
pub fn encode_float(buf: &mut BytesMut, value: f32) {
    buf.put_f32_le(value);
}

/// Encode a 64-bit IEEE 754 double, little-endian.
#[inline]
pub fn encode_double(buf: &mut BytesMut, value: f64) {
    buf.put_f64_le(value);
}

/// Encode a length-prefixed byte sequence.
#[inline]
pub fn encode_bytes(buf: &mut BytesMut, value: &[u8]) {
    encode_zigzag(buf, value.len() as i64);
    buf.put_slice(value);
}

/// Encode a length-prefixed UTF-8 string.
#[inline]
pub fn encode_string(buf: &mut BytesMut, value: &str) {
    encode_bytes(buf, value.as_bytes());
}

/// Encode a fixed-size byte array (no length prefix).
#[inline]
pub fn encode_fixed(buf: &mut BytesMut, value: &[u8], size: usize) -> Result<(), EncodeError> {
    if value.len() != size {
        return Err(EncodeError::InvalidValue(format!(
            "fixed value has {} bytes, schema requires {}",
            value.len(),
            size
        )));
    }
    buf.put_slice(value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_int_from_overflow() {
        let mut buf = BytesMut::new();
        assert!(matches!(
            encode_int_from(&mut buf, i64::from(i32::MAX) + 1),
            Err(EncodeError::Overflow(_))
        ));
        assert!(buf.is_empty());
        encode_int_from(&mut buf, u16::MAX).unwrap();
        assert_eq!(&buf[..], &[0xFE, 0xFF, 0x07]);
    }

    #[test]
    fn test_encode_long_from_u64_overflow() {
        let mut buf = BytesMut::new();
        assert!(matches!(
            encode_long_from(&mut buf, u64::MAX),
            Err(EncodeError::Overflow(_))
        ));
    }

    #[test]
    fn test_encode_string() {
        let mut buf = BytesMut::new();
        encode_string(&mut buf, "abc");
        assert_eq!(&buf[..], &[0x06, b'a', b'b', b'c']);
    }

    #[test]
    fn test_encode_float_little_endian() {
        let mut buf = BytesMut::new();
        encode_float(&mut buf, 1.0);
        assert_eq!(&buf[..], &[0x00, 0x00, 0x80, 0x3F]);
    }

    #[test]
    fn test_encode_fixed_wrong_size() {
        let mut buf = BytesMut::new();
        assert!(encode_fixed(&mut buf, &[1, 2, 3], 4).is_err());
        encode_fixed(&mut buf, &[1, 2, 3, 4], 4).unwrap();
        assert_eq!(buf.len(), 4);
    }
}
