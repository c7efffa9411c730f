//! Avro binary decoding of primitive wire types.
//!
//! - Varints use zigzag encoding for signed integers
//! - Floats and doubles are little-endian IEEE 754
//! - Bytes and strings are length-prefixed
//!
//! Range checking for integers lives here and only here: every numeric
//! conversion in the compiled routines goes through [`decode_int_as`] or
//! [`decode_long_as`].

use std::any::type_name;

use crate::error::DecodeError;

use super::varint::{decode_varint, decode_zigzag};

/// Decode a null value (no-op, consumes no bytes).
#[inline]
pub fn decode_null(_data: &mut &[u8]) -> Result<(), DecodeError> {
    Ok(())
}

/// Decode a boolean value.
///
/// Avro booleans are encoded as a single byte: 0x00 for false, 0x01 for true.
#[inline]
pub fn decode_boolean(data: &mut &[u8]) -> Result<bool, DecodeError> {
    let Some((&byte, rest)) = data.split_first() else {
        return Err(DecodeError::UnexpectedEof);
    };
    *data = rest;
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(DecodeError::InvalidData(format!(
            "Invalid boolean value: {}, expected 0 or 1",
            byte
        ))),
    }
}

/// Decode a 64-bit signed integer (zigzag varint encoded).
#[inline]
pub fn decode_long(data: &mut &[u8]) -> Result<i64, DecodeError> {
    decode_zigzag(data)
}

/// Decode a 32-bit signed integer (zigzag varint encoded).
#[inline]
pub fn decode_int(data: &mut &[u8]) -> Result<i32, DecodeError> {
    let long = decode_long(data)?;
    i32::try_from(long)
        .map_err(|_| DecodeError::Overflow(format!("{} does not fit in an int", long)))
}

/// Decode an `int` into any integer type, failing when it does not fit.
#[inline]
pub fn decode_int_as<T: TryFrom<i32>>(data: &mut &[u8]) -> Result<T, DecodeError> {
    let int = decode_int(data)?;
    T::try_from(int)
        .map_err(|_| DecodeError::Overflow(format!("{} does not fit in {}", int, type_name::<T>())))
}

/// Decode a `long` into any integer type, failing when it does not fit.
#[inline]
pub fn decode_long_as<T: TryFrom<i64>>(data: &mut &[u8]) -> Result<T, DecodeError> {
    let long = decode_long(data)?;
    T::try_from(long).map_err(|_| {
        DecodeError::Overflow(format!("{} does not fit in {}", long, type_name::<T>()))
    })
}

/// Decode an unsigned variable-length integer.
#[inline]
pub fn decode_unsigned(data: &mut &[u8]) -> Result<u64, DecodeError> {
    decode_varint(data)
}

/// Decode a 32-bit IEEE 754 floating-point number (little-endian).
#[inline]
pub fn decode_float(data: &mut &[u8]) -> Result<f32, DecodeError> {
    let bytes = decode_fixed_ref(data, 4)?;
    Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Decode a 64-bit IEEE 754 floating-point number (little-endian).
#[inline]
pub fn decode_double(data: &mut &[u8]) -> Result<f64, DecodeError> {
    let bytes = decode_fixed_ref(data, 8)?;
    let mut le = [0u8; 8];
    le.copy_from_slice(bytes);
    Ok(f64::from_le_bytes(le))
}

/// Decode a length prefix, rejecting negative lengths.
#[inline]
fn decode_length(data: &mut &[u8]) -> Result<usize, DecodeError> {
    let len = decode_long(data)?;
    usize::try_from(len)
        .map_err(|_| DecodeError::InvalidData(format!("Negative length: {}", len)))
}

/// Decode bytes without copying (returns a slice reference).
#[inline]
pub fn decode_bytes_ref<'a>(data: &mut &'a [u8]) -> Result<&'a [u8], DecodeError> {
    let len = decode_length(data)?;
    decode_fixed_ref(data, len)
}

/// Decode a byte array (length-prefixed).
#[inline]
pub fn decode_bytes(data: &mut &[u8]) -> Result<Vec<u8>, DecodeError> {
    decode_bytes_ref(data).map(<[u8]>::to_vec)
}

/// Decode a UTF-8 string without copying (returns a &str reference).
#[inline]
pub fn decode_string_ref<'a>(data: &mut &'a [u8]) -> Result<&'a str, DecodeError> {
    let bytes = decode_bytes_ref(data)?;
    std::str::from_utf8(bytes).map_err(|e| DecodeError::InvalidUtf8(e.to_string()))
}

/// Decode a UTF-8 string (length-prefixed).
#[inline]
pub fn decode_string(data: &mut &[u8]) -> Result<String, DecodeError> {
    decode_string_ref(data).map(str::to_string)
}

/// Decode a fixed-size byte array without copying.
#[inline]
pub fn decode_fixed_ref<'a>(data: &mut &'a [u8], size: usize) -> Result<&'a [u8], DecodeError> {
    if data.len() < size {
        return Err(DecodeError::UnexpectedEof);
    }
    let (bytes, rest) = data.split_at(size);
    *data = rest;
    Ok(bytes)
}

/// Decode a fixed-size byte array.
#[inline]
pub fn decode_fixed(data: &mut &[u8], size: usize) -> Result<Vec<u8>, DecodeError> {
    decode_fixed_ref(data, size).map(<[u8]>::to_vec)
}

/// Decode the zero-based index written ahead of an enum symbol or union branch.
///
/// An index outside `0..count` means the stream does not match the schema.
#[inline]
pub fn decode_index(data: &mut &[u8], count: usize, what: &str) -> Result<usize, DecodeError> {
    let index = decode_long(data)?;
    match usize::try_from(index) {
        Ok(index) if index < count => Ok(index),
        _ => Err(DecodeError::InvalidData(format!(
            "{} index {} out of range (0..{})",
            what, index, count
        ))),
    }
}

/// Decode the header of an array or map block.
///
/// Returns the number of items in the block; zero marks the end of the
/// collection. A negative count is followed by the block's byte size, which
/// is read and discarded.
#[inline]
pub fn decode_block_count(data: &mut &[u8]) -> Result<usize, DecodeError> {
    let count = decode_long(data)?;
    if count < 0 {
        let _byte_size = decode_long(data)?;
    }
    usize::try_from(count.unsigned_abs())
        .map_err(|_| DecodeError::InvalidData(format!("Block count {} too large", count)))
}

/// Most items a collection of zero-width items may hold.
///
/// Such items consume no input, so the input length cannot bound them.
pub const MAX_ZERO_WIDTH_ITEMS: usize = 1 << 20;

/// Reject a block count the remaining input cannot hold.
///
/// An item that takes at least one byte limits a block to `remaining` items.
/// Zero-width items are limited to [`MAX_ZERO_WIDTH_ITEMS`] per collection,
/// of which `read` have already been decoded.
#[inline]
pub fn check_block_count(
    count: usize,
    remaining: usize,
    read: usize,
    zero_width: bool,
) -> Result<(), DecodeError> {
    let limit = if zero_width {
        MAX_ZERO_WIDTH_ITEMS.saturating_sub(read)
    } else {
        remaining
    };
    if count > limit {
        return Err(DecodeError::InvalidData(format!(
            "Block count {} exceeds the {} items the input can hold",
            count, limit
        )));
    }
    Ok(())
}
