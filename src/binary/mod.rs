//! Bit-exact primitives of the Avro binary encoding
//!
//! Decoders read from a `&mut &[u8]` cursor that is advanced past the value;
//! encoders append to a `BytesMut`.

pub mod decode;
pub mod encode;
pub mod varint;

pub use decode::{
    check_block_count, decode_block_count, decode_boolean, decode_bytes, decode_bytes_ref, decode_double,
    decode_fixed, decode_fixed_ref, decode_float, decode_index, decode_int, decode_int_as,
    decode_long, decode_long_as, decode_null, decode_string, decode_string_ref, decode_unsigned,
    MAX_ZERO_WIDTH_ITEMS,
};
pub use encode::{
    encode_boolean, encode_bytes, encode_double, encode_fixed, encode_float, encode_int_from,
    encode_long, encode_long_from, encode_string, encode_unsigned,
};
pub use varint::{decode_varint, decode_zigzag, encode_varint, encode_zigzag, skip_varint};
