//! Deserializer cases for primitive schemas, enums and fixed.

use std::any::Any;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use crate::binary::{
    decode_boolean, decode_bytes_ref, decode_double, decode_fixed_ref, decode_float, decode_index,
    decode_int, decode_int_as, decode_long, decode_long_as, decode_string, decode_string_ref,
};
use crate::error::{BuildError, DecodeError};
use crate::logical::temporal::{parse_date, parse_local, parse_time, parse_utc};
use crate::logical::uuid::parse_uuid;
use crate::logical::Decimal;
use crate::reflect::{normalize_name, EnumInfo, PrimitiveKind, TypeDescription, TypeRef};
use crate::schema::AvroSchema;
use crate::serialization::{decoder, incompatible, BuildContext, BuilderCase, Decoder};

fn int_decoder<T>() -> Decoder
where
    T: Any + TryFrom<i32>,
{
    decoder(|data| Ok(Box::new(decode_int_as::<T>(data)?)))
}

fn long_decoder<T>() -> Decoder
where
    T: Any + TryFrom<i64>,
{
    decoder(|data| Ok(Box::new(decode_long_as::<T>(data)?)))
}

/// Decoder mapping an integral wire value to the enum symbol carrying it.
fn integral_enum_decoder(info: &EnumInfo, int: bool) -> Decoder {
    let info = info.clone();
    decoder(move |data| {
        let value = if int {
            i64::from(decode_int(data)?)
        } else {
            decode_long(data)?
        };
        info.symbols
            .iter()
            .position(|symbol| symbol.value == value)
            .and_then(|index| info.from_index(index))
            .ok_or_else(|| {
                DecodeError::InvalidData(format!("{} is not a value of enum {}", value, info.name))
            })
    })
}

pub struct BooleanCase;

impl BuilderCase<Decoder> for BooleanCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        if !matches!(schema.physical(), AvroSchema::Boolean) {
            return Ok(None);
        }
        match description.primitive() {
            Some(PrimitiveKind::Boolean) => {
                Ok(Some(decoder(|data| Ok(Box::new(decode_boolean(data)?)))))
            }
            _ => Err(incompatible(schema, ty, description)),
        }
    }
}

/// `int` into any integer type that holds the value, or an enum by value.
pub struct IntCase;

impl BuilderCase<Decoder> for IntCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        if !matches!(schema.physical(), AvroSchema::Int) {
            return Ok(None);
        }
        if let TypeDescription::Enum(e) = description {
            return Ok(Some(integral_enum_decoder(&e.info, true)));
        }
        match description.primitive().and_then(|kind| dispatch_integer!(kind, int_decoder)) {
            Some(routine) => Ok(Some(routine)),
            None => Err(incompatible(schema, ty, description)),
        }
    }
}

/// `long` into any integer type that holds the value, or an enum by value.
pub struct LongCase;

impl BuilderCase<Decoder> for LongCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        if !matches!(schema.physical(), AvroSchema::Long) {
            return Ok(None);
        }
        if let TypeDescription::Enum(e) = description {
            return Ok(Some(integral_enum_decoder(&e.info, false)));
        }
        match description.primitive().and_then(|kind| dispatch_integer!(kind, long_decoder)) {
            Some(routine) => Ok(Some(routine)),
            None => Err(incompatible(schema, ty, description)),
        }
    }
}

pub struct FloatCase;

impl BuilderCase<Decoder> for FloatCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        if !matches!(schema.physical(), AvroSchema::Float) {
            return Ok(None);
        }
        match description.primitive() {
            Some(PrimitiveKind::Float { bits: 32 }) => {
                Ok(Some(decoder(|data| Ok(Box::new(decode_float(data)?)))))
            }
            Some(PrimitiveKind::Float { .. }) => {
                Ok(Some(decoder(|data| Ok(Box::new(f64::from(decode_float(data)?))))))
            }
            _ => Err(incompatible(schema, ty, description)),
        }
    }
}

pub struct DoubleCase;

impl BuilderCase<Decoder> for DoubleCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        if !matches!(schema.physical(), AvroSchema::Double) {
            return Ok(None);
        }
        match description.primitive() {
            Some(PrimitiveKind::Float { bits: 32 }) => {
                Ok(Some(decoder(|data| Ok(Box::new(decode_double(data)? as f32)))))
            }
            Some(PrimitiveKind::Float { .. }) => {
                Ok(Some(decoder(|data| Ok(Box::new(decode_double(data)?)))))
            }
            _ => Err(incompatible(schema, ty, description)),
        }
    }
}

/// Box raw bytes as `Vec<u8>` or `bytes::Bytes`.
fn boxed_bytes(bytes: &[u8], shared: bool) -> Box<dyn Any> {
    if shared {
        Box::new(bytes::Bytes::copy_from_slice(bytes))
    } else {
        Box::new(bytes.to_vec())
    }
}

pub struct BytesCase;

impl BuilderCase<Decoder> for BytesCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        if !matches!(schema.physical(), AvroSchema::Bytes) {
            return Ok(None);
        }
        match description.primitive() {
            Some(PrimitiveKind::Bytes { shared }) => Ok(Some(decoder(move |data| {
                Ok(boxed_bytes(decode_bytes_ref(data)?, shared))
            }))),
            _ => Err(incompatible(schema, ty, description)),
        }
    }
}

pub struct FixedCase;

impl BuilderCase<Decoder> for FixedCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        let AvroSchema::Fixed(fixed) = schema.physical() else {
            return Ok(None);
        };
        let size = fixed.size;
        match description.primitive() {
            Some(PrimitiveKind::Bytes { shared }) => Ok(Some(decoder(move |data| {
                Ok(boxed_bytes(decode_fixed_ref(data, size)?, shared))
            }))),
            _ => Err(incompatible(schema, ty, description)),
        }
    }
}

/// `null` into `()` or an absent optional.
pub struct NullCase;

impl BuilderCase<Decoder> for NullCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        if !matches!(schema.physical(), AvroSchema::Null) {
            return Ok(None);
        }
        match description {
            TypeDescription::Primitive(PrimitiveKind::Unit) => {
                Ok(Some(decoder(|_data| Ok(Box::new(())))))
            }
            TypeDescription::Optional(option) => {
                let option = option.clone();
                Ok(Some(decoder(move |_data| Ok(option.none()))))
            }
            _ => Err(incompatible(schema, ty, description)),
        }
    }
}

/// `string` into text and into types with a canonical text form.
pub struct StringCase;

impl BuilderCase<Decoder> for StringCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        if !matches!(schema.physical(), AvroSchema::String) {
            return Ok(None);
        }
        let routine = match description {
            TypeDescription::Enum(e) if !e.integral => {
                let info = e.info.clone();
                decoder(move |data| {
                    let text = decode_string_ref(data)?;
                    let name = normalize_name(text);
                    info.symbols
                        .iter()
                        .position(|symbol| normalize_name(&symbol.name) == name)
                        .and_then(|index| info.from_index(index))
                        .ok_or_else(|| {
                            DecodeError::InvalidData(format!(
                                "'{}' is not a symbol of enum {}",
                                text, info.name
                            ))
                        })
                })
            }
            TypeDescription::Primitive(kind) => match kind {
                PrimitiveKind::Text => decoder(|data| Ok(Box::new(decode_string(data)?))),
                PrimitiveKind::Uuid => text_decoder::<Uuid>(parse_uuid),
                PrimitiveKind::Decimal => text_decoder::<Decimal>(|text| {
                    text.parse()
                        .map_err(|err: crate::logical::ParseDecimalError| {
                            DecodeError::InvalidData(err.to_string())
                        })
                }),
                PrimitiveKind::Timestamp => text_decoder::<DateTime<Utc>>(parse_utc),
                PrimitiveKind::LocalTimestamp => text_decoder::<NaiveDateTime>(parse_local),
                PrimitiveKind::Date => text_decoder::<NaiveDate>(parse_date),
                PrimitiveKind::Time => text_decoder::<NaiveTime>(parse_time),
                _ => return Err(incompatible(schema, ty, description)),
            },
            _ => return Err(incompatible(schema, ty, description)),
        };
        Ok(Some(routine))
    }
}

fn text_decoder<T: Any>(parse: fn(&str) -> Result<T, DecodeError>) -> Decoder {
    decoder(move |data| Ok(Box::new(parse(decode_string_ref(data)?)?)))
}

/// `enum` into a fieldless enum, matching symbols by normalized name.
///
/// A wire symbol the type lacks falls back to the schema's default symbol
/// when the type has that one; otherwise reading it fails.
pub struct EnumCase;

impl BuilderCase<Decoder> for EnumCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        let AvroSchema::Enum(enum_schema) = schema.physical() else {
            return Ok(None);
        };
        let TypeDescription::Enum(e) = description else {
            return Err(incompatible(schema, ty, description));
        };
        if e.integral {
            return Err(incompatible(schema, ty, description));
        }
        let position = |symbol: &str| {
            let name = normalize_name(symbol);
            e.info
                .symbols
                .iter()
                .position(|s| normalize_name(&s.name) == name)
        };
        let fallback = enum_schema.default.as_deref().and_then(position);
        // Type symbol index for each wire symbol
        let positions: Vec<Option<usize>> = enum_schema
            .symbols
            .iter()
            .map(|symbol| position(symbol).or(fallback))
            .collect();
        let info = e.info.clone();
        let symbols = enum_schema.symbols.clone();
        Ok(Some(decoder(move |data| {
            let index = decode_index(data, symbols.len(), "enum")?;
            positions[index]
                .and_then(|position| info.from_index(position))
                .ok_or_else(|| {
                    DecodeError::InvalidData(format!(
                        "symbol '{}' has no counterpart in enum {}",
                        symbols[index], info.name
                    ))
                })
        })))
    }
}
