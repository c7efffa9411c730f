//! Serializer cases for primitive schemas, enums and fixed.

use std::any::Any;
use std::fmt::Display;

use crate::binary::{
    encode_boolean, encode_bytes, encode_double, encode_fixed, encode_float, encode_int_from,
    encode_long, encode_long_from, encode_string,
};
use crate::error::{BuildError, EncodeError};
use crate::logical::temporal::{format_local, format_utc};
use crate::logical::uuid::format_uuid;
use crate::logical::Decimal;
use crate::reflect::{downcast, normalize_name, EnumInfo, PrimitiveKind, TypeDescription, TypeRef};
use crate::schema::AvroSchema;
use crate::serialization::{encoder, incompatible, BuildContext, BuilderCase, Encoder};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

fn int_encoder<T>() -> Encoder
where
    T: Any + Copy + Display + TryInto<i32>,
{
    encoder(|value, buf| encode_int_from(buf, *downcast::<T>(value)?))
}

fn long_encoder<T>() -> Encoder
where
    T: Any + Copy + Display + TryInto<i64>,
{
    encoder(|value, buf| encode_long_from(buf, *downcast::<T>(value)?))
}

/// Encoder writing the integral value of an enum symbol.
fn integral_enum_encoder(info: &EnumInfo, int: bool) -> Encoder {
    let info = info.clone();
    let values: Vec<i64> = info.symbols.iter().map(|s| s.value).collect();
    encoder(move |value, buf| {
        let v = values[info.index_of(value)?];
        if int {
            encode_int_from(buf, v)
        } else {
            encode_long(buf, v);
            Ok(())
        }
    })
}

pub struct BooleanCase;

impl BuilderCase<Encoder> for BooleanCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
        if !matches!(schema.physical(), AvroSchema::Boolean) {
            return Ok(None);
        }
        match description.primitive() {
            Some(PrimitiveKind::Boolean) => Ok(Some(encoder(|value, buf| {
                encode_boolean(buf, *downcast::<bool>(value)?);
                Ok(())
            }))),
            _ => Err(incompatible(schema, ty, description)),
        }
    }
}

/// `int` from any integer type or an enum's integral value.
pub struct IntCase;

impl BuilderCase<Encoder> for IntCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
        if !matches!(schema.physical(), AvroSchema::Int) {
            return Ok(None);
        }
        if let TypeDescription::Enum(e) = description {
            return Ok(Some(integral_enum_encoder(&e.info, true)));
        }
        match description.primitive().and_then(|kind| dispatch_integer!(kind, int_encoder)) {
            Some(routine) => Ok(Some(routine)),
            None => Err(incompatible(schema, ty, description)),
        }
    }
}

/// `long` from any integer type or an enum's integral value.
pub struct LongCase;

impl BuilderCase<Encoder> for LongCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
        if !matches!(schema.physical(), AvroSchema::Long) {
            return Ok(None);
        }
        if let TypeDescription::Enum(e) = description {
            return Ok(Some(integral_enum_encoder(&e.info, false)));
        }
        match description.primitive().and_then(|kind| dispatch_integer!(kind, long_encoder)) {
            Some(routine) => Ok(Some(routine)),
            None => Err(incompatible(schema, ty, description)),
        }
    }
}

pub struct FloatCase;

impl BuilderCase<Encoder> for FloatCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
        if !matches!(schema.physical(), AvroSchema::Float) {
            return Ok(None);
        }
        match description.primitive() {
            Some(PrimitiveKind::Float { bits: 32 }) => Ok(Some(encoder(|value, buf| {
                encode_float(buf, *downcast::<f32>(value)?);
                Ok(())
            }))),
            Some(PrimitiveKind::Float { .. }) => Ok(Some(encoder(|value, buf| {
                encode_float(buf, *downcast::<f64>(value)? as f32);
                Ok(())
            }))),
            _ => Err(incompatible(schema, ty, description)),
        }
    }
}

pub struct DoubleCase;

impl BuilderCase<Encoder> for DoubleCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
        if !matches!(schema.physical(), AvroSchema::Double) {
            return Ok(None);
        }
        match description.primitive() {
            Some(PrimitiveKind::Float { bits: 32 }) => Ok(Some(encoder(|value, buf| {
                encode_double(buf, f64::from(*downcast::<f32>(value)?));
                Ok(())
            }))),
            Some(PrimitiveKind::Float { .. }) => Ok(Some(encoder(|value, buf| {
                encode_double(buf, *downcast::<f64>(value)?);
                Ok(())
            }))),
            _ => Err(incompatible(schema, ty, description)),
        }
    }
}

/// Borrow the bytes of a `Vec<u8>` or `bytes::Bytes` value.
fn byte_slice(value: &dyn Any, shared: bool) -> Result<&[u8], EncodeError> {
    if shared {
        Ok(downcast::<bytes::Bytes>(value)?.as_ref())
    } else {
        Ok(downcast::<Vec<u8>>(value)?.as_slice())
    }
}

pub struct BytesCase;

impl BuilderCase<Encoder> for BytesCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
        if !matches!(schema.physical(), AvroSchema::Bytes) {
            return Ok(None);
        }
        match description.primitive() {
            Some(PrimitiveKind::Bytes { shared }) => Ok(Some(encoder(move |value, buf| {
                encode_bytes(buf, byte_slice(value, shared)?);
                Ok(())
            }))),
            _ => Err(incompatible(schema, ty, description)),
        }
    }
}

/// `fixed` from a byte sequence of exactly the declared size.
pub struct FixedCase;

impl BuilderCase<Encoder> for FixedCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
        let AvroSchema::Fixed(fixed) = schema.physical() else {
            return Ok(None);
        };
        let size = fixed.size;
        match description.primitive() {
            Some(PrimitiveKind::Bytes { shared }) => Ok(Some(encoder(move |value, buf| {
                encode_fixed(buf, byte_slice(value, shared)?, size)
            }))),
            _ => Err(incompatible(schema, ty, description)),
        }
    }
}

/// `null` from `()` or an absent optional.
pub struct NullCase;

impl BuilderCase<Encoder> for NullCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
        if !matches!(schema.physical(), AvroSchema::Null) {
            return Ok(None);
        }
        match description {
            TypeDescription::Primitive(PrimitiveKind::Unit) => {
                Ok(Some(encoder(|_value, _buf| Ok(()))))
            }
            TypeDescription::Optional(option) => {
                let option = option.clone();
                Ok(Some(encoder(move |value, _buf| match option.get(value)? {
                    None => Ok(()),
                    Some(_) => Err(EncodeError::InvalidValue(format!(
                        "present {:?} cannot be written as null",
                        option.inner
                    ))),
                })))
            }
            _ => Err(incompatible(schema, ty, description)),
        }
    }
}

/// `string` from text and from types with a canonical text form.
pub struct StringCase;

impl BuilderCase<Encoder> for StringCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
        if !matches!(schema.physical(), AvroSchema::String) {
            return Ok(None);
        }
        let routine = match description {
            TypeDescription::Enum(e) if !e.integral => {
                let info = e.info.clone();
                encoder(move |value, buf| {
                    encode_string(buf, &info.symbols[info.index_of(value)?].name);
                    Ok(())
                })
            }
            TypeDescription::Primitive(kind) => match kind {
                PrimitiveKind::Text => encoder(|value, buf| {
                    encode_string(buf, downcast::<String>(value)?);
                    Ok(())
                }),
                PrimitiveKind::Uuid => text_encoder(|v: &Uuid| format_uuid(v)),
                PrimitiveKind::Decimal => text_encoder(|v: &Decimal| v.to_string()),
                PrimitiveKind::Timestamp => text_encoder(|v: &DateTime<Utc>| format_utc(v)),
                PrimitiveKind::LocalTimestamp => text_encoder(|v: &NaiveDateTime| format_local(v)),
                PrimitiveKind::Date => text_encoder(|v: &NaiveDate| v.to_string()),
                PrimitiveKind::Time => text_encoder(|v: &NaiveTime| v.to_string()),
                _ => return Err(incompatible(schema, ty, description)),
            },
            _ => return Err(incompatible(schema, ty, description)),
        };
        Ok(Some(routine))
    }
}

fn text_encoder<T: Any>(format: fn(&T) -> String) -> Encoder {
    encoder(move |value, buf| {
        encode_string(buf, &format(downcast::<T>(value)?));
        Ok(())
    })
}

/// `enum` from a fieldless enum, matching symbols by normalized name.
pub struct EnumCase;

impl BuilderCase<Encoder> for EnumCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
        let AvroSchema::Enum(enum_schema) = schema.physical() else {
            return Ok(None);
        };
        let TypeDescription::Enum(e) = description else {
            return Err(incompatible(schema, ty, description));
        };
        if e.integral {
            return Err(incompatible(schema, ty, description));
        }
        // Schema index for each type symbol; unmatched symbols fail when written
        let indexes: Vec<Option<usize>> = e
            .info
            .symbols
            .iter()
            .map(|symbol| {
                let name = normalize_name(&symbol.name);
                enum_schema
                    .symbols
                    .iter()
                    .position(|s| normalize_name(s) == name)
            })
            .collect();
        let info = e.info.clone();
        let schema_name = enum_schema.fullname();
        Ok(Some(encoder(move |value, buf| {
            let position = info.index_of(value)?;
            match indexes[position] {
                Some(index) => {
                    encode_long(buf, index as i64);
                    Ok(())
                }
                None => Err(EncodeError::InvalidValue(format!(
                    "symbol '{}' is not in enum {}",
                    info.symbols[position].name, schema_name
                ))),
            }
        })))
    }
}
