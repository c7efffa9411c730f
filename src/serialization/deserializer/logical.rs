//! Deserializer cases for logical types.
//!
//! Mirrors the serializer: a case claims its logical annotation only for a
//! target kind it understands.

use crate::binary::{decode_bytes_ref, decode_fixed_ref, decode_int, decode_long, decode_string_ref};
use crate::error::BuildError;
use crate::logical::temporal::{
    days_to_date, ticks_to_span, ticks_to_time, ticks_to_timestamp, ticks_to_utc,
};
use crate::logical::uuid::{parse_uuid, uuid_from_bytes};
use crate::logical::{AvroDuration, Decimal, TimeUnit, DURATION_SIZE, UUID_SIZE};
use crate::reflect::{PrimitiveKind, TypeDescription, TypeRef};
use crate::schema::{AvroSchema, LogicalTypeName};
use crate::serialization::{decoder, incompatible, BuildContext, BuilderCase, Decoder};

/// `decimal` on `bytes` or `fixed` into [`Decimal`] at the schema's scale.
pub struct DecimalCase;

impl BuilderCase<Decoder> for DecimalCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        let Some(LogicalTypeName::Decimal { scale, .. }) = schema.logical_type() else {
            return Ok(None);
        };
        if description.primitive() != Some(PrimitiveKind::Decimal) {
            return Ok(None);
        }
        match schema.physical() {
            AvroSchema::Bytes => Ok(Some(decoder(move |data| {
                let unscaled = Decimal::decode_unscaled(decode_bytes_ref(data)?)?;
                Ok(Box::new(Decimal::new(unscaled, scale)))
            }))),
            AvroSchema::Fixed(fixed) => {
                let size = fixed.size;
                Ok(Some(decoder(move |data| {
                    let unscaled = Decimal::decode_unscaled(decode_fixed_ref(data, size)?)?;
                    Ok(Box::new(Decimal::new(unscaled, scale)))
                })))
            }
            _ => Err(incompatible(schema, ty, description)),
        }
    }
}

pub struct DateCase;

impl BuilderCase<Decoder> for DateCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        _ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        if schema.logical_type() != Some(LogicalTypeName::Date)
            || description.primitive() != Some(PrimitiveKind::Date)
        {
            return Ok(None);
        }
        Ok(Some(decoder(|data| Ok(Box::new(days_to_date(decode_int(data)?)?)))))
    }
}

/// `time-millis` and `time-micros` into [`chrono::NaiveTime`] or a
/// [`chrono::TimeDelta`] since midnight.
pub struct TimeCase;

impl BuilderCase<Decoder> for TimeCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        _ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        let unit = match schema.logical_type() {
            Some(LogicalTypeName::TimeMillis) => TimeUnit::Millis,
            Some(LogicalTypeName::TimeMicros) => TimeUnit::Micros,
            _ => return Ok(None),
        };
        let routine = match description.primitive() {
            Some(PrimitiveKind::Time) => {
                decoder(move |data| Ok(Box::new(ticks_to_time(decode_long(data)?, unit)?)))
            }
            Some(PrimitiveKind::TimeSpan) => {
                decoder(move |data| Ok(Box::new(ticks_to_span(decode_long(data)?, unit)?)))
            }
            _ => return Ok(None),
        };
        Ok(Some(routine))
    }
}

/// Timestamps of every precision into [`chrono::DateTime<chrono::Utc>`] or
/// [`chrono::NaiveDateTime`].
pub struct TimestampCase;

impl BuilderCase<Decoder> for TimestampCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        _ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        let unit = match schema.logical_type() {
            Some(
                logical @ (LogicalTypeName::TimestampMillis
                | LogicalTypeName::TimestampMicros
                | LogicalTypeName::TimestampNanos
                | LogicalTypeName::LocalTimestampMillis
                | LogicalTypeName::LocalTimestampMicros
                | LogicalTypeName::LocalTimestampNanos),
            ) => TimeUnit::of(logical),
            _ => None,
        };
        let Some(unit) = unit else {
            return Ok(None);
        };
        let routine = match description.primitive() {
            Some(PrimitiveKind::Timestamp) => {
                decoder(move |data| Ok(Box::new(ticks_to_utc(decode_long(data)?, unit)?)))
            }
            Some(PrimitiveKind::LocalTimestamp) => {
                decoder(move |data| Ok(Box::new(ticks_to_timestamp(decode_long(data)?, unit)?)))
            }
            _ => return Ok(None),
        };
        Ok(Some(routine))
    }
}

pub struct DurationCase;

impl BuilderCase<Decoder> for DurationCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        if schema.logical_type() != Some(LogicalTypeName::Duration) {
            return Ok(None);
        }
        let kind = description.primitive();
        if !matches!(kind, Some(PrimitiveKind::Duration | PrimitiveKind::TimeSpan)) {
            return Ok(None);
        }
        match schema.physical() {
            AvroSchema::Fixed(fixed) if fixed.size == DURATION_SIZE => {}
            _ => return Err(incompatible(schema, ty, description)),
        }
        let routine = if kind == Some(PrimitiveKind::Duration) {
            decoder(|data| {
                Ok(Box::new(AvroDuration::from_bytes(decode_fixed_ref(data, DURATION_SIZE)?)?))
            })
        } else {
            // Months cannot be expressed as a span and fail here
            decoder(|data| {
                let duration = AvroDuration::from_bytes(decode_fixed_ref(data, DURATION_SIZE)?)?;
                Ok(Box::new(duration.to_span()?))
            })
        };
        Ok(Some(routine))
    }
}

pub struct UuidCase;

impl BuilderCase<Decoder> for UuidCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        if schema.logical_type() != Some(LogicalTypeName::Uuid)
            || description.primitive() != Some(PrimitiveKind::Uuid)
        {
            return Ok(None);
        }
        match schema.physical() {
            AvroSchema::String => Ok(Some(decoder(|data| {
                Ok(Box::new(parse_uuid(decode_string_ref(data)?)?))
            }))),
            AvroSchema::Fixed(fixed) if fixed.size == UUID_SIZE => Ok(Some(decoder(|data| {
                Ok(Box::new(uuid_from_bytes(decode_fixed_ref(data, UUID_SIZE)?)?))
            }))),
            _ => Err(incompatible(schema, ty, description)),
        }
    }
}

