//! Serializer cases for logical types.
//!
//! Each case only claims its own logical annotation combined with a target
//! kind it understands; anything else falls through to the physical cases.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::binary::{encode_bytes, encode_fixed, encode_long, encode_string, encode_zigzag};
use crate::error::BuildError;
use crate::logical::temporal::{
    date_to_days, span_to_time_ticks, time_to_ticks, timestamp_to_ticks, utc_to_ticks,
};
use crate::logical::uuid::format_uuid;
use crate::logical::{AvroDuration, Decimal, TimeUnit, DURATION_SIZE, UUID_SIZE};
use crate::reflect::{downcast, PrimitiveKind, TypeDescription, TypeRef};
use crate::schema::{AvroSchema, LogicalTypeName};
use crate::serialization::{encoder, incompatible, BuildContext, BuilderCase, Encoder};

/// `decimal` on `bytes` or `fixed` from [`Decimal`].
pub struct DecimalCase;

impl BuilderCase<Encoder> for DecimalCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
        let Some(LogicalTypeName::Decimal { precision, scale }) = schema.logical_type() else {
            return Ok(None);
        };
        if description.primitive() != Some(PrimitiveKind::Decimal) {
            return Ok(None);
        }
        match schema.physical() {
            AvroSchema::Bytes => Ok(Some(encoder(move |value, buf| {
                let unscaled = downcast::<Decimal>(value)?.to_scaled(precision, scale)?;
                encode_bytes(buf, &Decimal::encode_unscaled(unscaled));
                Ok(())
            }))),
            AvroSchema::Fixed(fixed) => {
                let size = fixed.size;
                Ok(Some(encoder(move |value, buf| {
                    let unscaled = downcast::<Decimal>(value)?.to_scaled(precision, scale)?;
                    encode_fixed(buf, &Decimal::encode_unscaled_fixed(unscaled, size)?, size)
                })))
            }
            _ => Err(incompatible(schema, ty, description)),
        }
    }
}

/// `date` on `int` from [`NaiveDate`].
pub struct DateCase;

impl BuilderCase<Encoder> for DateCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        _ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
        if schema.logical_type() != Some(LogicalTypeName::Date)
            || description.primitive() != Some(PrimitiveKind::Date)
        {
            return Ok(None);
        }
        Ok(Some(encoder(|value, buf| {
            let days = date_to_days(*downcast::<NaiveDate>(value)?);
            encode_zigzag(buf, i64::from(days));
            Ok(())
        })))
    }
}

/// `time-millis` on `int` and `time-micros` on `long` from [`NaiveTime`] or
/// a [`TimeDelta`] since midnight.
pub struct TimeCase;

impl BuilderCase<Encoder> for TimeCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        _ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
        let unit = match schema.logical_type() {
            Some(LogicalTypeName::TimeMillis) => TimeUnit::Millis,
            Some(LogicalTypeName::TimeMicros) => TimeUnit::Micros,
            _ => return Ok(None),
        };
        let routine = match description.primitive() {
            Some(PrimitiveKind::Time) => encoder(move |value, buf| {
                encode_long(buf, time_to_ticks(downcast::<NaiveTime>(value)?, unit)?);
                Ok(())
            }),
            Some(PrimitiveKind::TimeSpan) => encoder(move |value, buf| {
                encode_long(buf, span_to_time_ticks(downcast::<TimeDelta>(value)?, unit)?);
                Ok(())
            }),
            _ => return Ok(None),
        };
        Ok(Some(routine))
    }
}

/// `timestamp-*` and `local-timestamp-*` on `long` from [`DateTime<Utc>`] or
/// [`NaiveDateTime`], truncating to the schema's precision.
pub struct TimestampCase;

impl BuilderCase<Encoder> for TimestampCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        _ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
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
            Some(PrimitiveKind::Timestamp) => encoder(move |value, buf| {
                encode_long(buf, utc_to_ticks(downcast::<DateTime<Utc>>(value)?, unit)?);
                Ok(())
            }),
            Some(PrimitiveKind::LocalTimestamp) => encoder(move |value, buf| {
                encode_long(buf, timestamp_to_ticks(downcast::<NaiveDateTime>(value)?, unit)?);
                Ok(())
            }),
            _ => return Ok(None),
        };
        Ok(Some(routine))
    }
}

/// `duration` on `fixed(12)` from [`AvroDuration`] or [`TimeDelta`].
pub struct DurationCase;

impl BuilderCase<Encoder> for DurationCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
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
            encoder(|value, buf| {
                encode_fixed(buf, &downcast::<AvroDuration>(value)?.to_bytes(), DURATION_SIZE)
            })
        } else {
            encoder(|value, buf| {
                let duration = AvroDuration::from_span(downcast::<TimeDelta>(value)?)?;
                encode_fixed(buf, &duration.to_bytes(), DURATION_SIZE)
            })
        };
        Ok(Some(routine))
    }
}

/// `uuid` on `string` (canonical text) or `fixed(16)` (raw bytes).
pub struct UuidCase;

impl BuilderCase<Encoder> for UuidCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        _context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
        if schema.logical_type() != Some(LogicalTypeName::Uuid)
            || description.primitive() != Some(PrimitiveKind::Uuid)
        {
            return Ok(None);
        }
        match schema.physical() {
            AvroSchema::String => Ok(Some(encoder(|value, buf| {
                encode_string(buf, &format_uuid(downcast::<Uuid>(value)?));
                Ok(())
            }))),
            AvroSchema::Fixed(fixed) if fixed.size == UUID_SIZE => Ok(Some(encoder(|value, buf| {
                encode_fixed(buf, downcast::<Uuid>(value)?.as_bytes(), UUID_SIZE)
            }))),
            _ => Err(incompatible(schema, ty, description)),
        }
    }
}
