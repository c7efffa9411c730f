//! The `duration` logical type: months, days and milliseconds.
//!
//! On the wire a duration is a `fixed(12)` holding three little-endian `u32`
//! counts. The three parts are independent; a month has no fixed length.

use chrono::TimeDelta;

use crate::error::{DecodeError, EncodeError};

/// Size of the `fixed` carrying a duration.
pub const DURATION_SIZE: usize = 12;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// A calendar duration as stored on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AvroDuration {
    pub months: u32,
    pub days: u32,
    pub milliseconds: u32,
}

impl AvroDuration {
    pub const fn new(months: u32, days: u32, milliseconds: u32) -> Self {
        Self {
            months,
            days,
            milliseconds,
        }
    }

    /// Wire bytes: months, days, milliseconds, each little-endian.
    pub fn to_bytes(&self) -> [u8; DURATION_SIZE] {
        let mut out = [0u8; DURATION_SIZE];
        out[0..4].copy_from_slice(&self.months.to_le_bytes());
        out[4..8].copy_from_slice(&self.days.to_le_bytes());
        out[8..12].copy_from_slice(&self.milliseconds.to_le_bytes());
        out
    }

    /// Read the three counts from wire bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() != DURATION_SIZE {
            return Err(DecodeError::InvalidData(format!(
                "duration needs {} bytes, got {}",
                DURATION_SIZE,
                bytes.len()
            )));
        }
        let part = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        Ok(Self::new(part(0), part(4), part(8)))
    }

    /// Split a span into whole days and remaining milliseconds.
    ///
    /// Sub-millisecond precision is truncated. Negative spans and spans with
    /// more days than a `u32` holds cannot be represented.
    pub fn from_span(span: &TimeDelta) -> Result<Self, EncodeError> {
        let millis = span.num_milliseconds();
        if millis < 0 {
            return Err(EncodeError::Overflow(format!(
                "negative span {} cannot be a duration",
                span
            )));
        }
        let days = u32::try_from(millis / MILLIS_PER_DAY)
            .map_err(|_| EncodeError::Overflow(format!("{} has too many days", span)))?;
        let rest = u32::try_from(millis % MILLIS_PER_DAY).unwrap_or_default();
        Ok(Self::new(0, days, rest))
    }

    /// Convert to a span; months have no fixed length and must be zero.
    pub fn to_span(&self) -> Result<TimeDelta, DecodeError> {
        if self.months != 0 {
            return Err(DecodeError::InvalidData(format!(
                "duration of {} months has no fixed span",
                self.months
            )));
        }
        let millis = i64::from(self.days) * MILLIS_PER_DAY + i64::from(self.milliseconds);
        TimeDelta::try_milliseconds(millis)
            .ok_or_else(|| DecodeError::Overflow(format!("{} ms is not a valid span", millis)))
    }
}
