//! Dates, times of day and timestamps as epoch-based tick counts.
//!
//! Every conversion to a coarser unit truncates toward zero; nothing here
//! rounds. Text forms are used when temporal values travel as `string`.

use chrono::{
    DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeDelta, Timelike,
    Utc,
};

use crate::error::{DecodeError, EncodeError};
use crate::schema::LogicalTypeName;

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
pub const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const NANOS_PER_SECOND: i128 = 1_000_000_000;
const SECONDS_PER_DAY: i64 = 86_400;

/// Text layout for local timestamps carried as strings.
pub const LOCAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Resolution of an epoch or time-of-day count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Millis,
    Micros,
    Nanos,
}

impl TimeUnit {
    /// Ticks in one second.
    pub const fn per_second(self) -> i64 {
        match self {
            TimeUnit::Millis => 1_000,
            TimeUnit::Micros => 1_000_000,
            TimeUnit::Nanos => 1_000_000_000,
        }
    }

    /// Nanoseconds in one tick.
    pub const fn nanos_per_tick(self) -> i64 {
        1_000_000_000 / self.per_second()
    }

    /// Unit of a time or timestamp logical type.
    pub fn of(logical: LogicalTypeName) -> Option<Self> {
        match logical {
            LogicalTypeName::TimeMillis
            | LogicalTypeName::TimestampMillis
            | LogicalTypeName::LocalTimestampMillis => Some(TimeUnit::Millis),
            LogicalTypeName::TimeMicros
            | LogicalTypeName::TimestampMicros
            | LogicalTypeName::LocalTimestampMicros => Some(TimeUnit::Micros),
            LogicalTypeName::TimestampNanos | LogicalTypeName::LocalTimestampNanos => {
                Some(TimeUnit::Nanos)
            }
            _ => None,
        }
    }
}

// ============================================================================
// Dates
// ============================================================================

/// Days since 1970-01-01.
pub fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Date from days since 1970-01-01.
pub fn days_to_date(days: i32) -> Result<NaiveDate, DecodeError> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| DecodeError::Overflow(format!("{} days is outside the date range", days)))
}

// ============================================================================
// Timestamps
// ============================================================================

/// Ticks since the Unix epoch, truncated toward zero.
pub fn timestamp_to_ticks(timestamp: &NaiveDateTime, unit: TimeUnit) -> Result<i64, EncodeError> {
    let utc = timestamp.and_utc();
    let nanos = i128::from(utc.timestamp()) * NANOS_PER_SECOND
        + i128::from(utc.timestamp_subsec_nanos());
    let ticks = nanos / i128::from(unit.nanos_per_tick());
    i64::try_from(ticks).map_err(|_| {
        EncodeError::Overflow(format!("{} does not fit in a {:?} timestamp", timestamp, unit))
    })
}

/// Timestamp from ticks since the Unix epoch.
pub fn ticks_to_timestamp(ticks: i64, unit: TimeUnit) -> Result<NaiveDateTime, DecodeError> {
    let per_second = unit.per_second();
    let seconds = ticks.div_euclid(per_second);
    let sub = ticks.rem_euclid(per_second) * unit.nanos_per_tick();
    u32::try_from(sub)
        .ok()
        .and_then(|nanos| DateTime::from_timestamp(seconds, nanos))
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| {
            DecodeError::Overflow(format!("{} {:?} is outside the timestamp range", ticks, unit))
        })
}

/// Ticks of a zoned timestamp since the Unix epoch.
pub fn utc_to_ticks(timestamp: &DateTime<Utc>, unit: TimeUnit) -> Result<i64, EncodeError> {
    timestamp_to_ticks(&timestamp.naive_utc(), unit)
}

/// Zoned timestamp from ticks since the Unix epoch.
pub fn ticks_to_utc(ticks: i64, unit: TimeUnit) -> Result<DateTime<Utc>, DecodeError> {
    ticks_to_timestamp(ticks, unit).map(|naive| naive.and_utc())
}

// ============================================================================
// Time of day
// ============================================================================

/// Ticks since midnight, truncated.
///
/// A leap second (nanoseconds of one second or more) has no tick count that
/// reads back as the same time, so it is rejected.
pub fn time_to_ticks(time: &NaiveTime, unit: TimeUnit) -> Result<i64, EncodeError> {
    let nanos = time.nanosecond();
    if i128::from(nanos) >= NANOS_PER_SECOND {
        return Err(EncodeError::InvalidValue(format!(
            "leap second {} is not a representable time of day",
            time
        )));
    }
    let seconds = i64::from(time.num_seconds_from_midnight());
    Ok(seconds * unit.per_second() + i64::from(nanos) / unit.nanos_per_tick())
}

/// Time of day from ticks since midnight.
pub fn ticks_to_time(ticks: i64, unit: TimeUnit) -> Result<NaiveTime, DecodeError> {
    let per_second = unit.per_second();
    if !(0..SECONDS_PER_DAY * per_second).contains(&ticks) {
        return Err(DecodeError::InvalidData(format!(
            "{} {:?} is not a time of day",
            ticks, unit
        )));
    }
    let seconds = u32::try_from(ticks / per_second).unwrap_or_default();
    let nanos = u32::try_from((ticks % per_second) * unit.nanos_per_tick()).unwrap_or_default();
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos).ok_or_else(|| {
        DecodeError::InvalidData(format!("{} {:?} is not a time of day", ticks, unit))
    })
}

/// Ticks of a time span, truncated toward zero.
pub fn span_to_ticks(span: &TimeDelta, unit: TimeUnit) -> Result<i64, EncodeError> {
    let nanos = i128::from(span.num_seconds()) * NANOS_PER_SECOND
        + i128::from(span.subsec_nanos());
    i64::try_from(nanos / i128::from(unit.nanos_per_tick()))
        .map_err(|_| EncodeError::Overflow(format!("{} does not fit in {:?}", span, unit)))
}

/// Time span from ticks.
pub fn ticks_to_span(ticks: i64, unit: TimeUnit) -> Result<TimeDelta, DecodeError> {
    let span = match unit {
        TimeUnit::Millis => TimeDelta::try_milliseconds(ticks),
        TimeUnit::Micros => Some(TimeDelta::microseconds(ticks)),
        TimeUnit::Nanos => Some(TimeDelta::nanoseconds(ticks)),
    };
    span.ok_or_else(|| DecodeError::Overflow(format!("{} {:?} is not a valid span", ticks, unit)))
}

/// Time-of-day span in ticks; spans outside one day cannot be a time of day.
pub fn span_to_time_ticks(span: &TimeDelta, unit: TimeUnit) -> Result<i64, EncodeError> {
    let ticks = span_to_ticks(span, unit)?;
    if !(0..SECONDS_PER_DAY * unit.per_second()).contains(&ticks) {
        return Err(EncodeError::Overflow(format!("{} is not a time of day", span)));
    }
    Ok(ticks)
}

// ============================================================================
// Text forms
// ============================================================================

/// RFC 3339 text with a `Z` offset.
pub fn format_utc(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse RFC 3339 text with any offset.
pub fn parse_utc(text: &str) -> Result<DateTime<Utc>, DecodeError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DecodeError::InvalidData(format!("'{}' is not an RFC 3339 timestamp: {}", text, e)))
}

/// Local timestamp text without offset.
pub fn format_local(timestamp: &NaiveDateTime) -> String {
    timestamp.format(LOCAL_TIMESTAMP_FORMAT).to_string()
}

/// Parse local timestamp text without offset.
pub fn parse_local(text: &str) -> Result<NaiveDateTime, DecodeError> {
    NaiveDateTime::parse_from_str(text, LOCAL_TIMESTAMP_FORMAT)
        .map_err(|e| DecodeError::InvalidData(format!("'{}' is not a local timestamp: {}", text, e)))
}

/// Parse an ISO 8601 calendar date.
pub fn parse_date(text: &str) -> Result<NaiveDate, DecodeError> {
    text.parse()
        .map_err(|e| DecodeError::InvalidData(format!("'{}' is not a date: {}", text, e)))
}

/// Parse an ISO 8601 time of day.
pub fn parse_time(text: &str) -> Result<NaiveTime, DecodeError> {
    text.parse()
        .map_err(|e| DecodeError::InvalidData(format!("'{}' is not a time of day: {}", text, e)))
}
