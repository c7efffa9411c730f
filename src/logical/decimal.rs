//! Fixed-point decimal values and their two's complement wire form.
//!
//! A [`Decimal`] is an unscaled 128-bit integer plus a base-10 scale, so
//! `Decimal::new(12345, 2)` is `123.45`. On the wire the unscaled value at the
//! schema's scale is written big-endian in two's complement, using the fewest
//! bytes that keep the sign for `bytes` and sign-extended for `fixed`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::error::{DecodeError, EncodeError};

/// Largest scale (and precision) an `i128` can carry.
pub const MAX_PRECISION: u32 = 38;

/// A decimal number with an explicit scale.
///
/// Equality is structural: `1.0` and `1.00` differ because their scales differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Decimal {
    unscaled: i128,
    scale: u32,
}

/// Failure to parse a decimal from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid decimal literal '{0}'")]
pub struct ParseDecimalError(String);

impl Decimal {
    /// Create a decimal from its unscaled value and scale.
    pub const fn new(unscaled: i128, scale: u32) -> Self {
        Self { unscaled, scale }
    }

    /// The unscaled integer value.
    pub const fn unscaled(&self) -> i128 {
        self.unscaled
    }

    /// Number of digits after the decimal point.
    pub const fn scale(&self) -> u32 {
        self.scale
    }

    /// Number of significant decimal digits in the unscaled value.
    pub fn precision(&self) -> u32 {
        let mut magnitude = self.unscaled.unsigned_abs();
        let mut digits = 1;
        while magnitude >= 10 {
            magnitude /= 10;
            digits += 1;
        }
        digits
    }

    /// Convert to another scale, truncating toward zero when digits are dropped.
    ///
    /// Returns `None` when the result does not fit in 128 bits.
    pub fn rescale(&self, scale: u32) -> Option<Decimal> {
        if scale >= self.scale {
            let factor = 10i128.checked_pow(scale - self.scale)?;
            let unscaled = self.unscaled.checked_mul(factor)?;
            Some(Decimal::new(unscaled, scale))
        } else {
            let Some(factor) = 10i128.checked_pow(self.scale - scale) else {
                return Some(Decimal::new(0, scale));
            };
            Some(Decimal::new(self.unscaled / factor, scale))
        }
    }

    /// The unscaled value at `scale` checked against `precision`.
    pub fn to_scaled(&self, precision: u32, scale: u32) -> Result<i128, EncodeError> {
        let rescaled = self.rescale(scale).ok_or_else(|| {
            EncodeError::Overflow(format!("{} does not fit at scale {}", self, scale))
        })?;
        if rescaled.precision() > precision {
            return Err(EncodeError::Overflow(format!(
                "{} exceeds decimal precision {}",
                self, precision
            )));
        }
        Ok(rescaled.unscaled)
    }

    /// Minimal big-endian two's complement bytes of the unscaled value.
    pub fn encode_unscaled(unscaled: i128) -> Vec<u8> {
        let bytes = unscaled.to_be_bytes();
        let mut start = 0;
        while start < bytes.len() - 1 {
            let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
                || (bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0);
            if !redundant {
                break;
            }
            start += 1;
        }
        bytes[start..].to_vec()
    }

    /// Big-endian two's complement bytes sign-extended to exactly `size` bytes.
    pub fn encode_unscaled_fixed(unscaled: i128, size: usize) -> Result<Vec<u8>, EncodeError> {
        let minimal = Self::encode_unscaled(unscaled);
        if minimal.len() > size {
            return Err(EncodeError::Overflow(format!(
                "unscaled value {} needs {} bytes, fixed size is {}",
                unscaled,
                minimal.len(),
                size
            )));
        }
        let fill = if unscaled < 0 { 0xFF } else { 0x00 };
        let mut out = vec![fill; size - minimal.len()];
        out.extend_from_slice(&minimal);
        Ok(out)
    }

    /// Read a big-endian two's complement unscaled value.
    pub fn decode_unscaled(bytes: &[u8]) -> Result<i128, DecodeError> {
        let Some(&first) = bytes.first() else {
            return Ok(0);
        };
        let fill = if first & 0x80 != 0 { 0xFF } else { 0x00 };
        let (extension, significant) = if bytes.len() > 16 {
            bytes.split_at(bytes.len() - 16)
        } else {
            (&bytes[..0], bytes)
        };
        // Extra leading bytes are only allowed as sign extension
        if extension.iter().any(|&b| b != fill)
            || (!extension.is_empty() && (significant[0] & 0x80 != 0) != (fill == 0xFF))
        {
            return Err(DecodeError::Overflow(format!(
                "decimal of {} bytes exceeds 128 bits",
                bytes.len()
            )));
        }
        let mut buf = [fill; 16];
        buf[16 - significant.len()..].copy_from_slice(significant);
        Ok(i128::from_be_bytes(buf))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.unsigned_abs().to_string();
        let sign = if self.unscaled < 0 { "-" } else { "" };
        let scale = self.scale as usize;
        if scale == 0 {
            return write!(f, "{}{}", sign, digits);
        }
        if digits.len() > scale {
            let (whole, fraction) = digits.split_at(digits.len() - scale);
            write!(f, "{}{}.{}", sign, whole, fraction)
        } else {
            write!(f, "{}0.{}{}", sign, "0".repeat(scale - digits.len()), digits)
        }
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseDecimalError(s.to_string());
        let trimmed = s.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (whole, fraction) = body.split_once('.').unwrap_or((body, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let scale = u32::try_from(fraction.len()).map_err(|_| invalid())?;
        if scale > MAX_PRECISION {
            return Err(invalid());
        }
        let digits = format!("{}{}", whole, fraction);
        let magnitude: i128 = if digits.is_empty() {
            0
        } else {
            digits.parse().map_err(|_| invalid())?
        };
        Ok(Decimal::new(if negative { -magnitude } else { magnitude }, scale))
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal::new(value as i128, 0)
    }
}
