//! Logical type mappings.
//!
//! Each logical type refines the interpretation of a physical schema without
//! touching its wire layout. The mappings here are independent of each other
//! and of the codec builder, which only wires them to schema shapes.

pub mod decimal;
pub mod duration;
pub mod temporal;
pub mod uuid;

pub use decimal::{Decimal, ParseDecimalError, MAX_PRECISION};
pub use duration::{AvroDuration, DURATION_SIZE};
pub use temporal::TimeUnit;
pub use self::uuid::UUID_SIZE;
