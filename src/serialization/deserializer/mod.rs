//! Deserializer cases.

mod complex;
mod logical;
mod primitive;
mod record;
mod skip;
mod union;

pub use complex::{ArrayCase, MapCase};
pub use logical::{DateCase, DecimalCase, DurationCase, TimeCase, TimestampCase, UuidCase};
pub use primitive::{
    BooleanCase, BytesCase, DoubleCase, EnumCase, FixedCase, FloatCase, IntCase, LongCase,
    NullCase, StringCase,
};
pub use record::RecordCase;
pub use skip::build_skip;
pub use union::UnionCase;

use crate::serialization::{BuilderCase, Decoder};

/// Same order as the serializer chain.
pub fn default_cases() -> Vec<Box<dyn BuilderCase<Decoder>>> {
    vec![
        Box::new(DecimalCase),
        Box::new(DateCase),
        Box::new(TimeCase),
        Box::new(TimestampCase),
        Box::new(DurationCase),
        Box::new(UuidCase),
        Box::new(ArrayCase),
        Box::new(BooleanCase),
        Box::new(BytesCase),
        Box::new(DoubleCase),
        Box::new(EnumCase),
        Box::new(FixedCase),
        Box::new(FloatCase),
        Box::new(IntCase),
        Box::new(LongCase),
        Box::new(MapCase),
        Box::new(NullCase),
        Box::new(RecordCase),
        Box::new(StringCase),
        Box::new(UnionCase),
    ]
}
