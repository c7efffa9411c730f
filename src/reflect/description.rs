//! Resolved type descriptions.

use std::any::TypeId;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::logical::{AvroDuration, Decimal};
use crate::reflect::{BoxedInfo, EnumInfo, MapInfo, OptionInfo, RecordInfo, SequenceInfo, UnionInfo};

/// Leaf kinds the codec knows how to read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// `()`
    Unit,
    Boolean,
    /// Fixed-width integer.
    Integer { bits: u8, signed: bool },
    /// IEEE 754 float of 32 or 64 bits.
    Float { bits: u8 },
    /// `String`
    Text,
    /// `Vec<u8>`, or `bytes::Bytes` when `shared`.
    Bytes { shared: bool },
    /// `uuid::Uuid`
    Uuid,
    /// `DateTime<Utc>`
    Timestamp,
    /// `NaiveDateTime`
    LocalTimestamp,
    /// `NaiveDate`
    Date,
    /// `NaiveTime`
    Time,
    /// `TimeDelta`
    TimeSpan,
    /// `AvroDuration`
    Duration,
    /// `Decimal`
    Decimal,
}

impl PrimitiveKind {
    /// Classify a type by identity.
    pub fn of(id: TypeId) -> Option<Self> {
        let table: [(TypeId, PrimitiveKind); 23] = [
            (TypeId::of::<()>(), PrimitiveKind::Unit),
            (TypeId::of::<bool>(), PrimitiveKind::Boolean),
            (TypeId::of::<i8>(), PrimitiveKind::Integer { bits: 8, signed: true }),
            (TypeId::of::<i16>(), PrimitiveKind::Integer { bits: 16, signed: true }),
            (TypeId::of::<i32>(), PrimitiveKind::Integer { bits: 32, signed: true }),
            (TypeId::of::<i64>(), PrimitiveKind::Integer { bits: 64, signed: true }),
            (TypeId::of::<u8>(), PrimitiveKind::Integer { bits: 8, signed: false }),
            (TypeId::of::<u16>(), PrimitiveKind::Integer { bits: 16, signed: false }),
            (TypeId::of::<u32>(), PrimitiveKind::Integer { bits: 32, signed: false }),
            (TypeId::of::<u64>(), PrimitiveKind::Integer { bits: 64, signed: false }),
            (TypeId::of::<f32>(), PrimitiveKind::Float { bits: 32 }),
            (TypeId::of::<f64>(), PrimitiveKind::Float { bits: 64 }),
            (TypeId::of::<String>(), PrimitiveKind::Text),
            (TypeId::of::<Vec<u8>>(), PrimitiveKind::Bytes { shared: false }),
            (TypeId::of::<bytes::Bytes>(), PrimitiveKind::Bytes { shared: true }),
            (TypeId::of::<Uuid>(), PrimitiveKind::Uuid),
            (TypeId::of::<DateTime<Utc>>(), PrimitiveKind::Timestamp),
            (TypeId::of::<NaiveDateTime>(), PrimitiveKind::LocalTimestamp),
            (TypeId::of::<NaiveDate>(), PrimitiveKind::Date),
            (TypeId::of::<NaiveTime>(), PrimitiveKind::Time),
            (TypeId::of::<TimeDelta>(), PrimitiveKind::TimeSpan),
            (TypeId::of::<AvroDuration>(), PrimitiveKind::Duration),
            (TypeId::of::<Decimal>(), PrimitiveKind::Decimal),
        ];
        table
            .iter()
            .find(|(candidate, _)| *candidate == id)
            .map(|(_, kind)| *kind)
    }

    /// Whether the kind is an integer.
    pub fn is_integer(&self) -> bool {
        matches!(self, PrimitiveKind::Integer { .. })
    }
}

/// How a fieldless enum is represented.
#[derive(Clone)]
pub struct EnumDescription {
    pub info: EnumInfo,
    /// Resolve to the underlying integral values instead of symbols.
    pub integral: bool,
}

/// What the codec builder knows about a target type.
#[derive(Clone)]
pub enum TypeDescription {
    Primitive(PrimitiveKind),
    Optional(OptionInfo),
    Boxed(BoxedInfo),
    Enum(EnumDescription),
    Array(SequenceInfo),
    Map(MapInfo),
    Record(RecordInfo),
    UnionLike(UnionInfo),
}

impl TypeDescription {
    /// Short name of the description, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            TypeDescription::Primitive(_) => "primitive",
            TypeDescription::Optional(_) => "optional",
            TypeDescription::Boxed(_) => "boxed",
            TypeDescription::Enum(e) if e.integral => "integral enum",
            TypeDescription::Enum(_) => "enum",
            TypeDescription::Array(_) => "array",
            TypeDescription::Map(_) => "map",
            TypeDescription::Record(_) => "record",
            TypeDescription::UnionLike(_) => "union",
        }
    }

    /// The primitive kind, if this is a primitive.
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        match self {
            TypeDescription::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Debug for TypeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescription::Primitive(kind) => write!(f, "Primitive({:?})", kind),
            TypeDescription::Optional(info) => write!(f, "Optional({:?})", info.inner),
            TypeDescription::Boxed(info) => write!(f, "Boxed({:?})", info.inner),
            TypeDescription::Enum(e) => write!(
                f,
                "Enum({}, {:?})",
                e.info.fullname(),
                e.info.symbols.iter().map(|s| s.name.as_str()).collect::<Vec<_>>()
            ),
            TypeDescription::Array(info) => write!(f, "Array({:?})", info.item),
            TypeDescription::Map(info) => write!(f, "Map({:?})", info.value),
            TypeDescription::Record(record) => write!(
                f,
                "Record({}, members={:?}, constructors={})",
                record.fullname(),
                record.members.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
                record.constructors.len()
            ),
            TypeDescription::UnionLike(union) => write!(
                f,
                "UnionLike({:?})",
                union.variants.iter().map(|v| v.name.as_str()).collect::<Vec<_>>()
            ),
        }
    }
}
