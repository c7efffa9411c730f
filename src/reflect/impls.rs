//! [`Reflect`] implementations for standard, `bytes`, `chrono` and `uuid` types.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::logical::{AvroDuration, Decimal};
use crate::reflect::{BoxedInfo, MapInfo, OptionInfo, Reflect, SequenceInfo, TypeInfo};

macro_rules! reflect_leaf {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::Leaf
                }
            }
        )*
    };
}

reflect_leaf!(
    (),
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    bytes::Bytes,
    Uuid,
    DateTime<Utc>,
    NaiveDateTime,
    NaiveDate,
    NaiveTime,
    TimeDelta,
    Decimal,
    AvroDuration,
);

impl<T: Reflect> Reflect for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::Option(OptionInfo::of::<T>())
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::Boxed(BoxedInfo::of::<T>())
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::Sequence(SequenceInfo::of::<Vec<T>, T>())
    }
}

impl<V: Reflect> Reflect for HashMap<String, V> {
    fn type_info() -> TypeInfo {
        TypeInfo::Map(MapInfo::of::<HashMap<String, V>, V>())
    }
}

impl<V: Reflect> Reflect for BTreeMap<String, V> {
    fn type_info() -> TypeInfo {
        TypeInfo::Map(MapInfo::of::<BTreeMap<String, V>, V>())
    }
}
