//! Type descriptions and the type resolver.
//!
//! Types opt in to the codec by implementing [`Reflect`], either by hand
//! with the typed builders ([`RecordInfo::builder`], [`EnumInfo::builder`],
//! [`UnionInfo::builder`]) or with the [`reflect_record!`](crate::reflect_record)
//! and [`reflect_enum!`](crate::reflect_enum) macros. The [`TypeResolver`]
//! turns those raw facts into [`TypeDescription`]s.

mod description;
mod impls;
mod info;
mod macros;
mod names;
mod resolver;

pub use description::{EnumDescription, PrimitiveKind, TypeDescription};
pub use info::{
    downcast, take, Arguments, BoxedInfo, ConstructorInfo, EnumInfo, EnumInfoBuilder, EnumSymbol,
    MapInfo, MemberInfo, OptionInfo, Parameter, ParameterInfo, RecordInfo, RecordInfoBuilder,
    Reflect, SequenceInfo, TypeInfo, TypeRef, UnionInfo, UnionInfoBuilder, VariantInfo,
};
pub(crate) use info::split_type_name;
pub use names::{matches_any, names_match, normalize_name};
pub use resolver::{
    select_constructor, ArrayResolverCase, BoxedResolverCase, EnumResolution, EnumResolverCase,
    MapResolverCase, OptionalResolverCase, PrimitiveResolverCase, RecordResolverCase,
    TypeResolver, TypeResolverCase, UnionResolverCase,
};
