//! Type resolution: from a [`TypeRef`] to a [`TypeDescription`].
//!
//! The resolver is an ordered chain of [`TypeResolverCase`]s. Each case either
//! describes the type or declines; the first description wins and an
//! exhausted chain fails with [`BuildError::UnsupportedType`]. The default
//! chain can be replaced or extended with [`TypeResolver::with_cases`] and
//! [`TypeResolver::prepend_case`].

use tracing::trace;

use crate::error::BuildError;
use crate::reflect::{
    matches_any, EnumDescription, PrimitiveKind, RecordInfo, Reflect, TypeDescription, TypeInfo,
    TypeRef,
};
use crate::schema::RecordSchema;

/// One rule of the resolution chain.
pub trait TypeResolverCase: Send + Sync {
    /// Describe `ty`, or return `Ok(None)` to let the next case try.
    fn resolve(&self, ty: &TypeRef, info: &TypeInfo) -> Result<Option<TypeDescription>, BuildError>;
}

/// How fieldless enums resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumResolution {
    /// By symbol name.
    #[default]
    Symbolic,
    /// By underlying integral value.
    Integral,
}

/// Ordered chain of resolution cases.
pub struct TypeResolver {
    cases: Vec<Box<dyn TypeResolverCase>>,
}

impl Default for TypeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeResolver {
    /// Resolver with the default chain and symbolic enums.
    pub fn new() -> Self {
        Self::with_cases(Self::default_cases(EnumResolution::Symbolic))
    }

    /// Resolver with the default chain and the given enum representation.
    pub fn with_enum_resolution(resolution: EnumResolution) -> Self {
        Self::with_cases(Self::default_cases(resolution))
    }

    /// Resolver with an explicit chain.
    pub fn with_cases(cases: Vec<Box<dyn TypeResolverCase>>) -> Self {
        Self { cases }
    }

    /// The default chain: optional, boxed, primitive, enum, array, map, record, union.
    pub fn default_cases(resolution: EnumResolution) -> Vec<Box<dyn TypeResolverCase>> {
        vec![
            Box::new(OptionalResolverCase),
            Box::new(BoxedResolverCase),
            Box::new(PrimitiveResolverCase),
            Box::new(EnumResolverCase { resolution }),
            Box::new(ArrayResolverCase),
            Box::new(MapResolverCase),
            Box::new(RecordResolverCase),
            Box::new(UnionResolverCase),
        ]
    }

    /// Put a case ahead of the existing chain.
    pub fn prepend_case(mut self, case: Box<dyn TypeResolverCase>) -> Self {
        self.cases.insert(0, case);
        self
    }

    /// Describe `ty`.
    pub fn resolve(&self, ty: &TypeRef) -> Result<TypeDescription, BuildError> {
        let info = ty.info();
        for case in &self.cases {
            if let Some(description) = case.resolve(ty, &info)? {
                trace!(ty = ty.name(), kind = description.kind(), "Resolved type");
                return Ok(description);
            }
        }
        Err(BuildError::UnsupportedType(format!(
            "{} ({}) is not supported by any resolver case",
            ty.name(),
            info.kind()
        )))
    }

    /// Describe `T`.
    pub fn resolve_type<T: Reflect>(&self) -> Result<TypeDescription, BuildError> {
        self.resolve(&TypeRef::of::<T>())
    }
}

// ============================================================================
// Default cases
// ============================================================================

/// `Option<T>` resolves to an optional description of `T`.
pub struct OptionalResolverCase;

impl TypeResolverCase for OptionalResolverCase {
    fn resolve(&self, _ty: &TypeRef, info: &TypeInfo) -> Result<Option<TypeDescription>, BuildError> {
        Ok(match info {
            TypeInfo::Option(option) => Some(TypeDescription::Optional(option.clone())),
            _ => None,
        })
    }
}

/// `Box<T>` resolves to an indirection to `T`.
pub struct BoxedResolverCase;

impl TypeResolverCase for BoxedResolverCase {
    fn resolve(&self, _ty: &TypeRef, info: &TypeInfo) -> Result<Option<TypeDescription>, BuildError> {
        Ok(match info {
            TypeInfo::Boxed(boxed) => Some(TypeDescription::Boxed(boxed.clone())),
            _ => None,
        })
    }
}

/// Known leaf types, and `Vec<u8>` as bytes rather than a sequence.
pub struct PrimitiveResolverCase;

impl TypeResolverCase for PrimitiveResolverCase {
    fn resolve(&self, ty: &TypeRef, _info: &TypeInfo) -> Result<Option<TypeDescription>, BuildError> {
        Ok(PrimitiveKind::of(ty.id()).map(TypeDescription::Primitive))
    }
}

/// Fieldless enums, by symbol or by integral value.
pub struct EnumResolverCase {
    pub resolution: EnumResolution,
}

impl TypeResolverCase for EnumResolverCase {
    fn resolve(&self, ty: &TypeRef, info: &TypeInfo) -> Result<Option<TypeDescription>, BuildError> {
        let TypeInfo::Enum(enum_info) = info else {
            return Ok(None);
        };
        if enum_info.symbols.is_empty() {
            return Err(BuildError::UnsupportedType(format!(
                "{} declares no enum symbols",
                ty.name()
            )));
        }
        Ok(Some(TypeDescription::Enum(EnumDescription {
            info: enum_info.clone(),
            integral: self.resolution == EnumResolution::Integral,
        })))
    }
}

pub struct ArrayResolverCase;

impl TypeResolverCase for ArrayResolverCase {
    fn resolve(&self, _ty: &TypeRef, info: &TypeInfo) -> Result<Option<TypeDescription>, BuildError> {
        Ok(match info {
            TypeInfo::Sequence(sequence) => Some(TypeDescription::Array(sequence.clone())),
            _ => None,
        })
    }
}

pub struct MapResolverCase;

impl TypeResolverCase for MapResolverCase {
    fn resolve(&self, _ty: &TypeRef, info: &TypeInfo) -> Result<Option<TypeDescription>, BuildError> {
        Ok(match info {
            TypeInfo::Map(map) => Some(TypeDescription::Map(map.clone())),
            _ => None,
        })
    }
}

/// Records need at least one constructor to be usable.
pub struct RecordResolverCase;

impl TypeResolverCase for RecordResolverCase {
    fn resolve(&self, ty: &TypeRef, info: &TypeInfo) -> Result<Option<TypeDescription>, BuildError> {
        let TypeInfo::Record(record) = info else {
            return Ok(None);
        };
        if record.constructors.is_empty() {
            return Err(BuildError::UnsupportedType(format!(
                "{} declares no constructor",
                ty.name()
            )));
        }
        Ok(Some(TypeDescription::Record(record.clone())))
    }
}

pub struct UnionResolverCase;

impl TypeResolverCase for UnionResolverCase {
    fn resolve(&self, ty: &TypeRef, info: &TypeInfo) -> Result<Option<TypeDescription>, BuildError> {
        let TypeInfo::Union(union) = info else {
            return Ok(None);
        };
        if union.variants.is_empty() {
            return Err(BuildError::UnsupportedType(format!(
                "{} declares no union variants",
                ty.name()
            )));
        }
        Ok(Some(TypeDescription::UnionLike(union.clone())))
    }
}

// ============================================================================
// Constructor selection
// ============================================================================

/// Pick the constructor used to create `record` from the fields of `schema`.
///
/// A constructor is eligible when every parameter either matches a field
/// (by normalized name or alias) or has a default. Among eligible
/// constructors the one with the most parameters wins, and ties go to the
/// one declared first. A parameterless constructor is always eligible.
pub fn select_constructor(record: &RecordInfo, schema: &RecordSchema) -> Result<usize, BuildError> {
    let mut best: Option<(usize, usize)> = None;
    let mut first_unmatched: Option<&str> = None;

    for (index, constructor) in record.constructors.iter().enumerate() {
        let unmatched = constructor.parameters.iter().find(|parameter| {
            !parameter.has_default()
                && !schema
                    .fields
                    .iter()
                    .any(|field| matches_any(&parameter.name, field.names()))
        });
        match unmatched {
            Some(parameter) => {
                first_unmatched.get_or_insert(parameter.name.as_str());
            }
            None => {
                let count = constructor.parameters.len();
                if best.map_or(true, |(_, best_count)| count > best_count) {
                    best = Some((index, count));
                }
            }
        }
    }

    match best {
        Some((index, _)) => Ok(index),
        None => Err(BuildError::UnsupportedType(format!(
            "{} has no usable constructor: member '{}' has no default and field '{}' is absent from record {}",
            record.fullname(),
            first_unmatched.unwrap_or_default(),
            first_unmatched.unwrap_or_default(),
            schema.fullname()
        ))),
    }
}
