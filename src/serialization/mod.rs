//! Serializer and deserializer builders.
//!
//! A builder walks a (schema, type) pair once and composes closures that
//! encode or decode values of that type in the schema's binary form. Cases
//! are tried in order for every node: logical types first, then one case per
//! physical shape. The chain is public, so callers can prepend their own
//! cases or replace it entirely.

use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::error::BuildError;
use crate::reflect::{normalize_name, split_type_name, Reflect, TypeDescription, TypeRef, TypeResolver};
use crate::schema::AvroSchema;

/// Expand to `Some($build::<T>(args..))` for the integer type `T` of a
/// [`PrimitiveKind`](crate::reflect::PrimitiveKind), or `None` otherwise.
macro_rules! dispatch_integer {
    ($kind:expr, $build:ident $(, $arg:expr)*) => {
        match $kind {
            $crate::reflect::PrimitiveKind::Integer { bits: 8, signed: true } => Some($build::<i8>($($arg),*)),
            $crate::reflect::PrimitiveKind::Integer { bits: 16, signed: true } => Some($build::<i16>($($arg),*)),
            $crate::reflect::PrimitiveKind::Integer { bits: 32, signed: true } => Some($build::<i32>($($arg),*)),
            $crate::reflect::PrimitiveKind::Integer { bits: 64, signed: true } => Some($build::<i64>($($arg),*)),
            $crate::reflect::PrimitiveKind::Integer { bits: 8, signed: false } => Some($build::<u8>($($arg),*)),
            $crate::reflect::PrimitiveKind::Integer { bits: 16, signed: false } => Some($build::<u16>($($arg),*)),
            $crate::reflect::PrimitiveKind::Integer { bits: 32, signed: false } => Some($build::<u32>($($arg),*)),
            $crate::reflect::PrimitiveKind::Integer { bits: 64, signed: false } => Some($build::<u64>($($arg),*)),
            _ => None,
        }
    };
}

mod context;
pub mod defaults;
pub mod deserializer;
mod routine;
pub mod serializer;

pub use context::{BuildContext, BuilderCase};
pub use routine::{decoder, encoder, Decoder, Encoder, Deserializer, Routine, Serializer};

/// Builds [`Serializer`]s from a schema and a target type.
pub struct BinarySerializerBuilder {
    cases: Vec<Box<dyn BuilderCase<Encoder>>>,
    resolver: TypeResolver,
}

impl Default for BinarySerializerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BinarySerializerBuilder {
    /// Builder with the default chain and resolver.
    pub fn new() -> Self {
        Self {
            cases: Self::default_cases(),
            resolver: TypeResolver::new(),
        }
    }

    /// The default serializer chain.
    pub fn default_cases() -> Vec<Box<dyn BuilderCase<Encoder>>> {
        serializer::default_cases()
    }

    /// Replace the case chain.
    pub fn with_cases(mut self, cases: Vec<Box<dyn BuilderCase<Encoder>>>) -> Self {
        self.cases = cases;
        self
    }

    /// Put a case ahead of the existing chain.
    pub fn prepend_case(mut self, case: Box<dyn BuilderCase<Encoder>>) -> Self {
        self.cases.insert(0, case);
        self
    }

    /// Replace the type resolver.
    pub fn with_resolver(mut self, resolver: TypeResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Build a serializer writing `T` as `schema`.
    pub fn build<T: Reflect>(&self, schema: &AvroSchema) -> Result<Serializer<T>, BuildError> {
        let (encode, slots) = compile(schema, TypeRef::of::<T>(), &self.cases, &self.resolver)?;
        Ok(Serializer::new(encode, slots))
    }
}

/// Builds [`Deserializer`]s from a schema and a target type.
pub struct BinaryDeserializerBuilder {
    cases: Vec<Box<dyn BuilderCase<Decoder>>>,
    resolver: TypeResolver,
}

impl Default for BinaryDeserializerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryDeserializerBuilder {
    /// Builder with the default chain and resolver.
    pub fn new() -> Self {
        Self {
            cases: Self::default_cases(),
            resolver: TypeResolver::new(),
        }
    }

    /// The default deserializer chain.
    pub fn default_cases() -> Vec<Box<dyn BuilderCase<Decoder>>> {
        deserializer::default_cases()
    }

    /// Replace the case chain.
    pub fn with_cases(mut self, cases: Vec<Box<dyn BuilderCase<Decoder>>>) -> Self {
        self.cases = cases;
        self
    }

    /// Put a case ahead of the existing chain.
    pub fn prepend_case(mut self, case: Box<dyn BuilderCase<Decoder>>) -> Self {
        self.cases.insert(0, case);
        self
    }

    /// Replace the type resolver.
    pub fn with_resolver(mut self, resolver: TypeResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Build a deserializer reading `schema` into `T`.
    pub fn build<T: Reflect>(&self, schema: &AvroSchema) -> Result<Deserializer<T>, BuildError> {
        let (decode, slots) = compile(schema, TypeRef::of::<T>(), &self.cases, &self.resolver)?;
        Ok(Deserializer::new(decode, slots))
    }
}

type Compiled<R> = (R, Vec<Arc<OnceLock<R>>>);

fn compile<'a, R: Routine>(
    schema: &'a AvroSchema,
    ty: TypeRef,
    cases: &'a [Box<dyn BuilderCase<R>>],
    resolver: &'a TypeResolver,
) -> Result<Compiled<R>, BuildError> {
    debug!(schema = %schema, ty = ty.name(), "Building routine");
    let mut context = BuildContext::new(schema, cases, resolver)?;
    let routine = context.build(schema, &ty)?;
    let slots = context.into_slots();
    debug!(
        schema = %schema,
        ty = ty.name(),
        recursive_slots = slots.len(),
        "Built routine"
    );
    Ok((routine, slots))
}

// ============================================================================
// Shared helpers for cases
// ============================================================================

/// Name a type is known by when compared with named schemas.
pub(crate) fn target_name(ty: &TypeRef, description: &TypeDescription) -> String {
    match description {
        TypeDescription::Record(record) => record.name.clone(),
        TypeDescription::Enum(e) => e.info.name.clone(),
        _ => split_type_name(ty.name()).1,
    }
}

/// Short name of a schema node, if it is named.
pub(crate) fn schema_short_name(schema: &AvroSchema) -> Option<String> {
    schema
        .fullname()
        .map(|full| full.rsplit('.').next().unwrap_or_default().to_string())
}

/// Pick the only candidate, or break a tie by name.
///
/// Each candidate carries an optional name. With more than one candidate, the
/// single one whose name normalizes to `target` wins; otherwise the choice is
/// ambiguous. `describe` renders the failure for `n` candidates.
pub(crate) fn select_unique<T>(
    mut candidates: Vec<(Option<String>, T)>,
    target: Option<&str>,
    describe: impl FnOnce(usize) -> String,
) -> Result<T, BuildError> {
    if candidates.len() > 1 {
        if let Some(target) = target {
            let target = normalize_name(target);
            let named: Vec<usize> = candidates
                .iter()
                .enumerate()
                .filter(|(_, (name, _))| {
                    name.as_deref().map(normalize_name).as_deref() == Some(target.as_str())
                })
                .map(|(index, _)| index)
                .collect();
            if let [index] = named.as_slice() {
                debug!(name = %target, "Union branch selected by name");
                return Ok(candidates.swap_remove(*index).1);
            }
        }
        return Err(BuildError::UnsupportedType(describe(candidates.len())));
    }
    candidates
        .pop()
        .map(|(_, candidate)| candidate)
        .ok_or_else(|| BuildError::UnsupportedType(describe(0)))
}

/// Failure for a case whose shape matched but whose type does not fit.
pub(crate) fn incompatible(schema: &AvroSchema, ty: &TypeRef, description: &TypeDescription) -> BuildError {
    BuildError::UnsupportedType(format!(
        "{} ({}) is not compatible with schema {}",
        ty.name(),
        description.kind(),
        schema
    ))
}
