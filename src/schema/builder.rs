//! Schema building: from a reflected type to an [`AvroSchema`].
//!
//! Mirrors the type resolver: an ordered chain of [`SchemaBuilderCase`]s maps
//! each [`TypeDescription`] to a schema node. Named types are cached by type
//! identity; a record registers its name before its fields are built, so a
//! field that refers back to an enclosing record becomes a `Named` reference
//! instead of an endless expansion.

use std::any::TypeId;
use std::collections::HashMap;

use tracing::debug;

use crate::error::BuildError;
use crate::logical::DURATION_SIZE;
use crate::reflect::{
    EnumResolution, PrimitiveKind, Reflect, TypeDescription, TypeRef, TypeResolver,
};
use crate::schema::{
    AvroSchema, EnumSchema, FieldSchema, FixedSchema, LogicalTypeName, RecordSchema,
};

/// Default precision of decimal schemas built for [`Decimal`](crate::logical::Decimal).
pub const DEFAULT_DECIMAL_PRECISION: u32 = 29;
/// Default scale of decimal schemas built for [`Decimal`](crate::logical::Decimal).
pub const DEFAULT_DECIMAL_SCALE: u32 = 14;

/// How dates, times and timestamps are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemporalBehavior {
    /// ISO 8601 text in a `string`.
    #[default]
    Iso8601,
    /// Epoch-based counts with millisecond precision.
    EpochMilliseconds,
    /// Epoch-based counts with microsecond precision.
    EpochMicroseconds,
    /// Epoch-based counts with nanosecond precision.
    EpochNanoseconds,
}

/// How fieldless enums are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumBehavior {
    /// An `enum` schema with the type's symbols.
    #[default]
    Symbolic,
    /// The underlying integral value as an `int`.
    Integral,
    /// The symbol name as a `string`.
    Nominal,
}

/// Configuration for [`SchemaBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchemaBuilderConfig {
    pub temporal: TemporalBehavior,
    pub enums: EnumBehavior,
}

impl SchemaBuilderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the temporal representation.
    pub fn with_temporal(mut self, temporal: TemporalBehavior) -> Self {
        self.temporal = temporal;
        self
    }

    /// Set the enum representation.
    pub fn with_enums(mut self, enums: EnumBehavior) -> Self {
        self.enums = enums;
        self
    }
}

/// One rule of the schema building chain.
pub trait SchemaBuilderCase: Send + Sync {
    /// Build a schema for `ty`, or return `Ok(None)` to let the next case try.
    fn build(
        &self,
        ty: &TypeRef,
        description: &TypeDescription,
        context: &mut SchemaBuildContext<'_>,
    ) -> Result<Option<AvroSchema>, BuildError>;
}

/// State shared by one schema build.
pub struct SchemaBuildContext<'b> {
    builder: &'b SchemaBuilder,
    /// Full names already assigned, by type.
    names: HashMap<TypeId, String>,
    /// Type owning each assigned full name.
    owners: HashMap<String, TypeId>,
}

impl<'b> SchemaBuildContext<'b> {
    /// The configuration of this build.
    pub fn config(&self) -> &SchemaBuilderConfig {
        &self.builder.config
    }

    /// Build the schema of a nested type.
    pub fn build(&mut self, ty: &TypeRef) -> Result<AvroSchema, BuildError> {
        if let Some(name) = self.names.get(&ty.id()) {
            return Ok(AvroSchema::Named(name.clone()));
        }
        let builder = self.builder;
        let description = builder.resolver.resolve(ty)?;
        for case in &builder.cases {
            if let Some(schema) = case.build(ty, &description, self)? {
                return Ok(schema);
            }
        }
        Err(BuildError::UnsupportedType(format!(
            "no schema case handles {} ({})",
            ty.name(),
            description.kind()
        )))
    }

    /// Claim a full name for `ty`.
    ///
    /// Returns `Some(Named)` when `ty` already owns a definition. Fails when a
    /// different type already owns the name.
    pub fn define(&mut self, ty: &TypeRef, fullname: &str) -> Result<Option<AvroSchema>, BuildError> {
        self.define_id(ty.id(), ty.name(), fullname)
    }

    fn define_id(
        &mut self,
        id: TypeId,
        type_name: &str,
        fullname: &str,
    ) -> Result<Option<AvroSchema>, BuildError> {
        match self.owners.get(fullname) {
            Some(owner) if *owner == id => Ok(Some(AvroSchema::Named(fullname.to_string()))),
            Some(_) => Err(BuildError::UnsupportedType(format!(
                "{} maps to name '{}', which another type already uses",
                type_name, fullname
            ))),
            None => {
                self.owners.insert(fullname.to_string(), id);
                self.names.insert(id, fullname.to_string());
                Ok(None)
            }
        }
    }
}

/// Maps types to schemas.
pub struct SchemaBuilder {
    config: SchemaBuilderConfig,
    resolver: TypeResolver,
    cases: Vec<Box<dyn SchemaBuilderCase>>,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new(SchemaBuilderConfig::default())
    }
}

impl SchemaBuilder {
    /// Builder with the default chain.
    pub fn new(config: SchemaBuilderConfig) -> Self {
        Self {
            config,
            resolver: TypeResolver::with_enum_resolution(match config.enums {
                EnumBehavior::Integral => EnumResolution::Integral,
                _ => EnumResolution::Symbolic,
            }),
            cases: Self::default_cases(),
        }
    }

    /// The default chain: optional, boxed, primitive, enum, array, map, record, union.
    pub fn default_cases() -> Vec<Box<dyn SchemaBuilderCase>> {
        vec![
            Box::new(OptionalSchemaCase),
            Box::new(BoxedSchemaCase),
            Box::new(PrimitiveSchemaCase),
            Box::new(EnumSchemaCase),
            Box::new(ArraySchemaCase),
            Box::new(MapSchemaCase),
            Box::new(RecordSchemaCase),
            Box::new(UnionSchemaCase),
        ]
    }

    /// Replace the type resolver.
    pub fn with_resolver(mut self, resolver: TypeResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the case chain.
    pub fn with_cases(mut self, cases: Vec<Box<dyn SchemaBuilderCase>>) -> Self {
        self.cases = cases;
        self
    }

    /// Put a case ahead of the existing chain.
    pub fn prepend_case(mut self, case: Box<dyn SchemaBuilderCase>) -> Self {
        self.cases.insert(0, case);
        self
    }

    pub fn config(&self) -> &SchemaBuilderConfig {
        &self.config
    }

    /// Build the schema of `T`.
    pub fn build<T: Reflect>(&self) -> Result<AvroSchema, BuildError> {
        self.build_type(&TypeRef::of::<T>())
    }

    /// Build the schema of a referenced type.
    pub fn build_type(&self, ty: &TypeRef) -> Result<AvroSchema, BuildError> {
        debug!(ty = ty.name(), config = ?self.config, "Building schema");
        let mut context = SchemaBuildContext {
            builder: self,
            names: HashMap::new(),
            owners: HashMap::new(),
        };
        let schema = context.build(ty)?;
        debug!(ty = ty.name(), schema = %schema, "Built schema");
        Ok(schema)
    }
}

// ============================================================================
// Default cases
// ============================================================================

/// `Option<T>` becomes `["null", T]`.
pub struct OptionalSchemaCase;

impl SchemaBuilderCase for OptionalSchemaCase {
    fn build(
        &self,
        _ty: &TypeRef,
        description: &TypeDescription,
        context: &mut SchemaBuildContext<'_>,
    ) -> Result<Option<AvroSchema>, BuildError> {
        let TypeDescription::Optional(option) = description else {
            return Ok(None);
        };
        let inner = context.build(&option.inner)?;
        Ok(Some(match inner {
            AvroSchema::Null => AvroSchema::Null,
            AvroSchema::Union(mut variants) => {
                if !variants.contains(&AvroSchema::Null) {
                    variants.insert(0, AvroSchema::Null);
                }
                AvroSchema::Union(variants)
            }
            other => AvroSchema::nullable(other),
        }))
    }
}

/// `Box<T>` has the schema of `T`.
pub struct BoxedSchemaCase;

impl SchemaBuilderCase for BoxedSchemaCase {
    fn build(
        &self,
        _ty: &TypeRef,
        description: &TypeDescription,
        context: &mut SchemaBuildContext<'_>,
    ) -> Result<Option<AvroSchema>, BuildError> {
        match description {
            TypeDescription::Boxed(boxed) => context.build(&boxed.inner).map(Some),
            _ => Ok(None),
        }
    }
}

/// Leaf types, including temporal and other logical types.
pub struct PrimitiveSchemaCase;

impl PrimitiveSchemaCase {
    fn temporal(
        temporal: TemporalBehavior,
        base: AvroSchema,
        millis: LogicalTypeName,
        micros: LogicalTypeName,
        nanos: LogicalTypeName,
    ) -> AvroSchema {
        match temporal {
            TemporalBehavior::Iso8601 => AvroSchema::String,
            TemporalBehavior::EpochMilliseconds => AvroSchema::logical(base, millis),
            TemporalBehavior::EpochMicroseconds => AvroSchema::logical(base, micros),
            TemporalBehavior::EpochNanoseconds => AvroSchema::logical(base, nanos),
        }
    }
}

impl SchemaBuilderCase for PrimitiveSchemaCase {
    fn build(
        &self,
        _ty: &TypeRef,
        description: &TypeDescription,
        context: &mut SchemaBuildContext<'_>,
    ) -> Result<Option<AvroSchema>, BuildError> {
        let Some(kind) = description.primitive() else {
            return Ok(None);
        };
        let temporal = context.config().temporal;
        let schema = match kind {
            PrimitiveKind::Unit => AvroSchema::Null,
            PrimitiveKind::Boolean => AvroSchema::Boolean,
            PrimitiveKind::Integer { bits, signed } => {
                if bits < 32 || (bits == 32 && signed) {
                    AvroSchema::Int
                } else {
                    AvroSchema::Long
                }
            }
            PrimitiveKind::Float { bits: 32 } => AvroSchema::Float,
            PrimitiveKind::Float { .. } => AvroSchema::Double,
            PrimitiveKind::Text => AvroSchema::String,
            PrimitiveKind::Bytes { .. } => AvroSchema::Bytes,
            PrimitiveKind::Uuid => AvroSchema::logical(AvroSchema::String, LogicalTypeName::Uuid),
            PrimitiveKind::Decimal => AvroSchema::logical(
                AvroSchema::Bytes,
                LogicalTypeName::Decimal {
                    precision: DEFAULT_DECIMAL_PRECISION,
                    scale: DEFAULT_DECIMAL_SCALE,
                },
            ),
            PrimitiveKind::Timestamp => Self::temporal(
                temporal,
                AvroSchema::Long,
                LogicalTypeName::TimestampMillis,
                LogicalTypeName::TimestampMicros,
                LogicalTypeName::TimestampNanos,
            ),
            PrimitiveKind::LocalTimestamp => Self::temporal(
                temporal,
                AvroSchema::Long,
                LogicalTypeName::LocalTimestampMillis,
                LogicalTypeName::LocalTimestampMicros,
                LogicalTypeName::LocalTimestampNanos,
            ),
            PrimitiveKind::Date => match temporal {
                TemporalBehavior::Iso8601 => AvroSchema::String,
                _ => AvroSchema::logical(AvroSchema::Int, LogicalTypeName::Date),
            },
            PrimitiveKind::Time => match temporal {
                TemporalBehavior::Iso8601 => AvroSchema::String,
                TemporalBehavior::EpochMilliseconds => {
                    AvroSchema::logical(AvroSchema::Int, LogicalTypeName::TimeMillis)
                }
                _ => AvroSchema::logical(AvroSchema::Long, LogicalTypeName::TimeMicros),
            },
            PrimitiveKind::TimeSpan | PrimitiveKind::Duration => {
                // One fixed definition per build; later uses refer to it by name
                let name = "Duration";
                match context.define_id(TypeId::of::<DurationName>(), "duration", name)? {
                    Some(reference) => reference,
                    None => AvroSchema::logical(
                        AvroSchema::Fixed(FixedSchema::new(name, DURATION_SIZE)),
                        LogicalTypeName::Duration,
                    ),
                }
            }
        };
        Ok(Some(schema))
    }
}

/// Owner of the shared `Duration` fixed name.
struct DurationName;

/// Fieldless enums as `enum`, `int` or `string`.
pub struct EnumSchemaCase;

impl SchemaBuilderCase for EnumSchemaCase {
    fn build(
        &self,
        ty: &TypeRef,
        description: &TypeDescription,
        context: &mut SchemaBuildContext<'_>,
    ) -> Result<Option<AvroSchema>, BuildError> {
        let TypeDescription::Enum(enum_description) = description else {
            return Ok(None);
        };
        let info = &enum_description.info;
        let schema = match context.config().enums {
            EnumBehavior::Integral => {
                let fits_int = info
                    .symbols
                    .iter()
                    .all(|s| i32::try_from(s.value).is_ok());
                if fits_int {
                    AvroSchema::Int
                } else {
                    AvroSchema::Long
                }
            }
            EnumBehavior::Nominal => AvroSchema::String,
            EnumBehavior::Symbolic => {
                let fullname = info.fullname();
                if let Some(reference) = context.define(ty, &fullname)? {
                    return Ok(Some(reference));
                }
                let mut schema = EnumSchema::new(
                    info.name.clone(),
                    info.symbols.iter().map(|s| s.name.clone()).collect(),
                );
                schema.namespace = info.namespace.clone();
                AvroSchema::Enum(schema)
            }
        };
        Ok(Some(schema))
    }
}

pub struct ArraySchemaCase;

impl SchemaBuilderCase for ArraySchemaCase {
    fn build(
        &self,
        _ty: &TypeRef,
        description: &TypeDescription,
        context: &mut SchemaBuildContext<'_>,
    ) -> Result<Option<AvroSchema>, BuildError> {
        match description {
            TypeDescription::Array(sequence) => {
                Ok(Some(AvroSchema::array(context.build(&sequence.item)?)))
            }
            _ => Ok(None),
        }
    }
}

pub struct MapSchemaCase;

impl SchemaBuilderCase for MapSchemaCase {
    fn build(
        &self,
        _ty: &TypeRef,
        description: &TypeDescription,
        context: &mut SchemaBuildContext<'_>,
    ) -> Result<Option<AvroSchema>, BuildError> {
        match description {
            TypeDescription::Map(map) => Ok(Some(AvroSchema::map(context.build(&map.value)?))),
            _ => Ok(None),
        }
    }
}

/// Records become `record` schemas with one field per member.
pub struct RecordSchemaCase;

impl SchemaBuilderCase for RecordSchemaCase {
    fn build(
        &self,
        ty: &TypeRef,
        description: &TypeDescription,
        context: &mut SchemaBuildContext<'_>,
    ) -> Result<Option<AvroSchema>, BuildError> {
        let TypeDescription::Record(record) = description else {
            return Ok(None);
        };
        // Registered before the fields so self-references become `Named`
        if let Some(reference) = context.define(ty, &record.fullname())? {
            return Ok(Some(reference));
        }
        let mut fields = Vec::with_capacity(record.members.len());
        for member in &record.members {
            fields.push(FieldSchema::new(member.name.clone(), context.build(&member.ty)?));
        }
        let mut schema = RecordSchema::new(record.name.clone(), fields);
        schema.namespace = record.namespace.clone();
        Ok(Some(AvroSchema::Record(schema)))
    }
}

/// Tagged unions become a union of their variants' schemas.
pub struct UnionSchemaCase;

impl SchemaBuilderCase for UnionSchemaCase {
    fn build(
        &self,
        ty: &TypeRef,
        description: &TypeDescription,
        context: &mut SchemaBuildContext<'_>,
    ) -> Result<Option<AvroSchema>, BuildError> {
        let TypeDescription::UnionLike(union) = description else {
            return Ok(None);
        };
        let mut variants = Vec::with_capacity(union.variants.len());
        for variant in &union.variants {
            match context.build(&variant.ty)? {
                AvroSchema::Union(_) => {
                    return Err(BuildError::UnsupportedType(format!(
                        "variant '{}' of {} is itself a union",
                        variant.name,
                        ty.name()
                    )))
                }
                schema => variants.push(schema),
            }
        }
        Ok(Some(AvroSchema::Union(variants)))
    }
}
