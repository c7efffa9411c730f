//! Avro schema model.
//!
//! This module defines the schema object graph (primitives, complex types,
//! named types and logical annotations), the registry that follows named
//! references, the recursion analysis used by the codec builder, and the
//! schema builder that derives a schema from a reflected type.

mod builder;
mod recursion;
mod registry;
mod types;

pub use builder::{
    ArraySchemaCase, BoxedSchemaCase, EnumBehavior, EnumSchemaCase, MapSchemaCase,
    OptionalSchemaCase, PrimitiveSchemaCase, RecordSchemaCase, SchemaBuildContext, SchemaBuilder,
    SchemaBuilderCase, SchemaBuilderConfig, TemporalBehavior, UnionSchemaCase,
    DEFAULT_DECIMAL_PRECISION, DEFAULT_DECIMAL_SCALE,
};
pub use recursion::RecursionAnalysis;
pub use registry::{NamedSchemas, SchemaKey};
pub use types::*;
