//! Schema-driven Avro binary serialization
//!
//! This library builds a serializer or deserializer once per (schema, type)
//! pair and reuses it for every value. Building walks the schema and the
//! type's description together, handling schema evolution, unions, logical
//! types and recursive schemas; the resulting routines never look at the
//! schema again.
//!
//! Types take part by implementing [`Reflect`], usually through the
//! [`reflect_record!`] and [`reflect_enum!`] macros:
//!
//! ```
//! use jetwire::{build_deserializer, build_serializer, reflect_record};
//! use jetwire::{AvroSchema, FieldSchema, RecordSchema};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: i32,
//! }
//!
//! reflect_record!(Person { name: String, age: i32 });
//!
//! let schema = AvroSchema::Record(RecordSchema::new(
//!     "Person",
//!     vec![
//!         FieldSchema::new("name", AvroSchema::String),
//!         FieldSchema::new("age", AvroSchema::Int),
//!     ],
//! ));
//!
//! let serializer = build_serializer::<Person>(&schema).unwrap();
//! let deserializer = build_deserializer::<Person>(&schema).unwrap();
//!
//! let alice = Person { name: "Alice".into(), age: 25 };
//! let bytes = serializer.serialize_to_vec(&alice).unwrap();
//! assert_eq!(deserializer.deserialize_slice(&bytes).unwrap(), alice);
//! ```

pub mod binary;
pub mod error;
pub mod logical;
pub mod reflect;
pub mod schema;
pub mod serialization;

// Re-export main types
pub use error::{BuildError, DecodeError, EncodeError, SchemaError, TypeMismatch};
pub use logical::{AvroDuration, Decimal};
pub use reflect::{
    EnumResolution, PrimitiveKind, Reflect, TypeDescription, TypeInfo, TypeRef, TypeResolver,
};
pub use schema::{
    AvroSchema, EnumBehavior, EnumSchema, FieldSchema, FixedSchema, LogicalType, LogicalTypeName,
    NamedSchemas, RecordSchema, RecursionAnalysis, SchemaBuilder, SchemaBuilderConfig,
    TemporalBehavior,
};
pub use serialization::{
    BinaryDeserializerBuilder, BinarySerializerBuilder, Deserializer, Serializer,
};

/// Describe `T` with the default resolver.
pub fn resolve_type<T: Reflect>() -> Result<TypeDescription, BuildError> {
    TypeResolver::new().resolve_type::<T>()
}

/// Derive a schema for `T`.
pub fn build_schema<T: Reflect>(config: &SchemaBuilderConfig) -> Result<AvroSchema, BuildError> {
    SchemaBuilder::new(*config).build::<T>()
}

/// Build a serializer writing `T` as `schema` with the default chain.
pub fn build_serializer<T: Reflect>(schema: &AvroSchema) -> Result<Serializer<T>, BuildError> {
    BinarySerializerBuilder::new().build::<T>(schema)
}

/// Build a deserializer reading `schema` into `T` with the default chain.
pub fn build_deserializer<T: Reflect>(schema: &AvroSchema) -> Result<Deserializer<T>, BuildError> {
    BinaryDeserializerBuilder::new().build::<T>(schema)
}
