//! Tests for the type resolver and for deriving schemas from types.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use uuid::Uuid;

use jetwire::reflect::{EnumResolution, Reflect, TypeInfo, UnionInfo};
use jetwire::schema::*;
use jetwire::{
    build_schema, reflect_enum, reflect_record, resolve_type, AvroDuration, BuildError, Decimal,
    PrimitiveKind, TypeDescription, TypeRef, TypeResolver,
};

#[derive(Debug, Clone, PartialEq)]
struct Person {
    name: String,
    age: i32,
    email: Option<String>,
}

reflect_record!(Person as "com.example.Person" {
    name: String,
    age: i32,
    email: Option<String>,
});

#[derive(Debug, Clone, Copy, PartialEq)]
enum Color {
    Red,
    Green,
    Blue = 10,
}

reflect_enum!(Color as "com.example.Color" { Red, Green, Blue });

#[derive(Debug, Clone, Copy, PartialEq)]
enum Wide {
    Small,
    Huge = 1 << 40,
}

reflect_enum!(Wide { Small, Huge });

#[derive(Debug, Clone, PartialEq)]
struct Node {
    value: i32,
    next: Option<Box<Node>>,
}

reflect_record!(Node as "graph.Node" {
    value: i32,
    next: Option<Box<Node>>,
});

#[derive(Debug, Clone, PartialEq)]
struct Circle {
    radius: f64,
}

reflect_record!(Circle as "shapes.Circle" { radius: f64 });

#[derive(Debug, Clone, PartialEq)]
struct Square {
    side: f64,
}

reflect_record!(Square as "shapes.Square" { side: f64 });

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Circle(Circle),
    Square(Square),
}

impl Reflect for Shape {
    fn type_info() -> TypeInfo {
        UnionInfo::builder::<Shape>()
            .variant::<Circle>(
                "Circle",
                |shape| match shape {
                    Shape::Circle(circle) => Some(circle),
                    _ => None,
                },
                Shape::Circle,
            )
            .variant::<Square>(
                "Square",
                |shape| match shape {
                    Shape::Square(square) => Some(square),
                    _ => None,
                },
                Shape::Square,
            )
            .build()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Interval {
    first: TimeDelta,
    second: AvroDuration,
}

reflect_record!(Interval as "Interval" {
    first: TimeDelta,
    second: AvroDuration,
});

fn record_fields(schema: &AvroSchema) -> &[FieldSchema] {
    match schema {
        AvroSchema::Record(record) => &record.fields,
        other => panic!("expected a record, got {}", other),
    }
}

// ============================================================================
// Type Resolver Tests
// ============================================================================

#[test]
fn test_resolve_primitives() {
    let kind = |description: TypeDescription| description.primitive();
    assert_eq!(
        kind(resolve_type::<i32>().unwrap()),
        Some(PrimitiveKind::Integer {
            bits: 32,
            signed: true
        })
    );
    assert_eq!(
        kind(resolve_type::<u64>().unwrap()),
        Some(PrimitiveKind::Integer {
            bits: 64,
            signed: false
        })
    );
    assert_eq!(kind(resolve_type::<String>().unwrap()), Some(PrimitiveKind::Text));
    assert_eq!(
        kind(resolve_type::<Vec<u8>>().unwrap()),
        Some(PrimitiveKind::Bytes { shared: false })
    );
    assert_eq!(
        kind(resolve_type::<bytes::Bytes>().unwrap()),
        Some(PrimitiveKind::Bytes { shared: true })
    );
    assert_eq!(kind(resolve_type::<Uuid>().unwrap()), Some(PrimitiveKind::Uuid));
    assert_eq!(kind(resolve_type::<Decimal>().unwrap()), Some(PrimitiveKind::Decimal));
}

#[test]
fn test_resolve_containers() {
    assert!(matches!(
        resolve_type::<Option<i64>>().unwrap(),
        TypeDescription::Optional(option) if option.inner == TypeRef::of::<i64>()
    ));
    assert!(matches!(
        resolve_type::<Box<Node>>().unwrap(),
        TypeDescription::Boxed(_)
    ));
    assert!(matches!(
        resolve_type::<Vec<String>>().unwrap(),
        TypeDescription::Array(sequence) if sequence.item == TypeRef::of::<String>()
    ));
    assert!(matches!(
        resolve_type::<HashMap<String, f64>>().unwrap(),
        TypeDescription::Map(map) if map.value == TypeRef::of::<f64>()
    ));
}

#[test]
fn test_resolve_record_members_and_constructor() {
    let TypeDescription::Record(record) = resolve_type::<Person>().unwrap() else {
        panic!("Person should resolve to a record");
    };
    assert_eq!(record.name, "Person");
    assert_eq!(record.namespace.as_deref(), Some("com.example"));
    let members: Vec<&str> = record.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(members, vec!["name", "age", "email"]);
    assert_eq!(record.constructors.len(), 1);
    assert_eq!(record.constructors[0].parameters.len(), 3);
}

#[test]
fn test_resolve_enum_symbolic_and_integral() {
    let TypeDescription::Enum(symbolic) = resolve_type::<Color>().unwrap() else {
        panic!("Color should resolve to an enum");
    };
    assert!(!symbolic.integral);
    let values: Vec<i64> = symbolic.info.symbols.iter().map(|s| s.value).collect();
    assert_eq!(values, vec![0, 1, 10]);

    let resolver = TypeResolver::with_enum_resolution(EnumResolution::Integral);
    let TypeDescription::Enum(integral) = resolver.resolve_type::<Color>().unwrap() else {
        panic!("Color should resolve to an enum");
    };
    assert!(integral.integral);
}

#[test]
fn test_resolve_union_like() {
    let TypeDescription::UnionLike(union) = resolve_type::<Shape>().unwrap() else {
        panic!("Shape should resolve to a union");
    };
    let names: Vec<&str> = union.variants.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["Circle", "Square"]);
}

// ============================================================================
// Schema Builder Tests
// ============================================================================

#[test]
fn test_build_primitive_schemas() {
    let config = SchemaBuilderConfig::default();
    assert_eq!(build_schema::<bool>(&config).unwrap(), AvroSchema::Boolean);
    assert_eq!(build_schema::<i16>(&config).unwrap(), AvroSchema::Int);
    assert_eq!(build_schema::<u16>(&config).unwrap(), AvroSchema::Int);
    assert_eq!(build_schema::<i32>(&config).unwrap(), AvroSchema::Int);
    assert_eq!(build_schema::<u32>(&config).unwrap(), AvroSchema::Long);
    assert_eq!(build_schema::<i64>(&config).unwrap(), AvroSchema::Long);
    assert_eq!(build_schema::<f32>(&config).unwrap(), AvroSchema::Float);
    assert_eq!(build_schema::<f64>(&config).unwrap(), AvroSchema::Double);
    assert_eq!(build_schema::<String>(&config).unwrap(), AvroSchema::String);
    assert_eq!(build_schema::<Vec<u8>>(&config).unwrap(), AvroSchema::Bytes);
    assert_eq!(build_schema::<()>(&config).unwrap(), AvroSchema::Null);
}

#[test]
fn test_build_logical_schemas() {
    let config = SchemaBuilderConfig::default();
    assert_eq!(
        build_schema::<Uuid>(&config).unwrap(),
        AvroSchema::logical(AvroSchema::String, LogicalTypeName::Uuid)
    );
    assert_eq!(
        build_schema::<Decimal>(&config).unwrap(),
        AvroSchema::logical(
            AvroSchema::Bytes,
            LogicalTypeName::Decimal {
                precision: DEFAULT_DECIMAL_PRECISION,
                scale: DEFAULT_DECIMAL_SCALE,
            }
        )
    );
    assert_eq!(
        build_schema::<AvroDuration>(&config).unwrap(),
        AvroSchema::logical(
            AvroSchema::Fixed(FixedSchema::new("Duration", 12)),
            LogicalTypeName::Duration
        )
    );
}

#[test]
fn test_build_temporal_schemas_per_behavior() {
    let iso = SchemaBuilderConfig::default();
    assert_eq!(build_schema::<DateTime<Utc>>(&iso).unwrap(), AvroSchema::String);
    assert_eq!(build_schema::<NaiveDate>(&iso).unwrap(), AvroSchema::String);

    let millis = SchemaBuilderConfig::new().with_temporal(TemporalBehavior::EpochMilliseconds);
    assert_eq!(
        build_schema::<DateTime<Utc>>(&millis).unwrap(),
        AvroSchema::logical(AvroSchema::Long, LogicalTypeName::TimestampMillis)
    );
    assert_eq!(
        build_schema::<NaiveTime>(&millis).unwrap(),
        AvroSchema::logical(AvroSchema::Int, LogicalTypeName::TimeMillis)
    );
    assert_eq!(
        build_schema::<NaiveDate>(&millis).unwrap(),
        AvroSchema::logical(AvroSchema::Int, LogicalTypeName::Date)
    );

    let micros = SchemaBuilderConfig::new().with_temporal(TemporalBehavior::EpochMicroseconds);
    assert_eq!(
        build_schema::<NaiveDateTime>(&micros).unwrap(),
        AvroSchema::logical(AvroSchema::Long, LogicalTypeName::LocalTimestampMicros)
    );
    assert_eq!(
        build_schema::<NaiveTime>(&micros).unwrap(),
        AvroSchema::logical(AvroSchema::Long, LogicalTypeName::TimeMicros)
    );

    let nanos = SchemaBuilderConfig::new().with_temporal(TemporalBehavior::EpochNanoseconds);
    assert_eq!(
        build_schema::<DateTime<Utc>>(&nanos).unwrap(),
        AvroSchema::logical(AvroSchema::Long, LogicalTypeName::TimestampNanos)
    );
}

#[test]
fn test_build_record_schema() {
    let schema = build_schema::<Person>(&SchemaBuilderConfig::default()).unwrap();
    assert_eq!(schema.fullname(), Some("com.example.Person".to_string()));
    let fields = record_fields(&schema);
    assert_eq!(fields[0].name, "name");
    assert_eq!(fields[0].schema, AvroSchema::String);
    assert_eq!(fields[1].schema, AvroSchema::Int);
    assert_eq!(fields[2].schema, AvroSchema::nullable(AvroSchema::String));
}

#[test]
fn test_build_enum_schema_per_behavior() {
    let symbolic = build_schema::<Color>(&SchemaBuilderConfig::default()).unwrap();
    let AvroSchema::Enum(schema) = &symbolic else {
        panic!("expected an enum schema, got {}", symbolic);
    };
    assert_eq!(schema.fullname(), "com.example.Color");
    assert_eq!(schema.symbols, vec!["Red", "Green", "Blue"]);

    let integral = SchemaBuilderConfig::new().with_enums(EnumBehavior::Integral);
    assert_eq!(build_schema::<Color>(&integral).unwrap(), AvroSchema::Int);
    assert_eq!(build_schema::<Wide>(&integral).unwrap(), AvroSchema::Long);

    let nominal = SchemaBuilderConfig::new().with_enums(EnumBehavior::Nominal);
    assert_eq!(build_schema::<Color>(&nominal).unwrap(), AvroSchema::String);
}

#[test]
fn test_build_collection_schemas() {
    let config = SchemaBuilderConfig::default();
    assert_eq!(
        build_schema::<Vec<i64>>(&config).unwrap(),
        AvroSchema::array(AvroSchema::Long)
    );
    assert_eq!(
        build_schema::<HashMap<String, Vec<String>>>(&config).unwrap(),
        AvroSchema::map(AvroSchema::array(AvroSchema::String))
    );
    assert_eq!(
        build_schema::<Option<f64>>(&config).unwrap(),
        AvroSchema::nullable(AvroSchema::Double)
    );
}

#[test]
fn test_build_recursive_record_uses_named_reference() {
    let schema = build_schema::<Node>(&SchemaBuilderConfig::default()).unwrap();
    let fields = record_fields(&schema);
    assert_eq!(
        fields[1].schema,
        AvroSchema::nullable(AvroSchema::Named("graph.Node".to_string()))
    );
    let analysis = RecursionAnalysis::analyze(&schema).unwrap();
    assert!(analysis.is_recursive(&schema));
}

#[test]
fn test_build_union_like_schema() {
    let schema = build_schema::<Shape>(&SchemaBuilderConfig::default()).unwrap();
    let AvroSchema::Union(branches) = &schema else {
        panic!("expected a union, got {}", schema);
    };
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[0].fullname(), Some("shapes.Circle".to_string()));
    assert_eq!(branches[1].fullname(), Some("shapes.Square".to_string()));

    let optional = build_schema::<Option<Shape>>(&SchemaBuilderConfig::default()).unwrap();
    let AvroSchema::Union(branches) = &optional else {
        panic!("expected a union, got {}", optional);
    };
    assert_eq!(branches.len(), 3);
    assert_eq!(branches[0], AvroSchema::Null);
}

#[test]
fn test_duration_fixed_is_defined_once() {
    let schema = build_schema::<Interval>(&SchemaBuilderConfig::default()).unwrap();
    let fields = record_fields(&schema);
    assert_eq!(fields[0].schema.logical_type(), Some(LogicalTypeName::Duration));
    assert_eq!(fields[1].schema, AvroSchema::Named("Duration".to_string()));
    assert!(NamedSchemas::collect(&schema).is_ok());
}

#[test]
fn test_conflicting_names_fail() {
    #[derive(Debug, Clone, PartialEq)]
    struct Other {
        x: i32,
    }
    reflect_record!(Other as "com.example.Person" { x: i32 });

    #[derive(Debug, Clone, PartialEq)]
    struct Both {
        a: Person,
        b: Other,
    }
    reflect_record!(Both { a: Person, b: Other });

    let err = build_schema::<Both>(&SchemaBuilderConfig::default()).unwrap_err();
    assert!(matches!(err, BuildError::UnsupportedType(_)));
}
