//! Tests for building serializers and deserializers.
//!
//! Covers round trips, schema evolution, unions, enums, collections,
//! recursive schemas and the failure modes of building and running routines.

use std::collections::{BTreeMap, HashMap};

use serde_json::json;

use jetwire::binary::{decode_string, encode_string};
use jetwire::reflect::{
    downcast, EnumDescription, RecordInfo, Reflect, TypeInfo, TypeResolverCase, UnionInfo,
};
use jetwire::schema::*;
use jetwire::serialization::{decoder, encoder, BuildContext, BuilderCase, Decoder, Encoder};
use jetwire::{
    build_deserializer, build_schema, build_serializer, reflect_enum, reflect_record,
    BinaryDeserializerBuilder, BinarySerializerBuilder, BuildError, DecodeError, EncodeError,
    TypeDescription, TypeRef, TypeResolver,
};

// ============================================================================
// Test Types
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Person {
    name: String,
    age: i32,
}

reflect_record!(Person as "com.example.Person" { name: String, age: i32 });

#[derive(Debug, Clone, PartialEq)]
struct PersonWithScore {
    name: String,
    age: i32,
    score: f64,
}

reflect_record!(PersonWithScore as "com.example.Person" {
    name: String,
    age: i32,
    score: f64 = 3.14,
});

#[derive(Debug, Clone, PartialEq)]
struct PersonWithRank {
    name: String,
    age: i32,
    rank: i32,
}

reflect_record!(PersonWithRank as "com.example.Person" { name: String, age: i32, rank: i32 });

#[derive(Debug, Clone, Default, PartialEq)]
struct Settings {
    level: i32,
    label: String,
}

impl Reflect for Settings {
    fn type_info() -> TypeInfo {
        RecordInfo::builder::<Settings>()
            .name("cfg.Settings")
            .field::<i32>("level", |s| &s.level, |s, v| s.level = v)
            .field::<String>("label", |s| &s.label, |s, v| s.label = v)
            .default_constructor()
            .build()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    value: i32,
    next: Option<Box<Node>>,
}

reflect_record!(Node as "graph.Node" { value: i32, next: Option<Box<Node>> });

#[derive(Debug, Clone, Copy, PartialEq)]
enum Color {
    Red,
    Green,
    Blue = 10,
}

reflect_enum!(Color as "com.example.Color" { Red, Green, Blue });

#[derive(Debug, Clone, PartialEq)]
struct Circle {
    radius: f64,
}

reflect_record!(Circle as "shapes.Circle" { radius: f64 });

#[derive(Debug, Clone, PartialEq)]
struct Round {
    radius: f64,
}

reflect_record!(Round as "other.Round" { radius: f64 });

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

fn record_schema(name: &str, fields: Vec<FieldSchema>) -> AvroSchema {
    AvroSchema::Record(RecordSchema::new(name, fields).with_namespace("com.example"))
}

fn person_schema() -> AvroSchema {
    record_schema(
        "Person",
        vec![
            FieldSchema::new("name", AvroSchema::String),
            FieldSchema::new("age", AvroSchema::Int),
        ],
    )
}

fn color_schema(symbols: &[&str]) -> EnumSchema {
    EnumSchema::new("Color", symbols.iter().map(|s| s.to_string()).collect())
        .with_namespace("com.example")
}

const ALICE_BYTES: [u8; 7] = [0x0a, b'A', b'l', b'i', b'c', b'e', 0x32];

fn alice() -> Person {
    Person {
        name: "Alice".to_string(),
        age: 25,
    }
}

// ============================================================================
// Record Round Trips
// ============================================================================

#[test]
fn test_record_round_trip() {
    let schema = person_schema();
    let serializer = build_serializer::<Person>(&schema).unwrap();
    let deserializer = build_deserializer::<Person>(&schema).unwrap();

    let bytes = serializer.serialize_to_vec(&alice()).unwrap();
    assert_eq!(bytes, ALICE_BYTES);
    assert_eq!(deserializer.deserialize_slice(&bytes).unwrap(), alice());
}

#[test]
fn test_record_from_derived_schema() {
    let schema = build_schema::<Person>(&SchemaBuilderConfig::default()).unwrap();
    let serializer = build_serializer::<Person>(&schema).unwrap();
    assert_eq!(serializer.serialize_to_vec(&alice()).unwrap(), ALICE_BYTES);
}

#[test]
fn test_fields_match_by_normalized_name_and_alias() {
    let schema = record_schema(
        "Person",
        vec![
            FieldSchema::new("full_name", AvroSchema::String).with_aliases(["name"]),
            FieldSchema::new("AGE", AvroSchema::Int),
        ],
    );
    let serializer = build_serializer::<Person>(&schema).unwrap();
    let deserializer = build_deserializer::<Person>(&schema).unwrap();
    let bytes = serializer.serialize_to_vec(&alice()).unwrap();
    assert_eq!(bytes, ALICE_BYTES);
    assert_eq!(deserializer.deserialize_slice(&bytes).unwrap(), alice());
}

#[test]
fn test_settable_members_are_assigned_in_wire_order() {
    let schema = AvroSchema::Record(
        RecordSchema::new(
            "Settings",
            vec![
                FieldSchema::new("label", AvroSchema::String),
                FieldSchema::new("level", AvroSchema::Int),
            ],
        )
        .with_namespace("cfg"),
    );
    let deserializer = build_deserializer::<Settings>(&schema).unwrap();
    let value = deserializer
        .deserialize_slice(&[0x04, b'o', b'n', 0x0e])
        .unwrap();
    assert_eq!(
        value,
        Settings {
            level: 7,
            label: "on".to_string()
        }
    );
}

// ============================================================================
// Schema Evolution
// ============================================================================

#[test]
fn test_missing_wire_field_uses_parameter_default() {
    let deserializer = build_deserializer::<PersonWithScore>(&person_schema()).unwrap();
    let value = deserializer.deserialize_slice(&ALICE_BYTES).unwrap();
    assert_eq!(
        value,
        PersonWithScore {
            name: "Alice".to_string(),
            age: 25,
            score: 3.14,
        }
    );
}

#[test]
fn test_missing_wire_field_without_default_fails_to_build() {
    let err = build_deserializer::<PersonWithRank>(&person_schema()).unwrap_err();
    assert!(matches!(err, BuildError::UnsupportedType(_)), "{:?}", err);
}

#[test]
fn test_extra_wire_field_is_skipped() {
    let writer = record_schema(
        "Person",
        vec![
            FieldSchema::new("name", AvroSchema::String),
            FieldSchema::new("tags", AvroSchema::array(AvroSchema::String)),
            FieldSchema::new("age", AvroSchema::Int),
        ],
    );
    let deserializer = build_deserializer::<Person>(&writer).unwrap();
    // name "Al", tags ["x"], age 3
    let bytes = [0x04, b'A', b'l', 0x02, 0x02, b'x', 0x00, 0x06];
    assert_eq!(
        deserializer.deserialize_slice(&bytes).unwrap(),
        Person {
            name: "Al".to_string(),
            age: 3
        }
    );
}

#[test]
fn test_schema_default_is_written_for_missing_member() {
    let schema = record_schema(
        "Person",
        vec![
            FieldSchema::new("name", AvroSchema::String),
            FieldSchema::new("age", AvroSchema::Int),
            FieldSchema::new("score", AvroSchema::Double).with_default(json!(3.14)),
        ],
    );
    let serializer = build_serializer::<Person>(&schema).unwrap();
    let mut expected = ALICE_BYTES.to_vec();
    expected.extend_from_slice(&3.14f64.to_le_bytes());
    assert_eq!(serializer.serialize_to_vec(&alice()).unwrap(), expected);

    let deserializer = build_deserializer::<PersonWithScore>(&schema).unwrap();
    assert_eq!(deserializer.deserialize_slice(&expected).unwrap().score, 3.14);
}

#[test]
fn test_missing_member_without_default_fails_to_build() {
    let schema = record_schema(
        "Person",
        vec![
            FieldSchema::new("name", AvroSchema::String),
            FieldSchema::new("rank", AvroSchema::Int),
        ],
    );
    let err = build_serializer::<Person>(&schema).unwrap_err();
    assert!(matches!(err, BuildError::UnsupportedType(_)), "{:?}", err);
}

// ============================================================================
// Recursive Schemas
// ============================================================================

fn chain(length: i32) -> Option<Box<Node>> {
    (1..=length).rev().fold(None, |next, value| {
        Some(Box::new(Node { value, next }))
    })
}

#[test]
fn test_recursive_chain_round_trip() {
    let schema = build_schema::<Node>(&SchemaBuilderConfig::default()).unwrap();
    let serializer = build_serializer::<Node>(&schema).unwrap();
    let deserializer = build_deserializer::<Node>(&schema).unwrap();

    let head = *chain(5).unwrap();
    let bytes = serializer.serialize_to_vec(&head).unwrap();
    assert_eq!(bytes.len(), 10);
    assert_eq!(&bytes[..4], &[0x02, 0x02, 0x04, 0x02]);
    assert_eq!(&bytes[8..], &[0x0a, 0x00]);
    assert_eq!(deserializer.deserialize_slice(&bytes).unwrap(), head);
}

#[test]
fn test_recursive_routines_survive_clones() {
    let schema = build_schema::<Node>(&SchemaBuilderConfig::default()).unwrap();
    let serializer = build_serializer::<Node>(&schema).unwrap().clone();
    let deserializer = build_deserializer::<Node>(&schema).unwrap().clone();
    let head = *chain(3).unwrap();
    let bytes = serializer.serialize_to_vec(&head).unwrap();
    assert_eq!(deserializer.deserialize_slice(&bytes).unwrap(), head);
}

// ============================================================================
// Unions
// ============================================================================

#[test]
fn test_optional_null_first() {
    let schema = AvroSchema::nullable(AvroSchema::Int);
    let serializer = build_serializer::<Option<i32>>(&schema).unwrap();
    let deserializer = build_deserializer::<Option<i32>>(&schema).unwrap();

    assert_eq!(serializer.serialize_to_vec(&None).unwrap(), vec![0x00]);
    assert_eq!(serializer.serialize_to_vec(&Some(5)).unwrap(), vec![0x02, 0x0a]);
    assert_eq!(deserializer.deserialize_slice(&[0x00]).unwrap(), None);
    assert_eq!(deserializer.deserialize_slice(&[0x02, 0x0a]).unwrap(), Some(5));
}

#[test]
fn test_optional_null_second() {
    let schema = AvroSchema::Union(vec![AvroSchema::Int, AvroSchema::Null]);
    let serializer = build_serializer::<Option<i32>>(&schema).unwrap();
    assert_eq!(serializer.serialize_to_vec(&Some(5)).unwrap(), vec![0x00, 0x0a]);
    assert_eq!(serializer.serialize_to_vec(&None).unwrap(), vec![0x02]);
}

#[test]
fn test_union_index_out_of_range_is_malformed() {
    let schema = AvroSchema::nullable(AvroSchema::Int);
    let deserializer = build_deserializer::<Option<i32>>(&schema).unwrap();
    let err = deserializer.deserialize_slice(&[0x04]).unwrap_err();
    assert!(err.is_malformed());
    assert!(matches!(err, DecodeError::InvalidData(_)));
}

#[test]
fn test_plain_value_into_union() {
    let schema = AvroSchema::nullable(AvroSchema::Long);
    let serializer = build_serializer::<i64>(&schema).unwrap();
    assert_eq!(serializer.serialize_to_vec(&42).unwrap(), vec![0x02, 0x54]);

    let either = AvroSchema::Union(vec![AvroSchema::Int, AvroSchema::Long]);
    let deserializer = build_deserializer::<i64>(&either).unwrap();
    assert_eq!(deserializer.deserialize_slice(&[0x00, 0x0a]).unwrap(), 5);
    assert_eq!(deserializer.deserialize_slice(&[0x02, 0x0a]).unwrap(), 5);
}

#[test]
fn test_ambiguous_union_fails_to_build() {
    let schema = AvroSchema::Union(vec![AvroSchema::Int, AvroSchema::Long]);
    let err = build_serializer::<i32>(&schema).unwrap_err();
    assert!(matches!(err, BuildError::UnsupportedType(_)), "{:?}", err);
}

#[test]
fn test_union_without_matching_branch_fails_to_build() {
    let schema = AvroSchema::Union(vec![AvroSchema::Null, AvroSchema::Boolean]);
    let err = build_serializer::<String>(&schema).unwrap_err();
    assert!(matches!(err, BuildError::UnsupportedType(_)), "{:?}", err);
}

#[test]
fn test_union_like_type_selects_branch_per_variant() {
    let schema = build_schema::<Shape>(&SchemaBuilderConfig::default()).unwrap();
    let serializer = build_serializer::<Shape>(&schema).unwrap();
    let deserializer = build_deserializer::<Shape>(&schema).unwrap();

    let square = Shape::Square(Square { side: 2.0 });
    let bytes = serializer.serialize_to_vec(&square).unwrap();
    let mut expected = vec![0x02];
    expected.extend_from_slice(&2.0f64.to_le_bytes());
    assert_eq!(bytes, expected);
    assert_eq!(deserializer.deserialize_slice(&bytes).unwrap(), square);

    let circle = Shape::Circle(Circle { radius: 1.5 });
    let bytes = serializer.serialize_to_vec(&circle).unwrap();
    assert_eq!(bytes[0], 0x00);
    assert_eq!(deserializer.deserialize_slice(&bytes).unwrap(), circle);
}

#[test]
fn test_same_shaped_records_are_told_apart_by_name() {
    let circle_schema = AvroSchema::Record(
        RecordSchema::new("Circle", vec![FieldSchema::new("radius", AvroSchema::Double)])
            .with_namespace("shapes"),
    );
    let round_schema = AvroSchema::Record(
        RecordSchema::new("Round", vec![FieldSchema::new("radius", AvroSchema::Double)])
            .with_namespace("other"),
    );
    let schema = AvroSchema::Union(vec![circle_schema, round_schema]);

    let circle = build_serializer::<Circle>(&schema).unwrap();
    let round = build_serializer::<Round>(&schema).unwrap();
    assert_eq!(circle.serialize_to_vec(&Circle { radius: 1.0 }).unwrap()[0], 0x00);
    assert_eq!(round.serialize_to_vec(&Round { radius: 1.0 }).unwrap()[0], 0x02);
}

#[test]
fn test_optional_union_like_type_round_trips() {
    let schema = build_schema::<Option<Shape>>(&SchemaBuilderConfig::default()).unwrap();
    let AvroSchema::Union(branches) = &schema else {
        panic!("expected a union, got {}", schema);
    };
    assert_eq!(branches.len(), 3);
    assert_eq!(branches[0], AvroSchema::Null);

    let serializer = build_serializer::<Option<Shape>>(&schema).unwrap();
    let deserializer = build_deserializer::<Option<Shape>>(&schema).unwrap();

    let square = Some(Shape::Square(Square { side: 2.0 }));
    let bytes = serializer.serialize_to_vec(&square).unwrap();
    let mut expected = vec![0x04];
    expected.extend_from_slice(&2.0f64.to_le_bytes());
    assert_eq!(bytes, expected);
    assert_eq!(deserializer.deserialize_slice(&bytes).unwrap(), square);

    let circle = Some(Shape::Circle(Circle { radius: 0.5 }));
    let bytes = serializer.serialize_to_vec(&circle).unwrap();
    assert_eq!(bytes[0], 0x02);
    assert_eq!(deserializer.deserialize_slice(&bytes).unwrap(), circle);

    assert_eq!(serializer.serialize_to_vec(&None).unwrap(), vec![0x00]);
    assert_eq!(deserializer.deserialize_slice(&[0x00]).unwrap(), None);
}

#[test]
fn test_optional_boxed_union_like_type_round_trips() {
    let schema = build_schema::<Option<Shape>>(&SchemaBuilderConfig::default()).unwrap();
    let serializer = build_serializer::<Option<Box<Shape>>>(&schema).unwrap();
    let deserializer = build_deserializer::<Option<Box<Shape>>>(&schema).unwrap();

    let square = Some(Box::new(Shape::Square(Square { side: 3.0 })));
    let bytes = serializer.serialize_to_vec(&square).unwrap();
    assert_eq!(bytes[0], 0x04);
    assert_eq!(deserializer.deserialize_slice(&bytes).unwrap(), square);
    assert_eq!(deserializer.deserialize_slice(&[0x00]).unwrap(), None);
}

// ============================================================================
// Enums
// ============================================================================

#[test]
fn test_enum_symbols_match_by_normalized_name() {
    let schema = AvroSchema::Enum(color_schema(&["RED", "GREEN", "BLUE"]));
    let serializer = build_serializer::<Color>(&schema).unwrap();
    let deserializer = build_deserializer::<Color>(&schema).unwrap();
    assert_eq!(serializer.serialize_to_vec(&Color::Blue).unwrap(), vec![0x04]);
    assert_eq!(deserializer.deserialize_slice(&[0x02]).unwrap(), Color::Green);
}

#[test]
fn test_enum_symbol_missing_from_schema_fails_when_written() {
    let schema = AvroSchema::Enum(color_schema(&["RED", "GREEN"]));
    let serializer = build_serializer::<Color>(&schema).unwrap();
    assert_eq!(serializer.serialize_to_vec(&Color::Red).unwrap(), vec![0x00]);
    assert!(matches!(
        serializer.serialize_to_vec(&Color::Blue),
        Err(EncodeError::InvalidValue(_))
    ));
}

#[test]
fn test_unknown_wire_symbol_falls_back_to_schema_default() {
    let with_default =
        AvroSchema::Enum(color_schema(&["RED", "GREEN", "BLUE", "PURPLE"]).with_default("RED"));
    let deserializer = build_deserializer::<Color>(&with_default).unwrap();
    assert_eq!(deserializer.deserialize_slice(&[0x06]).unwrap(), Color::Red);

    let without_default = AvroSchema::Enum(color_schema(&["RED", "GREEN", "BLUE", "PURPLE"]));
    let deserializer = build_deserializer::<Color>(&without_default).unwrap();
    assert!(matches!(
        deserializer.deserialize_slice(&[0x06]),
        Err(DecodeError::InvalidData(_))
    ));
}

#[test]
fn test_enum_as_integral_value() {
    let serializer = build_serializer::<Color>(&AvroSchema::Int).unwrap();
    let deserializer = build_deserializer::<Color>(&AvroSchema::Int).unwrap();
    assert_eq!(serializer.serialize_to_vec(&Color::Blue).unwrap(), vec![0x14]);
    assert_eq!(deserializer.deserialize_slice(&[0x14]).unwrap(), Color::Blue);
    assert!(matches!(
        deserializer.deserialize_slice(&[0x06]),
        Err(DecodeError::InvalidData(_))
    ));
}

#[test]
fn test_enum_as_symbol_text() {
    let serializer = build_serializer::<Color>(&AvroSchema::String).unwrap();
    let deserializer = build_deserializer::<Color>(&AvroSchema::String).unwrap();
    assert_eq!(
        serializer.serialize_to_vec(&Color::Green).unwrap(),
        vec![0x0a, b'G', b'r', b'e', b'e', b'n']
    );
    assert_eq!(
        deserializer
            .deserialize_slice(&[0x0a, b'g', b'r', b'e', b'e', b'n'])
            .unwrap(),
        Color::Green
    );
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_integer_boundaries() {
    let ints = build_serializer::<i32>(&AvroSchema::Int).unwrap();
    let read_ints = build_deserializer::<i32>(&AvroSchema::Int).unwrap();
    for value in [i32::MIN, -1, 0, 1, i32::MAX] {
        let bytes = ints.serialize_to_vec(&value).unwrap();
        assert!(bytes.len() <= 5);
        assert_eq!(read_ints.deserialize_slice(&bytes).unwrap(), value);
    }

    let longs = build_serializer::<i64>(&AvroSchema::Long).unwrap();
    let read_longs = build_deserializer::<i64>(&AvroSchema::Long).unwrap();
    for value in [i64::MIN, i64::MAX] {
        let bytes = longs.serialize_to_vec(&value).unwrap();
        assert_eq!(bytes.len(), 10);
        assert_eq!(read_longs.deserialize_slice(&bytes).unwrap(), value);
    }
}

#[test]
fn test_integer_overflow_on_write() {
    let serializer = build_serializer::<i64>(&AvroSchema::Int).unwrap();
    assert!(matches!(
        serializer.serialize_to_vec(&(1i64 << 40)),
        Err(EncodeError::Overflow(_))
    ));
    assert_eq!(serializer.serialize_to_vec(&-1).unwrap(), vec![0x01]);
}

#[test]
fn test_integer_overflow_on_read() {
    let bytes = build_serializer::<i64>(&AvroSchema::Long)
        .unwrap()
        .serialize_to_vec(&(1i64 << 40))
        .unwrap();
    let narrow = build_deserializer::<i32>(&AvroSchema::Long).unwrap();
    assert!(matches!(
        narrow.deserialize_slice(&bytes),
        Err(DecodeError::Overflow(_))
    ));

    let byte = build_deserializer::<u8>(&AvroSchema::Int).unwrap();
    // 300 zigzag-encoded
    assert!(matches!(
        byte.deserialize_slice(&[0xd8, 0x04]),
        Err(DecodeError::Overflow(_))
    ));
}

#[test]
fn test_float_widening_and_narrowing() {
    let serializer = build_serializer::<f32>(&AvroSchema::Double).unwrap();
    let bytes = serializer.serialize_to_vec(&1.5).unwrap();
    assert_eq!(bytes, 1.5f64.to_le_bytes());
    let deserializer = build_deserializer::<f32>(&AvroSchema::Double).unwrap();
    assert_eq!(deserializer.deserialize_slice(&bytes).unwrap(), 1.5);
}

// ============================================================================
// Collections and Bytes
// ============================================================================

#[test]
fn test_array_encoding() {
    let schema = AvroSchema::array(AvroSchema::String);
    let serializer = build_serializer::<Vec<String>>(&schema).unwrap();
    let values = vec!["a".to_string(), "b".to_string()];
    assert_eq!(
        serializer.serialize_to_vec(&values).unwrap(),
        vec![0x04, 0x02, b'a', 0x02, b'b', 0x00]
    );
    assert_eq!(serializer.serialize_to_vec(&Vec::new()).unwrap(), vec![0x00]);
}

#[test]
fn test_array_decoding_accepts_sized_blocks() {
    let schema = AvroSchema::array(AvroSchema::Int);
    let deserializer = build_deserializer::<Vec<i32>>(&schema).unwrap();
    // Block of -1 item with byte size 1, then a block of 1 item
    let bytes = [0x01, 0x02, 0x0a, 0x02, 0x0c, 0x00];
    assert_eq!(deserializer.deserialize_slice(&bytes).unwrap(), vec![5, 6]);
}

#[test]
fn test_map_round_trip() {
    let schema = AvroSchema::map(AvroSchema::Int);
    let serializer = build_serializer::<HashMap<String, i32>>(&schema).unwrap();
    let single = HashMap::from([("a".to_string(), 1)]);
    assert_eq!(
        serializer.serialize_to_vec(&single).unwrap(),
        vec![0x02, 0x02, b'a', 0x02, 0x00]
    );

    let sorted = BTreeMap::from([("x".to_string(), 1), ("y".to_string(), -2)]);
    let bytes = build_serializer::<BTreeMap<String, i32>>(&schema)
        .unwrap()
        .serialize_to_vec(&sorted)
        .unwrap();
    let deserializer = build_deserializer::<BTreeMap<String, i32>>(&schema).unwrap();
    assert_eq!(deserializer.deserialize_slice(&bytes).unwrap(), sorted);
}

#[test]
fn test_fixed_length_is_checked() {
    let schema = AvroSchema::Fixed(FixedSchema::new("Quad", 4));
    let serializer = build_serializer::<Vec<u8>>(&schema).unwrap();
    assert_eq!(serializer.serialize_to_vec(&vec![1, 2, 3, 4]).unwrap(), vec![1, 2, 3, 4]);
    assert!(matches!(
        serializer.serialize_to_vec(&vec![1, 2]),
        Err(EncodeError::InvalidValue(_))
    ));

    let deserializer = build_deserializer::<bytes::Bytes>(&schema).unwrap();
    assert_eq!(
        deserializer.deserialize_slice(&[9, 8, 7, 6]).unwrap(),
        bytes::Bytes::from_static(&[9, 8, 7, 6])
    );
}

#[test]
fn test_bytes_round_trip() {
    let serializer = build_serializer::<Vec<u8>>(&AvroSchema::Bytes).unwrap();
    let deserializer = build_deserializer::<Vec<u8>>(&AvroSchema::Bytes).unwrap();
    let bytes = serializer.serialize_to_vec(&vec![0xde, 0xad]).unwrap();
    assert_eq!(bytes, vec![0x04, 0xde, 0xad]);
    assert_eq!(deserializer.deserialize_slice(&bytes).unwrap(), vec![0xde, 0xad]);
}

/// A block claiming 2^62 items, then the terminator.
const HUGE_BLOCK: [u8; 11] = [0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x01, 0x00];

#[test]
fn test_block_count_beyond_input_is_malformed() {
    let ints = build_deserializer::<Vec<i32>>(&AvroSchema::array(AvroSchema::Int)).unwrap();
    let err = ints.deserialize_slice(&HUGE_BLOCK).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidData(_)), "{:?}", err);

    // A million items promised, three bytes present
    let err = ints.deserialize_slice(&[0x80, 0x89, 0x7a, 0x02, 0x04, 0x00]).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidData(_)), "{:?}", err);

    let maps = build_deserializer::<HashMap<String, i32>>(&AvroSchema::map(AvroSchema::Int)).unwrap();
    assert!(maps.deserialize_slice(&HUGE_BLOCK).unwrap_err().is_malformed());
}

#[test]
fn test_zero_width_items_are_capped() {
    let schema = AvroSchema::array(AvroSchema::Null);
    let deserializer = build_deserializer::<Vec<()>>(&schema).unwrap();
    let err = deserializer.deserialize_slice(&HUGE_BLOCK).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidData(_)), "{:?}", err);

    assert_eq!(deserializer.deserialize_slice(&[0x06, 0x00]).unwrap(), vec![(), (), ()]);
}

#[test]
fn test_skipped_field_with_huge_block_is_malformed() {
    let writer = record_schema(
        "Person",
        vec![
            FieldSchema::new("padding", AvroSchema::array(AvroSchema::Null)),
            FieldSchema::new("name", AvroSchema::String),
            FieldSchema::new("age", AvroSchema::Int),
        ],
    );
    let deserializer = build_deserializer::<Person>(&writer).unwrap();
    let mut bytes = HUGE_BLOCK.to_vec();
    bytes.extend_from_slice(&ALICE_BYTES);
    let err = deserializer.deserialize_slice(&bytes).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidData(_)), "{:?}", err);
}

// ============================================================================
// Central Adaptations
// ============================================================================

#[test]
fn test_optional_against_schema_without_null() {
    let serializer = build_serializer::<Option<i32>>(&AvroSchema::Int).unwrap();
    assert_eq!(serializer.serialize_to_vec(&Some(3)).unwrap(), vec![0x06]);
    assert!(matches!(
        serializer.serialize_to_vec(&None),
        Err(EncodeError::InvalidValue(_))
    ));

    let deserializer = build_deserializer::<Option<i32>>(&AvroSchema::Int).unwrap();
    assert_eq!(deserializer.deserialize_slice(&[0x06]).unwrap(), Some(3));
}

#[test]
fn test_boxed_values() {
    let serializer = build_serializer::<Box<i32>>(&AvroSchema::Int).unwrap();
    let deserializer = build_deserializer::<Box<i32>>(&AvroSchema::Int).unwrap();
    let bytes = serializer.serialize_to_vec(&Box::new(7)).unwrap();
    assert_eq!(bytes, vec![0x0e]);
    assert_eq!(deserializer.deserialize_slice(&bytes).unwrap(), Box::new(7));
}

#[test]
fn test_unit_and_null() {
    let serializer = build_serializer::<()>(&AvroSchema::Null).unwrap();
    assert!(serializer.serialize_to_vec(&()).unwrap().is_empty());
    let deserializer = build_deserializer::<()>(&AvroSchema::Null).unwrap();
    deserializer.deserialize_slice(&[]).unwrap();
}

// ============================================================================
// Custom Cases
// ============================================================================

/// Writes `i32` values as decimal text where the schema says `string`.
struct IntAsText;

impl BuilderCase<Encoder> for IntAsText {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        _description: &TypeDescription,
        _context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
        if !matches!(schema.physical(), AvroSchema::String) || !ty.is::<i32>() {
            return Ok(None);
        }
        Ok(Some(encoder(|value, buf| {
            encode_string(buf, &downcast::<i32>(value)?.to_string());
            Ok(())
        })))
    }
}

/// Reads decimal text into `i32`.
struct TextAsInt;

impl BuilderCase<Decoder> for TextAsInt {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        _description: &TypeDescription,
        _context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        if !matches!(schema.physical(), AvroSchema::String) || !ty.is::<i32>() {
            return Ok(None);
        }
        Ok(Some(decoder(|data| {
            let text = decode_string(data)?;
            let value: i32 = text
                .parse()
                .map_err(|_| DecodeError::InvalidData(format!("'{}' is not an int", text)))?;
            Ok(Box::new(value))
        })))
    }
}

/// Describes `Color` by its integral values.
struct IntegralColor;

impl TypeResolverCase for IntegralColor {
    fn resolve(&self, ty: &TypeRef, info: &TypeInfo) -> Result<Option<TypeDescription>, BuildError> {
        match info {
            TypeInfo::Enum(info) if ty.is::<Color>() => Ok(Some(TypeDescription::Enum(EnumDescription {
                info: info.clone(),
                integral: true,
            }))),
            _ => Ok(None),
        }
    }
}

/// Maps `i32` to `long`.
struct WideInts;

impl SchemaBuilderCase for WideInts {
    fn build(
        &self,
        ty: &TypeRef,
        _description: &TypeDescription,
        _context: &mut SchemaBuildContext<'_>,
    ) -> Result<Option<AvroSchema>, BuildError> {
        Ok(ty.is::<i32>().then_some(AvroSchema::Long))
    }
}

#[test]
fn test_prepended_serializer_case_wins() {
    assert!(build_serializer::<i32>(&AvroSchema::String).is_err());

    let builder = BinarySerializerBuilder::new().prepend_case(Box::new(IntAsText));
    let serializer = builder.build::<i32>(&AvroSchema::String).unwrap();
    assert_eq!(serializer.serialize_to_vec(&42).unwrap(), vec![0x04, b'4', b'2']);

    // Other schemas still go through the default chain
    let serializer = builder.build::<i32>(&AvroSchema::Int).unwrap();
    assert_eq!(serializer.serialize_to_vec(&42).unwrap(), vec![0x54]);

    // Nested members reach the custom case too
    let schema = record_schema(
        "Person",
        vec![
            FieldSchema::new("name", AvroSchema::String),
            FieldSchema::new("age", AvroSchema::String),
        ],
    );
    let bytes = builder.build::<Person>(&schema).unwrap().serialize_to_vec(&alice()).unwrap();
    assert_eq!(bytes, vec![0x0a, b'A', b'l', b'i', b'c', b'e', 0x04, b'2', b'5']);
}

#[test]
fn test_prepended_deserializer_case_wins() {
    let builder = BinaryDeserializerBuilder::new().prepend_case(Box::new(TextAsInt));
    let deserializer = builder.build::<i32>(&AvroSchema::String).unwrap();
    assert_eq!(deserializer.deserialize_slice(&[0x04, b'4', b'2']).unwrap(), 42);
    assert!(matches!(
        deserializer.deserialize_slice(&[0x02, b'x']),
        Err(DecodeError::InvalidData(_))
    ));
}

#[test]
fn test_replaced_chain_uses_only_given_cases() {
    let builder = BinarySerializerBuilder::new().with_cases(vec![Box::new(IntAsText)]);
    assert!(builder.build::<i32>(&AvroSchema::String).is_ok());
    assert!(matches!(
        builder.build::<i32>(&AvroSchema::Int),
        Err(BuildError::UnsupportedSchema(_))
    ));
}

#[test]
fn test_prepended_resolver_case_wins() {
    let schema = AvroSchema::Enum(color_schema(&["RED", "GREEN", "BLUE"]));
    assert!(build_serializer::<Color>(&schema).is_ok());

    let resolver = TypeResolver::new().prepend_case(Box::new(IntegralColor));
    let description = resolver.resolve(&TypeRef::of::<Color>()).unwrap();
    assert_eq!(description.kind(), "integral enum");

    let builder = BinarySerializerBuilder::new().with_resolver(resolver);
    assert!(matches!(
        builder.build::<Color>(&schema),
        Err(BuildError::UnsupportedType(_))
    ));
    let serializer = builder.build::<Color>(&AvroSchema::Int).unwrap();
    assert_eq!(serializer.serialize_to_vec(&Color::Blue).unwrap(), vec![0x14]);
}

#[test]
fn test_prepended_schema_builder_case_wins() {
    let schema = SchemaBuilder::new(SchemaBuilderConfig::default())
        .prepend_case(Box::new(WideInts))
        .build::<Person>()
        .unwrap();
    let AvroSchema::Record(record) = &schema else {
        panic!("expected a record, got {}", schema);
    };
    assert_eq!(record.field("age").map(|field| &field.schema), Some(&AvroSchema::Long));
    assert_eq!(record.field("name").map(|field| &field.schema), Some(&AvroSchema::String));

    let bytes = build_serializer::<Person>(&schema).unwrap().serialize_to_vec(&alice()).unwrap();
    assert_eq!(build_deserializer::<Person>(&schema).unwrap().deserialize_slice(&bytes).unwrap(), alice());
}

// ============================================================================
// Failure Modes
// ============================================================================

#[test]
fn test_incompatible_type_fails_to_build() {
    assert!(matches!(
        build_serializer::<String>(&AvroSchema::Int),
        Err(BuildError::UnsupportedType(_))
    ));
    assert!(matches!(
        build_deserializer::<Person>(&AvroSchema::Long),
        Err(BuildError::UnsupportedType(_))
    ));
}

#[test]
fn test_empty_chain_rejects_every_schema() {
    let builder = BinarySerializerBuilder::new().with_cases(Vec::new());
    assert!(matches!(
        builder.build::<i32>(&AvroSchema::Int),
        Err(BuildError::UnsupportedSchema(_))
    ));
}

#[test]
fn test_unresolved_reference_fails_to_build() {
    let schema = record_schema("Person", vec![FieldSchema::new("x", AvroSchema::Named("Nope".into()))]);
    assert!(matches!(
        BinaryDeserializerBuilder::new().build::<Person>(&schema),
        Err(BuildError::Schema(_))
    ));
}

#[test]
fn test_trailing_bytes_and_truncation() {
    let deserializer = build_deserializer::<i32>(&AvroSchema::Int).unwrap();
    assert!(matches!(
        deserializer.deserialize_slice(&[0x02, 0x00]),
        Err(DecodeError::InvalidData(_))
    ));

    let mut cursor: &[u8] = &[0x02, 0x04];
    assert_eq!(deserializer.deserialize(&mut cursor).unwrap(), 1);
    assert_eq!(deserializer.deserialize(&mut cursor).unwrap(), 2);
    assert!(cursor.is_empty());

    let strings = build_deserializer::<String>(&AvroSchema::String).unwrap();
    assert_eq!(
        strings.deserialize_slice(&[0x0a, b'a']),
        Err(DecodeError::UnexpectedEof)
    );
}

#[test]
fn test_routines_are_shared_across_threads() {
    let schema = person_schema();
    let serializer = build_serializer::<Person>(&schema).unwrap();
    let deserializer = build_deserializer::<Person>(&schema).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|age| {
            let serializer = serializer.clone();
            let deserializer = deserializer.clone();
            std::thread::spawn(move || {
                let person = Person {
                    name: format!("worker-{}", age),
                    age,
                };
                let bytes = serializer.serialize_to_vec(&person).unwrap();
                assert_eq!(deserializer.deserialize_slice(&bytes).unwrap(), person);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}
