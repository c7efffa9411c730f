//! Record field defaults as pre-encoded wire bytes.
//!
//! A default is written in the JSON form of its schema. It is converted once,
//! at build time, so a serializer writing a defaulted field only copies bytes.

use bytes::BytesMut;
use serde_json::Value;

use crate::binary::{
    encode_boolean, encode_bytes, encode_double, encode_fixed, encode_float, encode_long,
    encode_string, encode_zigzag,
};
use crate::error::SchemaError;
use crate::schema::{AvroSchema, NamedSchemas};

/// Encode the JSON default `json` as a value of `schema`.
///
/// Union defaults are values of the first branch. `bytes` and `fixed`
/// defaults are strings whose code points (0-255) are the byte values.
/// Logical types take the default of their physical schema.
pub fn encode_default(
    json: &Value,
    schema: &AvroSchema,
    named: &NamedSchemas<'_>,
    buf: &mut BytesMut,
) -> Result<(), SchemaError> {
    let schema = match schema {
        AvroSchema::Named(name) => named.resolve_name(name)?,
        other => other,
    };

    match (json, schema.physical()) {
        (Value::Null, AvroSchema::Null) => Ok(()),

        (Value::Bool(b), AvroSchema::Boolean) => {
            encode_boolean(buf, *b);
            Ok(())
        }

        (Value::Number(n), AvroSchema::Int) => {
            let v = n
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| invalid(json, schema))?;
            encode_zigzag(buf, i64::from(v));
            Ok(())
        }
        (Value::Number(n), AvroSchema::Long) => {
            let v = n.as_i64().ok_or_else(|| invalid(json, schema))?;
            encode_long(buf, v);
            Ok(())
        }

        (Value::Number(n), AvroSchema::Float) => {
            let v = n.as_f64().ok_or_else(|| invalid(json, schema))?;
            encode_float(buf, v as f32);
            Ok(())
        }
        (Value::Number(n), AvroSchema::Double) => {
            let v = n.as_f64().ok_or_else(|| invalid(json, schema))?;
            encode_double(buf, v);
            Ok(())
        }

        (Value::String(s), AvroSchema::String) => {
            encode_string(buf, s);
            Ok(())
        }

        (Value::String(s), AvroSchema::Bytes) => {
            encode_bytes(buf, &code_points(s).ok_or_else(|| invalid(json, schema))?);
            Ok(())
        }

        (Value::String(s), AvroSchema::Fixed(fixed)) => {
            let bytes = code_points(s).ok_or_else(|| invalid(json, schema))?;
            encode_fixed(buf, &bytes, fixed.size).map_err(|_| invalid(json, schema))
        }

        (Value::String(s), AvroSchema::Enum(enum_schema)) => {
            let index = enum_schema
                .symbol_index(s)
                .ok_or_else(|| invalid(json, schema))?;
            encode_long(buf, index as i64);
            Ok(())
        }

        (Value::Array(items), AvroSchema::Array(item_schema)) => {
            if !items.is_empty() {
                encode_long(buf, items.len() as i64);
                for item in items {
                    encode_default(item, item_schema, named, buf)?;
                }
            }
            encode_long(buf, 0);
            Ok(())
        }

        (Value::Object(entries), AvroSchema::Map(value_schema)) => {
            if !entries.is_empty() {
                encode_long(buf, entries.len() as i64);
                for (key, value) in entries {
                    encode_string(buf, key);
                    encode_default(value, value_schema, named, buf)?;
                }
            }
            encode_long(buf, 0);
            Ok(())
        }

        (Value::Object(entries), AvroSchema::Record(record)) => {
            for field in &record.fields {
                let value = field
                    .names()
                    .find_map(|name| entries.get(name))
                    .or(field.default.as_ref())
                    .ok_or_else(|| {
                        SchemaError::InvalidSchema(format!(
                            "Default for record '{}' has no value for field '{}'",
                            record.fullname(),
                            field.name
                        ))
                    })?;
                encode_default(value, &field.schema, named, buf)?;
            }
            Ok(())
        }

        (_, AvroSchema::Union(branches)) => {
            let first = branches.first().ok_or_else(|| invalid(json, schema))?;
            encode_long(buf, 0);
            encode_default(json, first, named, buf)
        }

        _ => Err(invalid(json, schema)),
    }
}

/// Bytes of a string whose characters are all in `U+0000..=U+00FF`.
fn code_points(s: &str) -> Option<Vec<u8>> {
    s.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect()
}

fn invalid(json: &Value, schema: &AvroSchema) -> SchemaError {
    SchemaError::InvalidSchema(format!("Default {} is not a valid {}", json, schema))
}
