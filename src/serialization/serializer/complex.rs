//! Serializer cases for arrays and maps.
//!
//! A non-empty collection is written as a single block (item count, then the
//! items) followed by the zero-count terminator.

use crate::binary::{encode_long, encode_string};
use crate::error::BuildError;
use crate::reflect::{TypeDescription, TypeRef};
use crate::schema::AvroSchema;
use crate::serialization::{encoder, incompatible, BuildContext, BuilderCase, Encoder};

pub struct ArrayCase;

impl BuilderCase<Encoder> for ArrayCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
        let AvroSchema::Array(items) = schema.physical() else {
            return Ok(None);
        };
        let TypeDescription::Array(sequence) = description else {
            return Err(incompatible(schema, ty, description));
        };
        let item = context.build(items, &sequence.item)?;
        let sequence = sequence.clone();
        Ok(Some(encoder(move |value, buf| {
            let items = sequence.items(value)?;
            if !items.is_empty() {
                encode_long(buf, items.len() as i64);
                for value in items {
                    item(value, buf)?;
                }
            }
            encode_long(buf, 0);
            Ok(())
        })))
    }
}

pub struct MapCase;

impl BuilderCase<Encoder> for MapCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
        let AvroSchema::Map(values) = schema.physical() else {
            return Ok(None);
        };
        let TypeDescription::Map(map) = description else {
            return Err(incompatible(schema, ty, description));
        };
        let value_routine = context.build(values, &map.value)?;
        let map = map.clone();
        Ok(Some(encoder(move |value, buf| {
            let entries = map.entries(value)?;
            if !entries.is_empty() {
                encode_long(buf, entries.len() as i64);
                for (key, value) in entries {
                    encode_string(buf, key);
                    value_routine(value, buf)?;
                }
            }
            encode_long(buf, 0);
            Ok(())
        })))
    }
}
