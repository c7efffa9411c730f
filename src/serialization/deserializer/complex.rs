//! Deserializer cases for arrays and maps.
//!
//! Items are read block by block until the zero-count terminator. Blocks
//! with a negative count carry a byte size, which is skipped. A block count
//! is checked against the remaining input before any item is read.

use crate::binary::{check_block_count, decode_block_count, decode_string};
use crate::error::BuildError;
use crate::reflect::{TypeDescription, TypeRef};
use crate::schema::AvroSchema;
use crate::serialization::{decoder, incompatible, BuildContext, BuilderCase, Decoder};

pub struct ArrayCase;

impl BuilderCase<Decoder> for ArrayCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        let AvroSchema::Array(items) = schema.physical() else {
            return Ok(None);
        };
        let TypeDescription::Array(sequence) = description else {
            return Err(incompatible(schema, ty, description));
        };
        let item = context.build(items, &sequence.item)?;
        let zero_width = context.named().is_zero_width(items);
        let sequence = sequence.clone();
        Ok(Some(decoder(move |data| {
            let mut values = Vec::new();
            loop {
                let count = decode_block_count(data)?;
                if count == 0 {
                    break;
                }
                check_block_count(count, data.len(), values.len(), zero_width)?;
                // Grow as items arrive rather than trusting the count up front
                for _ in 0..count {
                    values.push(item(data)?);
                }
            }
            Ok(sequence.collect(values)?)
        })))
    }
}

pub struct MapCase;

impl BuilderCase<Decoder> for MapCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        let AvroSchema::Map(values) = schema.physical() else {
            return Ok(None);
        };
        let TypeDescription::Map(map) = description else {
            return Err(incompatible(schema, ty, description));
        };
        let value_routine = context.build(values, &map.value)?;
        let map = map.clone();
        Ok(Some(decoder(move |data| {
            let mut entries = Vec::new();
            loop {
                let count = decode_block_count(data)?;
                if count == 0 {
                    break;
                }
                // Every entry starts with a key length
                check_block_count(count, data.len(), entries.len(), false)?;
                for _ in 0..count {
                    let key = decode_string(data)?;
                    entries.push((key, value_routine(data)?));
                }
            }
            Ok(map.collect(entries)?)
        })))
    }
}
