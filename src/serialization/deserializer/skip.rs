//! Routines that read past a value without materializing it.
//!
//! Used for writer fields the target type has no place for. Skips depend on
//! the schema alone, so they are memoized under a marker type and work for
//! recursive schemas like any other routine.

use std::any::TypeId;

use crate::binary::{
    check_block_count, decode_bytes_ref, decode_fixed_ref, decode_index, decode_long, skip_varint,
};
use crate::error::{BuildError, DecodeError};
use crate::schema::AvroSchema;
use crate::serialization::{decoder, BuildContext, Decoder};

/// Memo marker for skip routines.
struct Skip;

/// Build a routine that advances the cursor past one value of `schema`.
pub fn build_skip<'a>(
    schema: &'a AvroSchema,
    context: &mut BuildContext<'a, Decoder>,
) -> Result<Decoder, BuildError> {
    let schema = context.resolve_schema(schema)?;
    context.build_memoized(schema, TypeId::of::<Skip>(), |context| {
        let routine = match schema.physical() {
            AvroSchema::Null => decoder(|_data| Ok(Box::new(()))),
            AvroSchema::Boolean => decoder(|data| {
                advance(data, 1)?;
                Ok(Box::new(()))
            }),
            AvroSchema::Int | AvroSchema::Long | AvroSchema::Enum(_) => decoder(|data| {
                skip_varint(data)?;
                Ok(Box::new(()))
            }),
            AvroSchema::Float => decoder(|data| {
                advance(data, 4)?;
                Ok(Box::new(()))
            }),
            AvroSchema::Double => decoder(|data| {
                advance(data, 8)?;
                Ok(Box::new(()))
            }),
            AvroSchema::Bytes | AvroSchema::String => decoder(|data| {
                decode_bytes_ref(data)?;
                Ok(Box::new(()))
            }),
            AvroSchema::Fixed(fixed) => {
                let size = fixed.size;
                decoder(move |data| {
                    decode_fixed_ref(data, size)?;
                    Ok(Box::new(()))
                })
            }
            AvroSchema::Array(items) => {
                let item = build_skip(items, context)?;
                let zero_width = context.named().is_zero_width(items);
                decoder(move |data| {
                    skip_blocks(data, zero_width, |data| {
                        item(data)?;
                        Ok(())
                    })?;
                    Ok(Box::new(()))
                })
            }
            AvroSchema::Map(values) => {
                let value = build_skip(values, context)?;
                decoder(move |data| {
                    skip_blocks(data, false, |data| {
                        decode_bytes_ref(data)?;
                        value(data)?;
                        Ok(())
                    })?;
                    Ok(Box::new(()))
                })
            }
            AvroSchema::Union(branches) => {
                let branches = branches
                    .iter()
                    .map(|branch| build_skip(branch, context))
                    .collect::<Result<Vec<_>, _>>()?;
                decoder(move |data| {
                    let index = decode_index(data, branches.len(), "union")?;
                    branches[index](data)
                })
            }
            AvroSchema::Record(record) => {
                let fields = record
                    .fields
                    .iter()
                    .map(|field| build_skip(&field.schema, context))
                    .collect::<Result<Vec<_>, _>>()?;
                decoder(move |data| {
                    for field in &fields {
                        field(data)?;
                    }
                    Ok(Box::new(()))
                })
            }
            AvroSchema::Named(_) | AvroSchema::Logical(_) => {
                return Err(BuildError::UnsupportedSchema(format!(
                    "cannot skip unresolved schema {}",
                    schema
                )))
            }
        };
        Ok(routine)
    })
}

fn advance(data: &mut &[u8], len: usize) -> Result<(), DecodeError> {
    if data.len() < len {
        return Err(DecodeError::UnexpectedEof);
    }
    *data = &data[len..];
    Ok(())
}

/// Walk array or map blocks. A block with a byte size is jumped over whole.
fn skip_blocks<F>(data: &mut &[u8], zero_width: bool, mut item: F) -> Result<(), DecodeError>
where
    F: FnMut(&mut &[u8]) -> Result<(), DecodeError>,
{
    let mut skipped = 0usize;
    loop {
        let count = decode_long(data)?;
        if count == 0 {
            return Ok(());
        }
        if count < 0 {
            let size = decode_long(data)?;
            let size = usize::try_from(size)
                .map_err(|_| DecodeError::InvalidData(format!("negative block size {}", size)))?;
            advance(data, size)?;
            continue;
        }
        let count = usize::try_from(count)
            .map_err(|_| DecodeError::InvalidData(format!("Block count {} too large", count)))?;
        check_block_count(count, data.len(), skipped, zero_width)?;
        for _ in 0..count {
            item(data)?;
        }
        skipped += count;
    }
}
