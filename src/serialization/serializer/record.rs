//! Serializer case for records.
//!
//! Fields are written in the order the schema declares them. Each field takes
//! its value from the first member whose name matches the field name or one of
//! its aliases; a field without a member is written from its default, which is
//! encoded once here. A field with neither fails the build.

use bytes::BytesMut;

use crate::error::BuildError;
use crate::reflect::{matches_any, MemberInfo, TypeDescription, TypeRef};
use crate::schema::AvroSchema;
use crate::serialization::defaults::encode_default;
use crate::serialization::{encoder, incompatible, BuildContext, BuilderCase, Encoder};

enum FieldSource {
    Member(MemberInfo, Encoder),
    Default(Vec<u8>),
}

pub struct RecordCase;

impl BuilderCase<Encoder> for RecordCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
        let AvroSchema::Record(record_schema) = schema.physical() else {
            return Ok(None);
        };
        let TypeDescription::Record(record) = description else {
            return Err(incompatible(schema, ty, description));
        };

        let mut sources = Vec::with_capacity(record_schema.fields.len());
        for field in &record_schema.fields {
            let member = record
                .members
                .iter()
                .find(|member| matches_any(&member.name, field.names()));
            let source = match (member, &field.default) {
                (Some(member), _) => {
                    let routine = context.build(&field.schema, &member.ty)?;
                    FieldSource::Member(member.clone(), routine)
                }
                (None, Some(default)) => {
                    let mut buf = BytesMut::new();
                    encode_default(default, &field.schema, context.named(), &mut buf).map_err(
                        |err| {
                            BuildError::UnsupportedType(format!(
                                "{} has no member for field '{}' of {} and its default cannot be used: {}",
                                record.fullname(),
                                field.name,
                                record_schema.fullname(),
                                err
                            ))
                        },
                    )?;
                    FieldSource::Default(buf.to_vec())
                }
                (None, None) => {
                    return Err(BuildError::UnsupportedType(format!(
                        "{} has no member for field '{}' of {} and the field has no default",
                        record.fullname(),
                        field.name,
                        record_schema.fullname()
                    )))
                }
            };
            sources.push(source);
        }

        Ok(Some(encoder(move |value, buf| {
            for source in &sources {
                match source {
                    FieldSource::Member(member, routine) => routine(member.get(value)?, buf)?,
                    FieldSource::Default(bytes) => buf.extend_from_slice(bytes),
                }
            }
            Ok(())
        })))
    }
}
