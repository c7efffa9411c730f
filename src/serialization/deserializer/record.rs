//! Deserializer case for records.
//!
//! The constructor is chosen once per build. Every wire field then has one
//! step: it feeds a constructor parameter, is assigned to a settable member
//! after construction, or is skipped. Parameters no field feeds take their
//! declared defaults.

use std::any::Any;

use tracing::trace;

use crate::error::{BuildError, DecodeError};
use crate::reflect::{matches_any, select_constructor, ParameterInfo, TypeDescription, TypeRef};
use crate::schema::AvroSchema;
use crate::serialization::deserializer::skip::build_skip;
use crate::serialization::{decoder, incompatible, BuildContext, BuilderCase, Decoder};

enum FieldStep {
    Argument(usize, Decoder),
    Member(usize, Decoder),
    Discard(Decoder),
}

pub struct RecordCase;

impl BuilderCase<Decoder> for RecordCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        let AvroSchema::Record(record_schema) = schema.physical() else {
            return Ok(None);
        };
        let TypeDescription::Record(record) = description else {
            return Err(incompatible(schema, ty, description));
        };

        let constructor = record.constructors[select_constructor(record, record_schema)?].clone();
        let mut filled = vec![false; constructor.parameters.len()];
        let mut steps = Vec::with_capacity(record_schema.fields.len());

        for field in &record_schema.fields {
            let parameter = constructor
                .parameters
                .iter()
                .enumerate()
                .find(|(index, parameter)| {
                    !filled[*index] && matches_any(&parameter.name, field.names())
                })
                .map(|(index, _)| index);
            if let Some(index) = parameter {
                filled[index] = true;
                let routine = context.build(&field.schema, &constructor.parameters[index].ty)?;
                steps.push(FieldStep::Argument(index, routine));
                continue;
            }

            let member = record.members.iter().position(|member| {
                member.is_settable() && matches_any(&member.name, field.names())
            });
            match member {
                Some(index) => {
                    let routine = context.build(&field.schema, &record.members[index].ty)?;
                    steps.push(FieldStep::Member(index, routine));
                }
                None => {
                    trace!(
                        field = %field.name,
                        record = %record_schema.fullname(),
                        "Field has no target and will be skipped"
                    );
                    steps.push(FieldStep::Discard(build_skip(&field.schema, context)?));
                }
            }
        }

        let mut defaults: Vec<(usize, ParameterInfo)> = Vec::new();
        for (index, parameter) in constructor.parameters.iter().enumerate() {
            if filled[index] {
                continue;
            }
            if !parameter.has_default() {
                return Err(BuildError::UnsupportedType(format!(
                    "parameter '{}' of {} has no default and no field of {} supplies it",
                    parameter.name,
                    record.fullname(),
                    record_schema.fullname()
                )));
            }
            defaults.push((index, parameter.clone()));
        }

        let members = record.members.clone();
        let type_name = ty.name();
        Ok(Some(decoder(move |data| {
            let mut arguments: Vec<Option<Box<dyn Any>>> =
                (0..constructor.parameters.len()).map(|_| None).collect();
            let mut assignments = Vec::new();
            for step in &steps {
                match step {
                    FieldStep::Argument(index, routine) => arguments[*index] = Some(routine(data)?),
                    FieldStep::Member(index, routine) => assignments.push((*index, routine(data)?)),
                    FieldStep::Discard(routine) => {
                        routine(data)?;
                    }
                }
            }
            for (index, parameter) in &defaults {
                arguments[*index] = parameter.default_value();
            }
            let arguments = arguments
                .into_iter()
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| {
                    DecodeError::TypeMismatch(format!("missing constructor argument for {}", type_name))
                })?;

            let mut value = constructor.invoke(arguments)?;
            for (index, assigned) in assignments {
                members[index].set(&mut *value, assigned)?;
            }
            Ok(value)
        })))
    }
}
