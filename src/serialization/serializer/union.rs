//! Serializer case for unions.
//!
//! The branch is chosen at build time. A value is written as its zero-based
//! branch index followed by the branch encoding.

use crate::binary::encode_long;
use crate::error::{BuildError, EncodeError};
use crate::reflect::{TypeDescription, TypeRef};
use crate::schema::AvroSchema;
use crate::serialization::{
    encoder, schema_short_name, select_unique, target_name, BuildContext, BuilderCase, Encoder,
    Routine,
};

/// Branches still open to a value, with their index in the union.
type Candidates<'a> = [(usize, &'a AvroSchema)];

/// Find the single candidate branch that `ty` can be written as.
fn select_branch<'a>(
    schema: &'a AvroSchema,
    candidates: &Candidates<'a>,
    ty: &TypeRef,
    context: &mut BuildContext<'a, Encoder>,
) -> Result<(usize, Encoder), BuildError> {
    let description = context.resolver().resolve(ty)?;
    let mut matches = Vec::new();
    for &(index, branch) in candidates {
        if let Some(routine) = context.try_build(branch, ty)? {
            let resolved = context.resolve_schema(branch)?;
            matches.push((schema_short_name(resolved), (index, routine)));
        }
    }
    let name = target_name(ty, &description);
    select_unique(matches, Some(&name), |count| match count {
        0 => format!("{} matches no branch of {}", ty.name(), schema),
        n => format!("{} matches {} branches of {}", ty.name(), n, schema),
    })
}

/// Encoder writing a branch index and a value of `ty` to one of `candidates`.
///
/// A union-like type picks a branch per variant; a box is looked through.
fn build_indexed<'a>(
    schema: &'a AvroSchema,
    candidates: &Candidates<'a>,
    ty: &TypeRef,
    context: &mut BuildContext<'a, Encoder>,
) -> Result<Encoder, BuildError> {
    match context.resolver().resolve(ty)? {
        TypeDescription::Boxed(boxed) => {
            let inner = build_indexed(schema, candidates, &boxed.inner, context)?;
            Ok(Encoder::boxed(inner, boxed))
        }
        TypeDescription::UnionLike(union) => {
            let mut variants = Vec::with_capacity(union.variants.len());
            for variant in &union.variants {
                let selected = select_branch(schema, candidates, &variant.ty, context)?;
                variants.push((variant.clone(), selected));
            }
            let type_name = ty.name();
            Ok(encoder(move |value, buf| {
                for (variant, (index, routine)) in &variants {
                    if let Some(payload) = variant.extract(value)? {
                        encode_long(buf, *index as i64);
                        return routine(payload, buf);
                    }
                }
                Err(EncodeError::InvalidValue(format!(
                    "value of {} matches none of its variants",
                    type_name
                )))
            }))
        }
        _ => {
            let (index, inner) = select_branch(schema, candidates, ty, context)?;
            Ok(encoder(move |value, buf| {
                encode_long(buf, index as i64);
                inner(value, buf)
            }))
        }
    }
}

pub struct UnionCase;

impl BuilderCase<Encoder> for UnionCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        context: &mut BuildContext<'a, Encoder>,
    ) -> Result<Option<Encoder>, BuildError> {
        let AvroSchema::Union(branches) = schema.physical() else {
            return Ok(None);
        };
        if branches.is_empty() {
            return Err(BuildError::UnsupportedSchema(
                "a union needs at least one branch".to_string(),
            ));
        }
        let candidates: Vec<(usize, &'a AvroSchema)> = branches.iter().enumerate().collect();

        let routine = match description {
            TypeDescription::Optional(option) => {
                let null_index = branches
                    .iter()
                    .position(|branch| matches!(branch, AvroSchema::Null))
                    .ok_or_else(|| {
                        BuildError::UnsupportedType(format!(
                            "{} cannot be written to {}, which has no null branch",
                            ty.name(),
                            schema
                        ))
                    })?;
                let present: Vec<(usize, &'a AvroSchema)> = candidates
                    .iter()
                    .copied()
                    .filter(|(index, _)| *index != null_index)
                    .collect();
                let inner = build_indexed(schema, &present, &option.inner, context)?;
                let option = option.clone();
                encoder(move |value, buf| match option.get(value)? {
                    None => {
                        encode_long(buf, null_index as i64);
                        Ok(())
                    }
                    Some(present) => inner(present, buf),
                })
            }
            _ => build_indexed(schema, &candidates, ty, context)?,
        };
        Ok(Some(routine))
    }
}
