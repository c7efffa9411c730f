//! Deserializer case for unions.
//!
//! Every branch the writer might have chosen needs a routine, so a union is
//! only readable into a type that accepts all of its branches.

use crate::binary::decode_index;
use crate::error::BuildError;
use crate::reflect::{TypeDescription, TypeRef};
use crate::schema::AvroSchema;
use crate::serialization::{
    decoder, schema_short_name, select_unique, BuildContext, BuilderCase, Decoder, Routine,
};

/// Decoder reading one union branch into `ty`.
///
/// A union-like type reads the branch through the variant that accepts it;
/// a box is looked through.
fn build_branch<'a>(
    branch: &'a AvroSchema,
    ty: &TypeRef,
    context: &mut BuildContext<'a, Decoder>,
) -> Result<Decoder, BuildError> {
    match context.resolver().resolve(ty)? {
        TypeDescription::Boxed(boxed) => {
            let inner = build_branch(branch, &boxed.inner, context)?;
            Ok(Decoder::boxed(inner, boxed))
        }
        TypeDescription::UnionLike(union) => {
            let resolved = context.resolve_schema(branch)?;
            let mut matches = Vec::new();
            for variant in &union.variants {
                if let Some(routine) = context.try_build(branch, &variant.ty)? {
                    matches.push((Some(variant.name.clone()), (variant.clone(), routine)));
                }
            }
            let target = schema_short_name(resolved);
            let (variant, inner) =
                select_unique(matches, target.as_deref(), |count| match count {
                    0 => format!("no variant of {} reads branch {}", ty.name(), resolved),
                    n => format!("{} variants of {} read branch {}", n, ty.name(), resolved),
                })?;
            Ok(decoder(move |data| Ok(variant.wrap(inner(data)?)?)))
        }
        _ => context.build(branch, ty),
    }
}

pub struct UnionCase;

impl BuilderCase<Decoder> for UnionCase {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        context: &mut BuildContext<'a, Decoder>,
    ) -> Result<Option<Decoder>, BuildError> {
        let AvroSchema::Union(branches) = schema.physical() else {
            return Ok(None);
        };
        if branches.is_empty() {
            return Err(BuildError::UnsupportedSchema(
                "a union needs at least one branch".to_string(),
            ));
        }

        let mut routines = Vec::with_capacity(branches.len());
        for branch in branches {
            let routine = match description {
                TypeDescription::Optional(option) => {
                    let option = option.clone();
                    if matches!(context.resolve_schema(branch)?, AvroSchema::Null) {
                        decoder(move |_data| Ok(option.none()))
                    } else {
                        let inner = build_branch(branch, &option.inner, context)?;
                        decoder(move |data| Ok(option.some(inner(data)?)?))
                    }
                }
                _ => build_branch(branch, ty, context)?,
            };
            routines.push(routine);
        }

        Ok(Some(decoder(move |data| {
            let index = decode_index(data, routines.len(), "union")?;
            routines[index](data)
        })))
    }
}
