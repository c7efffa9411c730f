//! State threaded through one build pass.
//!
//! The context memoizes routines per (schema node, target type). A pair is
//! `Building` while its case runs and `Built` afterwards; meeting a pair that
//! is still `Building` means the schema is cyclic, and the caller gets a
//! forward routine that calls through a slot filled once the pair completes.
//! Entries created by a sub-build that fails are rolled back, so a failed
//! union branch attempt leaves nothing behind.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::trace;

use crate::error::BuildError;
use crate::reflect::{TypeDescription, TypeRef, TypeResolver};
use crate::schema::{AvroSchema, NamedSchemas, RecursionAnalysis, SchemaKey};
use crate::serialization::routine::Routine;

/// One rule of a serializer or deserializer chain.
///
/// A case inspects the schema node (already resolved if it was a `Named`
/// reference) together with the target type. It returns `Ok(None)` when the
/// schema shape is not its own, and fails with [`BuildError::UnsupportedType`]
/// when the shape is its own but the type cannot satisfy it.
pub trait BuilderCase<R: Routine>: Send + Sync {
    fn build<'a>(
        &self,
        schema: &'a AvroSchema,
        ty: &TypeRef,
        description: &TypeDescription,
        context: &mut BuildContext<'a, R>,
    ) -> Result<Option<R>, BuildError>;
}

enum MemoEntry<R> {
    Building(Option<Arc<OnceLock<R>>>),
    Built(R),
}

type MemoKey = (SchemaKey, TypeId);

/// Memo, registry and chain shared by every case during one build.
pub struct BuildContext<'a, R: Routine> {
    cases: &'a [Box<dyn BuilderCase<R>>],
    resolver: &'a TypeResolver,
    named: NamedSchemas<'a>,
    recursion: RecursionAnalysis,
    memo: HashMap<MemoKey, MemoEntry<R>>,
    journal: Vec<MemoKey>,
    slots: Vec<Arc<OnceLock<R>>>,
}

impl<'a, R: Routine> BuildContext<'a, R> {
    /// Prepare a build over the graph rooted at `root`.
    pub fn new(
        root: &'a AvroSchema,
        cases: &'a [Box<dyn BuilderCase<R>>],
        resolver: &'a TypeResolver,
    ) -> Result<Self, BuildError> {
        let named = NamedSchemas::collect(root)?;
        let recursion = RecursionAnalysis::analyze_with(root, &named);
        Ok(Self {
            cases,
            resolver,
            named,
            recursion,
            memo: HashMap::new(),
            journal: Vec::new(),
            slots: Vec::new(),
        })
    }

    /// Named definitions of the graph being built.
    pub fn named(&self) -> &NamedSchemas<'a> {
        &self.named
    }

    pub fn recursion(&self) -> &RecursionAnalysis {
        &self.recursion
    }

    pub fn resolver(&self) -> &TypeResolver {
        self.resolver
    }

    /// Follow a `Named` reference to its definition.
    pub fn resolve_schema(&self, schema: &'a AvroSchema) -> Result<&'a AvroSchema, BuildError> {
        Ok(self.named.resolve(schema)?)
    }

    /// Build the routine for `schema` and `ty`.
    pub fn build(&mut self, schema: &'a AvroSchema, ty: &TypeRef) -> Result<R, BuildError> {
        let schema = self.resolve_schema(schema)?;
        let description = self.resolver.resolve(ty)?;

        match &description {
            TypeDescription::Boxed(boxed) => {
                let inner = self.build(schema, &boxed.inner)?;
                return Ok(R::boxed(inner, boxed.clone()));
            }
            TypeDescription::Optional(option)
                if !matches!(schema.physical(), AvroSchema::Null | AvroSchema::Union(_)) =>
            {
                let inner = self.build(schema, &option.inner)?;
                return Ok(R::unwrap_optional(inner, option.clone()));
            }
            _ => {}
        }

        let cases = self.cases;
        self.build_memoized(schema, ty.id(), |context| {
            for case in cases {
                if let Some(routine) = case.build(schema, ty, &description, context)? {
                    return Ok(routine);
                }
            }
            Err(BuildError::UnsupportedSchema(format!(
                "no case recognizes schema {} (target {})",
                schema,
                ty.name()
            )))
        })
    }

    /// Like [`build`](Self::build), but a type that does not fit the schema
    /// yields `Ok(None)` instead of an error.
    pub fn try_build(&mut self, schema: &'a AvroSchema, ty: &TypeRef) -> Result<Option<R>, BuildError> {
        match self.build(schema, ty) {
            Ok(routine) => Ok(Some(routine)),
            Err(err) if err.is_type_mismatch() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Memoize the routine produced by `build` under (`schema`, `type_id`).
    ///
    /// `type_id` need not be a reflected type; routines that depend on the
    /// schema alone use a marker type.
    pub fn build_memoized<F>(
        &mut self,
        schema: &'a AvroSchema,
        type_id: TypeId,
        build: F,
    ) -> Result<R, BuildError>
    where
        F: FnOnce(&mut Self) -> Result<R, BuildError>,
    {
        let key = (SchemaKey::of(schema), type_id);
        match self.memo.get_mut(&key) {
            Some(MemoEntry::Built(routine)) => return Ok(routine.clone()),
            Some(MemoEntry::Building(slot)) => {
                if !self.recursion.is_recursive(schema) {
                    return Err(BuildError::UnsupportedSchema(format!(
                        "schema {} re-entered without a cycle",
                        schema
                    )));
                }
                trace!(schema = %schema, "Installing forward reference");
                let slot = slot.get_or_insert_with(|| Arc::new(OnceLock::new()));
                return Ok(R::forward(Arc::downgrade(slot)));
            }
            None => {}
        }

        let mark = self.journal.len();
        self.memo.insert(key.clone(), MemoEntry::Building(None));
        self.journal.push(key.clone());

        match build(self) {
            Ok(routine) => {
                let previous = self.memo.insert(key, MemoEntry::Built(routine.clone()));
                if let Some(MemoEntry::Building(Some(slot))) = previous {
                    // Cannot already be set: only this build completes the pair
                    let _ = slot.set(routine.clone());
                    self.slots.push(slot);
                }
                Ok(routine)
            }
            Err(err) => {
                for key in self.journal.drain(mark..) {
                    self.memo.remove(&key);
                }
                Err(err)
            }
        }
    }

    /// Forward-reference slots that the finished routine depends on.
    pub fn into_slots(self) -> Vec<Arc<OnceLock<R>>> {
        self.slots
    }
}
