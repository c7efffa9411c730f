//! Named type registry and schema node identity.
//!
//! A schema graph refers back to a named type (record, enum, fixed) through
//! [`AvroSchema::Named`]. [`NamedSchemas`] collects every definition reachable
//! from a root so references can be followed without copying the graph, and
//! [`SchemaKey`] gives each node the identity used to memoize compiled routines.

use std::collections::{HashMap, HashSet};

use crate::error::SchemaError;
use crate::schema::{AvroSchema, LogicalTypeName};

/// Identity of a schema node within one borrowed schema graph.
///
/// Named nodes are identified by full name, so a `Named` reference and the
/// definition it points at share a key. Anonymous nodes are identified by
/// address, which is stable for as long as the graph is borrowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaKey {
    Named(String),
    Anonymous(usize),
}

impl SchemaKey {
    /// Compute the key of a node.
    pub fn of(schema: &AvroSchema) -> Self {
        match schema.fullname() {
            Some(name) => SchemaKey::Named(name),
            None => SchemaKey::Anonymous(schema as *const AvroSchema as usize),
        }
    }
}

/// Registry of the named definitions reachable from a root schema.
#[derive(Debug, Clone, Default)]
pub struct NamedSchemas<'a> {
    definitions: HashMap<String, &'a AvroSchema>,
}

impl<'a> NamedSchemas<'a> {
    /// Collect and validate every named definition reachable from `root`.
    ///
    /// Identical repeated definitions of one name are accepted; differing
    /// ones fail with [`SchemaError::DuplicateName`]. Every `Named` reference
    /// must resolve, otherwise [`SchemaError::UnresolvedReference`] is returned.
    pub fn collect(root: &'a AvroSchema) -> Result<Self, SchemaError> {
        let mut registry = Self::default();
        let mut references = Vec::new();
        registry.extract(root, &mut references)?;
        for reference in references {
            registry.lookup(reference)?;
        }
        Ok(registry)
    }

    /// Get a definition by full name.
    pub fn get(&self, name: &str) -> Option<&'a AvroSchema> {
        self.definitions.get(name).copied()
    }

    /// Check if a named type is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// True when no named types were found.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Full names of all registered definitions, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Follow a `Named` reference to its definition; other nodes are returned as-is.
    pub fn resolve(&self, schema: &'a AvroSchema) -> Result<&'a AvroSchema, SchemaError> {
        match schema {
            AvroSchema::Named(name) => self.lookup(name),
            other => Ok(other),
        }
    }

    /// Find the definition a reference name points at.
    pub fn resolve_name(&self, name: &str) -> Result<&'a AvroSchema, SchemaError> {
        self.lookup(name)
    }

    /// True when a value of `schema` can occupy no bytes on the wire.
    ///
    /// Only `null`, zero-sized fixed types and records whose fields are all
    /// zero-width qualify. Every other shape writes at least one byte.
    pub fn is_zero_width(&self, schema: &'a AvroSchema) -> bool {
        self.zero_width(schema, &mut Vec::new())
    }

    fn zero_width(&self, schema: &'a AvroSchema, visiting: &mut Vec<SchemaKey>) -> bool {
        let Ok(schema) = self.resolve(schema) else {
            return false;
        };
        match schema.physical() {
            AvroSchema::Null => true,
            AvroSchema::Fixed(fixed) => fixed.size == 0,
            AvroSchema::Record(record) => {
                let key = SchemaKey::of(schema);
                if visiting.contains(&key) {
                    return false;
                }
                visiting.push(key);
                let empty = record
                    .fields
                    .iter()
                    .all(|field| self.zero_width(&field.schema, visiting));
                visiting.pop();
                empty
            }
            _ => false,
        }
    }

    /// Look up a reference by full name, falling back to a unique short-name match.
    fn lookup(&self, name: &str) -> Result<&'a AvroSchema, SchemaError> {
        if let Some(schema) = self.get(name) {
            return Ok(schema);
        }
        let mut candidates = self
            .definitions
            .iter()
            .filter(|(fullname, _)| fullname.rsplit('.').next() == Some(name));
        match (candidates.next(), candidates.next()) {
            (Some((_, schema)), None) => Ok(*schema),
            _ => Err(SchemaError::UnresolvedReference(name.to_string())),
        }
    }

    fn register(&mut self, name: String, schema: &'a AvroSchema) -> Result<bool, SchemaError> {
        match self.definitions.get(&name) {
            Some(existing) if **existing == *schema => Ok(false),
            Some(_) => Err(SchemaError::DuplicateName(name)),
            None => {
                self.definitions.insert(name, schema);
                Ok(true)
            }
        }
    }

    fn extract(
        &mut self,
        schema: &'a AvroSchema,
        references: &mut Vec<&'a str>,
    ) -> Result<(), SchemaError> {
        match schema {
            AvroSchema::Record(record) => {
                if !self.register(record.fullname(), schema)? {
                    return Ok(());
                }
                let mut seen = HashSet::new();
                for field in &record.fields {
                    if !seen.insert(field.name.as_str()) {
                        return Err(SchemaError::InvalidSchema(format!(
                            "Record '{}' has duplicate field '{}'",
                            record.fullname(),
                            field.name
                        )));
                    }
                    self.extract(&field.schema, references)?;
                }
            }
            AvroSchema::Enum(enum_schema) => {
                let mut seen = HashSet::new();
                if let Some(symbol) = enum_schema.symbols.iter().find(|s| !seen.insert(*s)) {
                    return Err(SchemaError::InvalidSchema(format!(
                        "Enum '{}' has duplicate symbol '{}'",
                        enum_schema.fullname(),
                        symbol
                    )));
                }
                if let Some(default) = &enum_schema.default {
                    if enum_schema.symbol_index(default).is_none() {
                        return Err(SchemaError::InvalidSchema(format!(
                            "Enum '{}' default '{}' is not a symbol",
                            enum_schema.fullname(),
                            default
                        )));
                    }
                }
                self.register(enum_schema.fullname(), schema)?;
            }
            AvroSchema::Fixed(fixed) => {
                self.register(fixed.fullname(), schema)?;
            }
            AvroSchema::Array(items) => self.extract(items, references)?,
            AvroSchema::Map(values) => self.extract(values, references)?,
            AvroSchema::Union(variants) => {
                validate_union(variants)?;
                for variant in variants {
                    self.extract(variant, references)?;
                }
            }
            AvroSchema::Logical(logical) => {
                validate_logical(&logical.base, logical.logical_type)?;
                // A named base is registered under its own name with the annotation kept
                if let AvroSchema::Fixed(fixed) = logical.base.as_ref() {
                    self.register(fixed.fullname(), schema)?;
                } else {
                    self.extract(&logical.base, references)?;
                }
            }
            AvroSchema::Named(name) => references.push(name),
            _ => {}
        }
        Ok(())
    }
}

/// Unions may not directly contain unions, nor two branches of one unnamed kind.
fn validate_union(variants: &[AvroSchema]) -> Result<(), SchemaError> {
    let mut kinds = HashSet::new();
    for variant in variants {
        if matches!(variant, AvroSchema::Union(_)) {
            return Err(SchemaError::InvalidSchema(
                "Unions may not immediately contain other unions".to_string(),
            ));
        }
        let Some(kind) = unnamed_kind(variant.physical()) else {
            continue;
        };
        if !kinds.insert(kind) {
            return Err(SchemaError::InvalidSchema(format!(
                "Union contains more than one '{}' branch",
                kind
            )));
        }
    }
    Ok(())
}

fn unnamed_kind(schema: &AvroSchema) -> Option<&'static str> {
    match schema {
        AvroSchema::Null => Some("null"),
        AvroSchema::Boolean => Some("boolean"),
        AvroSchema::Int => Some("int"),
        AvroSchema::Long => Some("long"),
        AvroSchema::Float => Some("float"),
        AvroSchema::Double => Some("double"),
        AvroSchema::Bytes => Some("bytes"),
        AvroSchema::String => Some("string"),
        AvroSchema::Array(_) => Some("array"),
        AvroSchema::Map(_) => Some("map"),
        _ => None,
    }
}

fn validate_logical(base: &AvroSchema, logical: LogicalTypeName) -> Result<(), SchemaError> {
    let valid = match (logical, base) {
        (LogicalTypeName::Decimal { precision, scale }, AvroSchema::Bytes) => {
            precision > 0 && scale <= precision
        }
        (LogicalTypeName::Decimal { precision, scale }, AvroSchema::Fixed(fixed)) => {
            precision > 0 && scale <= precision && fixed.size > 0
        }
        (LogicalTypeName::Uuid, AvroSchema::String) => true,
        (LogicalTypeName::Uuid, AvroSchema::Fixed(fixed)) => fixed.size == 16,
        (LogicalTypeName::Date | LogicalTypeName::TimeMillis, AvroSchema::Int) => true,
        (
            LogicalTypeName::TimeMicros
            | LogicalTypeName::TimestampMillis
            | LogicalTypeName::TimestampMicros
            | LogicalTypeName::TimestampNanos
            | LogicalTypeName::LocalTimestampMillis
            | LogicalTypeName::LocalTimestampMicros
            | LogicalTypeName::LocalTimestampNanos,
            AvroSchema::Long,
        ) => true,
        (LogicalTypeName::Duration, AvroSchema::Fixed(fixed)) => fixed.size == 12,
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(SchemaError::InvalidSchema(format!(
            "Logical type '{}' cannot annotate {}",
            logical.name(),
            base.describe()
        )))
    }
}
