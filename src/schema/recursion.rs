//! Recursive reference analysis over a schema graph.
//!
//! A node is recursive when it can reach itself through record fields, array
//! items, map values or union branches. Detection runs Tarjan's strongly
//! connected components over the graph with `Named` references followed to
//! their definitions: a node is recursive iff its component has more than one
//! member or it has an edge to itself. Nodes merely shared by two siblings
//! form no cycle and stay non-recursive.

use std::collections::{HashMap, HashSet};

use crate::error::SchemaError;
use crate::schema::{AvroSchema, NamedSchemas, SchemaKey};

/// The set of schema nodes that participate in a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecursionAnalysis {
    recursive: HashSet<SchemaKey>,
}

impl RecursionAnalysis {
    /// Analyze the graph rooted at `root`.
    pub fn analyze(root: &AvroSchema) -> Result<Self, SchemaError> {
        let named = NamedSchemas::collect(root)?;
        Ok(Self::analyze_with(root, &named))
    }

    /// Analyze the graph rooted at `root` using an already collected registry.
    pub fn analyze_with<'a>(root: &'a AvroSchema, named: &NamedSchemas<'a>) -> Self {
        let mut tarjan = Tarjan {
            named,
            next_index: 0,
            index: HashMap::new(),
            lowlink: HashMap::new(),
            stack: Vec::new(),
            on_stack: HashSet::new(),
            recursive: HashSet::new(),
        };
        if let Ok(root) = named.resolve(root) {
            tarjan.visit(root);
        }
        Self {
            recursive: tarjan.recursive,
        }
    }

    /// Check whether a node participates in a cycle.
    ///
    /// Anonymous nodes are recognized by address, so `schema` must be borrowed
    /// from the analyzed graph.
    pub fn is_recursive(&self, schema: &AvroSchema) -> bool {
        self.recursive.contains(&SchemaKey::of(schema))
    }

    /// Full names of all recursive named types, sorted.
    pub fn recursive_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .recursive
            .iter()
            .filter_map(|key| match key {
                SchemaKey::Named(name) => Some(name.clone()),
                SchemaKey::Anonymous(_) => None,
            })
            .collect();
        names.sort_unstable();
        names
    }

    /// True when the graph contains no cycle.
    pub fn is_acyclic(&self) -> bool {
        self.recursive.is_empty()
    }
}

struct Tarjan<'n, 'a> {
    named: &'n NamedSchemas<'a>,
    next_index: usize,
    index: HashMap<SchemaKey, usize>,
    lowlink: HashMap<SchemaKey, usize>,
    stack: Vec<SchemaKey>,
    on_stack: HashSet<SchemaKey>,
    recursive: HashSet<SchemaKey>,
}

impl<'n, 'a> Tarjan<'n, 'a> {
    /// Outgoing edges of a node, with references resolved to definitions.
    fn successors(&self, schema: &'a AvroSchema) -> Vec<&'a AvroSchema> {
        let children: Vec<&'a AvroSchema> = match schema {
            AvroSchema::Record(record) => record.fields.iter().map(|f| &f.schema).collect(),
            AvroSchema::Array(items) => vec![items.as_ref()],
            AvroSchema::Map(values) => vec![values.as_ref()],
            AvroSchema::Union(variants) => variants.iter().collect(),
            _ => Vec::new(),
        };
        children
            .into_iter()
            .filter_map(|child| self.named.resolve(child).ok())
            .filter(|child| is_container(child))
            .collect()
    }

    fn visit(&mut self, node: &'a AvroSchema) {
        let key = SchemaKey::of(node);
        let index = self.next_index;
        self.next_index += 1;
        self.index.insert(key.clone(), index);
        self.lowlink.insert(key.clone(), index);
        self.stack.push(key.clone());
        self.on_stack.insert(key.clone());

        for child in self.successors(node) {
            let child_key = SchemaKey::of(child);
            if child_key == key {
                self.recursive.insert(key.clone());
            }
            match self.index.get(&child_key).copied() {
                None => {
                    self.visit(child);
                    let child_low = self.lowlink[&child_key];
                    self.lower(&key, child_low);
                }
                Some(child_index) if self.on_stack.contains(&child_key) => {
                    self.lower(&key, child_index);
                }
                Some(_) => {}
            }
        }

        if self.lowlink[&key] == index {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack.remove(&member);
                let done = member == key;
                component.push(member);
                if done {
                    break;
                }
            }
            if component.len() > 1 {
                self.recursive.extend(component);
            }
        }
    }

    fn lower(&mut self, key: &SchemaKey, candidate: usize) {
        if let Some(low) = self.lowlink.get_mut(key) {
            *low = (*low).min(candidate);
        }
    }
}

/// Only containers have outgoing edges; leaves can never be part of a cycle.
fn is_container(schema: &AvroSchema) -> bool {
    matches!(
        schema,
        AvroSchema::Record(_) | AvroSchema::Array(_) | AvroSchema::Map(_) | AvroSchema::Union(_)
    )
}
