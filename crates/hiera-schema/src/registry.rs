//! Schema registry
//!
//! Maps type names to record schemas. Registering a schema also registers
//! every schema it references: its ancestors and the record types of its
//! nested fields.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::schema::{FieldKind, RecordSchema, TypeName};

/// Registry of record schemas keyed by type name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<TypeName, Arc<RecordSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            schemas: BTreeMap::new(),
        }
    }

    /// Register a schema and everything it references.
    ///
    /// A later registration under the same name replaces the earlier one.
    pub fn register(&mut self, schema: &Arc<RecordSchema>) {
        for reachable in reachable_schemas(schema) {
            tracing::debug!(name = %reachable.name(), "Registering schema");
            self.schemas.insert(reachable.name().clone(), reachable);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<RecordSchema>> {
        self.schemas.get(name)
    }

    /// Like [`get`](Self::get), but a missing type is an error.
    pub fn require(&self, name: &str) -> Result<&Arc<RecordSchema>> {
        self.get(name).ok_or_else(|| Error::UnknownType {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Sorted list of registered type names.
    pub fn list(&self) -> Vec<String> {
        self.schemas.keys().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// Every record schema reachable from `root` through ancestors and nested
/// record fields, `root` first, each type once.
pub fn reachable_schemas(root: &Arc<RecordSchema>) -> Vec<Arc<RecordSchema>> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    let mut queue = VecDeque::from([Arc::clone(root)]);

    while let Some(schema) = queue.pop_front() {
        if !seen.insert(schema.name().clone()) {
            continue;
        }
        if let Some(parent) = schema.parent() {
            queue.push_back(Arc::clone(parent));
        }
        for field in schema.fields() {
            collect_kind(field.kind(), &mut queue);
        }
        out.push(schema);
    }
    out
}

fn collect_kind(kind: &FieldKind, queue: &mut VecDeque<Arc<RecordSchema>>) {
    match kind {
        FieldKind::Record(nested) => queue.push_back(Arc::clone(nested)),
        FieldKind::List(inner) => collect_kind(inner, queue),
        _ => {}
    }
}
