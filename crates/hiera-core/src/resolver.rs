//! Dual-axis field resolution
//!
//! Two axes decide where an unset field gets its value:
//!
//! - **X-axis**: the nested scopes, flattened into the current snapshot and
//!   projected into an [`AvailableConfigs`] map keyed by record type.
//! - **Y-axis**: the requesting type's ancestor chain, most specific first.
//!
//! Resolution checks the requesting type's own entry first, then walks its
//! ancestors looking for an entry with a concrete value, and finally falls
//! back to the type's static default. Only the requester's own ancestor
//! chain is consulted; unrelated record types that happen to share a base
//! are never searched.

use std::collections::BTreeMap;
use std::sync::Arc;

use hiera_schema::{Record, RecordSchema, TypeName, Value};

/// Snapshot projection: one record instance per runtime type name.
#[derive(Debug, Clone, Default)]
pub struct AvailableConfigs {
    by_type: BTreeMap<TypeName, Arc<Record>>,
}

impl AvailableConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. An existing entry for the same type is kept.
    pub fn insert(&mut self, record: Arc<Record>) {
        self.by_type
            .entry(record.type_name().clone())
            .or_insert(record);
    }

    pub fn get(&self, type_name: &str) -> Option<&Arc<Record>> {
        self.by_type.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.by_type.contains_key(type_name)
    }

    /// Sorted type names present in the map.
    pub fn type_names(&self) -> Vec<&str> {
        self.by_type.keys().map(TypeName::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

impl FromIterator<Arc<Record>> for AvailableConfigs {
    fn from_iter<I: IntoIterator<Item = Arc<Record>>>(iter: I) -> Self {
        let mut configs = Self::new();
        for record in iter {
            configs.insert(record);
        }
        configs
    }
}

/// Project a snapshot into the type-keyed map used for resolution.
///
/// Contains the snapshot itself and every record held directly in one of
/// its fields. Always built from the snapshot passed in, never cached.
pub fn extract_all_configs(snapshot: &Arc<Record>) -> AvailableConfigs {
    let mut configs = AvailableConfigs::new();
    configs.insert(Arc::clone(snapshot));
    for (_, value) in snapshot.iter() {
        if let Value::Record(nested) = value {
            configs.insert(Arc::clone(nested));
        }
    }
    configs
}

/// Resolve `field` for an instance of `requesting`.
///
/// Returns `None` when no stage produces a concrete value.
pub fn resolve_field_inheritance(
    requesting: &RecordSchema,
    field: &str,
    available: &AvailableConfigs,
) -> Option<Value> {
    // Exact type in the current context
    if let Some(value) = concrete(available.get(requesting.name().as_str()), field) {
        tracing::debug!(field, source = %requesting.name(), "Resolved from exact type");
        return Some(value);
    }

    // Ancestor chain, most specific first
    for ancestor in requesting.ancestors() {
        if let Some(value) = concrete(available.get(ancestor.name().as_str()), field) {
            tracing::debug!(field, requesting = %requesting.name(), source = %ancestor.name(), "Resolved from ancestor");
            return Some(value);
        }
    }

    // Static class default
    let fallback = requesting.static_default(field);
    if fallback.is_some() {
        tracing::debug!(field, requesting = %requesting.name(), "Resolved from static default");
    }
    fallback
}

/// Resolve `field` for `instance`, using its runtime type.
pub fn resolve(instance: &Record, field: &str, available: &AvailableConfigs) -> Option<Value> {
    resolve_field_inheritance(instance.schema(), field, available)
}

fn concrete(candidate: Option<&Arc<Record>>, field: &str) -> Option<Value> {
    candidate
        .and_then(|record| record.raw(field))
        .filter(|value| !value.is_null())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiera_schema::{FieldDef, FieldKind, SchemaBuilder};

    fn chain() -> (Arc<RecordSchema>, Arc<RecordSchema>, Arc<RecordSchema>) {
        let a = SchemaBuilder::new("A")
            .field(FieldDef::new("x", FieldKind::Int).unset())
            .field(FieldDef::new("y", FieldKind::Int).with_default(1))
            .build()
            .unwrap();
        let b = SchemaBuilder::new("B").extends(&a).build().unwrap();
        let c = SchemaBuilder::new("C")
            .extends(&b)
            .inherit_as_none()
            .build()
            .unwrap();
        (a, b, c)
    }

    fn instance(schema: &Arc<RecordSchema>, x: Option<i64>) -> Arc<Record> {
        Arc::new(Record::builder(schema).set("x", x).build().unwrap())
    }

    #[test]
    fn test_extract_includes_snapshot_and_nested() {
        let (a, _, _) = chain();
        let root = SchemaBuilder::new("GlobalRoot")
            .field(FieldDef::record("a", &a))
            .field(FieldDef::new("n", FieldKind::Int).with_default(0))
            .build()
            .unwrap();
        let snapshot = Arc::new(Record::default_for(&root).unwrap());
        let configs = extract_all_configs(&snapshot);
        assert_eq!(configs.type_names(), vec!["A", "GlobalRoot"]);
    }

    #[test]
    fn test_first_entry_per_type_wins() {
        let (a, _, _) = chain();
        let configs: AvailableConfigs = [instance(&a, Some(1)), instance(&a, Some(2))]
            .into_iter()
            .collect();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs.get("A").and_then(|r| r.raw("x")), Some(&Value::from(1)));
    }

    #[test]
    fn test_missing_field_on_candidate_is_skipped() {
        let (_, _, c) = chain();
        let other = SchemaBuilder::new("B")
            .field(FieldDef::new("unrelated", FieldKind::Int).with_default(5))
            .build()
            .unwrap();
        let configs: AvailableConfigs = [Arc::new(Record::default_for(&other).unwrap())]
            .into_iter()
            .collect();
        assert_eq!(resolve_field_inheritance(&c, "x", &configs), None);
    }

    #[test]
    fn test_static_default_of_requesting_type() {
        let (_, b, c) = chain();
        let empty = AvailableConfigs::new();
        assert_eq!(resolve_field_inheritance(&b, "y", &empty), Some(Value::from(1)));
        // Unset on C by inherit-as-none
        assert_eq!(resolve_field_inheritance(&c, "y", &empty), None);
    }
}
