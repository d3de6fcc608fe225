//! Process-wide store of authoritative global config instances

use std::collections::HashMap;
use std::sync::Arc;

use hiera_schema::{Record, RecordSchema, TypeName};
use parking_lot::RwLock;

use crate::error::{Error, Result};

/// Type-keyed store of "the current" instance of each global config type.
///
/// Shared across threads. Writes are startup or admin operations; reads
/// happen whenever a thread opens its first scope.
#[derive(Debug, Default)]
pub struct GlobalConfigStore {
    configs: RwLock<HashMap<TypeName, Arc<Record>>>,
}

impl GlobalConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `record` as the current instance of `schema`.
    ///
    /// The record must be an instance of exactly that type.
    pub fn set(&self, schema: &RecordSchema, record: impl Into<Arc<Record>>) -> Result<()> {
        let record = record.into();
        if record.type_name() != schema.name() {
            return Err(Error::GlobalTypeMismatch {
                expected: schema.name().to_string(),
                found: record.type_name().to_string(),
            });
        }
        tracing::debug!(record = %schema.name(), "Set current global config");
        self.configs.write().insert(schema.name().clone(), record);
        Ok(())
    }

    pub fn get(&self, type_name: &str) -> Option<Arc<Record>> {
        self.configs.read().get(type_name).cloned()
    }

    pub fn remove(&self, type_name: &str) -> Option<Arc<Record>> {
        self.configs.write().remove(type_name)
    }

    pub fn clear(&self) {
        self.configs.write().clear();
    }

    pub fn len(&self) -> usize {
        self.configs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiera_schema::{FieldDef, FieldKind, SchemaBuilder};

    fn schema(name: &str) -> Arc<RecordSchema> {
        SchemaBuilder::new(name)
            .field(FieldDef::new("num_workers", FieldKind::Int).with_default(2))
            .build()
            .unwrap()
    }

    #[test]
    fn test_set_and_get() {
        let store = GlobalConfigStore::new();
        assert!(store.is_empty());

        let global = schema("GlobalPipelineConfig");
        let record = Record::builder(&global).set("num_workers", 8).build().unwrap();
        store.set(&global, record.clone()).unwrap();

        assert_eq!(store.get("GlobalPipelineConfig").as_deref(), Some(&record));
        assert_eq!(store.len(), 1);
        assert!(store.remove("GlobalPipelineConfig").is_some());
        assert!(store.get("GlobalPipelineConfig").is_none());
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let store = GlobalConfigStore::new();
        let other = Record::default_for(&schema("Other")).unwrap();
        let result = store.set(&schema("GlobalPipelineConfig"), other);
        assert!(matches!(result, Err(Error::GlobalTypeMismatch { .. })));
    }

    #[test]
    fn test_shared_across_threads() {
        let store = Arc::new(GlobalConfigStore::new());
        let global = schema("GlobalPipelineConfig");
        let writer = {
            let store = Arc::clone(&store);
            let global = Arc::clone(&global);
            std::thread::spawn(move || {
                store
                    .set(&global, Record::default_for(&global).unwrap())
                    .unwrap();
            })
        };
        writer.join().unwrap();
        assert!(store.get("GlobalPipelineConfig").is_some());
    }
}
