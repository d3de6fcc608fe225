//! Runtime registry object
//!
//! [`ConfigRuntime`] owns every piece of process-wide state the resolution
//! core needs: the schema registry, the root config type, the global config
//! store and the lazy type cache. The application creates one at startup
//! with [`ConfigRuntime::init`] and hands out clones; all clones share the
//! same state.

use std::sync::Arc;

use hiera_schema::{FieldKind, Record, RecordSchema, SchemaRegistry, Value, reachable_schemas};
use parking_lot::RwLock;

use crate::context::{self, ScopeGuard, ScopeSource};
use crate::error::{Error, Result};
use crate::global::GlobalConfigStore;
use crate::lazy::{LazyRecord, LazyTypeFactory, to_base_value};
use crate::merge::{Overrides, merge_records};

#[derive(Debug, Default)]
struct Inner {
    schemas: RwLock<SchemaRegistry>,
    base_type: RwLock<Option<Arc<RecordSchema>>>,
    globals: GlobalConfigStore,
    lazy: LazyTypeFactory,
}

/// Handle to the configuration runtime.
#[derive(Debug, Clone, Default)]
pub struct ConfigRuntime {
    inner: Arc<Inner>,
}

impl ConfigRuntime {
    /// Create an empty runtime.
    pub fn init() -> Self {
        tracing::debug!("Initialised config runtime");
        Self::default()
    }

    /// Drop all registered state and this thread's context stack.
    ///
    /// Other threads' stacks are theirs to unwind.
    pub fn shutdown(&self) {
        *self.inner.schemas.write() = SchemaRegistry::new();
        *self.inner.base_type.write() = None;
        self.inner.globals.clear();
        self.inner.lazy.clear();
        context::clear();
        tracing::debug!("Shut down config runtime");
    }

    // ----- Schemas -----

    /// Register a schema and every schema it references.
    pub fn register_schema(&self, schema: &Arc<RecordSchema>) {
        self.inner.schemas.write().register(schema);
    }

    pub fn schema(&self, name: &str) -> Option<Arc<RecordSchema>> {
        self.inner.schemas.read().get(name).cloned()
    }

    /// Sorted names of all registered schemas.
    pub fn schema_names(&self) -> Vec<String> {
        self.inner.schemas.read().list()
    }

    /// Register `schema` as the root config type.
    pub fn set_base_config_type(&self, schema: &Arc<RecordSchema>) {
        self.register_schema(schema);
        *self.inner.base_type.write() = Some(Arc::clone(schema));
        tracing::debug!(root = %schema.name(), "Set base config type");
    }

    /// The root config type. Errors if none has been registered.
    pub fn base_config_type(&self) -> Result<Arc<RecordSchema>> {
        self.inner
            .base_type
            .read()
            .clone()
            .ok_or(Error::ConfigNotInitialized)
    }

    // ----- Global config store -----

    pub fn set_current_global_config(
        &self,
        schema: &RecordSchema,
        record: impl Into<Arc<Record>>,
    ) -> Result<()> {
        self.inner.globals.set(schema, record)
    }

    pub fn current_global_config(&self, type_name: &str) -> Option<Arc<Record>> {
        self.inner.globals.get(type_name)
    }

    /// The stored instance of the root type, or a default instance of it.
    pub fn base_global_config(&self) -> Result<Arc<Record>> {
        let base = self.base_config_type()?;
        if let Some(stored) = self.current_global_config(base.name().as_str()) {
            return Ok(stored);
        }
        Ok(Arc::new(Record::default_for(&base)?))
    }

    // ----- Scopes -----

    /// The active snapshot on this thread, or the base global config when
    /// no scope is active.
    pub fn current(&self) -> Result<Arc<Record>> {
        match context::current_snapshot() {
            Some(snapshot) => Ok(snapshot),
            None => self.base_global_config(),
        }
    }

    /// Open a scope layering `source` onto the current snapshot.
    ///
    /// Only values for fields of the root type are used. A null value is
    /// skipped unless `mask_with_none` is set, in which case it clears the
    /// field. Nested records merge into the existing sub-record. If `source`
    /// is itself a record whose type is the declared type of a root field,
    /// it is merged into that field.
    ///
    /// The scope closes when the returned guard is dropped.
    pub fn enter_scope<S>(&self, source: &S, mask_with_none: bool) -> Result<ScopeGuard>
    where
        S: ScopeSource + ?Sized,
    {
        let base = self.current()?;
        let root = Arc::clone(base.schema());
        let mut overrides: Vec<(String, Value)> = Vec::new();

        for (name, value) in source.scope_fields() {
            let Some(field) = root.field(&name) else {
                continue;
            };
            let value = to_base_value(value)?;
            if value.is_null() && !mask_with_none {
                continue;
            }
            if !mask_with_none && !compatible(field.kind(), &value) {
                tracing::warn!(
                    field = %name,
                    expected = %field.kind().describe(),
                    found = value.kind_name(),
                    "Skipping incompatible scope override"
                );
                continue;
            }
            overrides.push((name, value));
        }

        if let Some(record) = source.scope_record() {
            let record = to_base_value(Value::Record(record))?;
            if let Some(type_name) = record.as_record().map(|r| r.type_name().clone()) {
                for field in root.fields() {
                    let declared = field.kind().record_schema().map(|s| s.name());
                    if declared == Some(&type_name)
                        && !overrides.iter().any(|(name, _)| name == field.name())
                    {
                        overrides.push((field.name().to_string(), record.clone()));
                    }
                }
            }
        }

        let snapshot = merge_records(&base, Overrides::Fields(&overrides), mask_with_none)?;
        let guard = context::push(snapshot);
        tracing::debug!(
            source = %source.scope_label(),
            depth = guard.depth(),
            mask_with_none,
            "Entered config scope"
        );
        Ok(guard)
    }

    /// Run `f` inside a scope opened from `source`.
    pub fn with_scope<S, R>(&self, source: &S, mask_with_none: bool, f: impl FnOnce() -> R) -> Result<R>
    where
        S: ScopeSource + ?Sized,
    {
        let _guard = self.enter_scope(source, mask_with_none)?;
        Ok(f())
    }

    // ----- Lazy types -----

    /// Lazy counterpart of `base` under the default name.
    pub fn lazy_type(&self, base: &Arc<RecordSchema>) -> Result<Arc<RecordSchema>> {
        let lazy = self.inner.lazy.make_lazy(base)?;
        self.register_schema(&lazy);
        Ok(lazy)
    }

    /// Lazy counterpart of `base` under an explicit name.
    pub fn lazy_type_named(&self, base: &Arc<RecordSchema>, name: &str) -> Result<Arc<RecordSchema>> {
        let lazy = self.inner.lazy.make_lazy_named(base, name)?;
        self.register_schema(&lazy);
        Ok(lazy)
    }

    /// Lazy counterpart of the registered record type `type_name`.
    ///
    /// Reuses the lazy type already synthesised for the registered schema,
    /// whatever its name.
    pub fn make_lazy(&self, type_name: &str) -> Result<Arc<RecordSchema>> {
        let base = self.schema(type_name).ok_or_else(|| Error::NotARecordType {
            name: type_name.to_string(),
        })?;
        if let Some(existing) = self
            .lazy_type_for_base(type_name)
            .filter(|lazy| lazy.lazy_base().is_some_and(|b| Arc::ptr_eq(b, &base)))
        {
            return Ok(existing);
        }
        self.lazy_type(&base)
    }

    /// An empty lazy instance of the registered type `type_name`, which may
    /// name either a base type or a lazy type.
    pub fn new_lazy(&self, type_name: &str) -> Result<LazyRecord> {
        let lazy = self.make_lazy(type_name)?;
        LazyRecord::new(&lazy)
    }

    pub fn lazy_type_for_base(&self, base_name: &str) -> Option<Arc<RecordSchema>> {
        self.inner.lazy.lazy_for_base(base_name)
    }

    pub fn base_type_for_lazy(&self, lazy_name: &str) -> Option<Arc<RecordSchema>> {
        self.inner.lazy.base_for_lazy(lazy_name)
    }

    /// Synthesise the lazy type of every record type reachable from `root`.
    ///
    /// Returns how many types were visited.
    pub fn prewarm_lazy_types(&self, root: &Arc<RecordSchema>) -> Result<usize> {
        let reachable = reachable_schemas(root);
        for schema in &reachable {
            self.lazy_type(schema)?;
        }
        tracing::debug!(root = %root.name(), count = reachable.len(), "Prewarmed lazy types");
        Ok(reachable.len())
    }
}

/// Whether `value` may stand in for a field of `kind`. Only record
/// placement is checked; scalars are taken as given.
fn compatible(kind: &FieldKind, value: &Value) -> bool {
    match (kind, value) {
        (FieldKind::Record(declared), Value::Record(record)) => {
            record.schema().is_subtype_of(declared.name().as_str())
        }
        (FieldKind::Record(_), _) => false,
        (FieldKind::Any, _) => true,
        (_, Value::Record(_)) => false,
        _ => true,
    }
}
