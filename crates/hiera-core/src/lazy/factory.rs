//! Synthesis and caching of lazy record types

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use hiera_schema::{
    FieldDef, FieldKind, RecordSchema, SchemaBuilder, TypeName, lazy_type_name,
};

use crate::error::Result;

/// Builds lazy counterparts of record schemas, once per (base, name).
///
/// The cache is safe to populate from several threads. Two threads racing
/// on the same key may both synthesise a schema; the first one stored wins
/// and both callers get it back.
#[derive(Debug, Default)]
pub struct LazyTypeFactory {
    cache: DashMap<(TypeName, String), Arc<RecordSchema>>,
    by_base: DashMap<TypeName, Arc<RecordSchema>>,
    bases: DashMap<TypeName, Arc<RecordSchema>>,
}

impl LazyTypeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lazy counterpart of `base` under the default `Lazy<Base>` name.
    pub fn make_lazy(&self, base: &Arc<RecordSchema>) -> Result<Arc<RecordSchema>> {
        self.make_lazy_named(base, &lazy_type_name(base.name().as_str()))
    }

    /// Lazy counterpart of `base` under an explicit name.
    ///
    /// A schema that is already lazy is returned unchanged. A cached entry
    /// built from a different schema of the same name (a root rebuilt by the
    /// assembler, say) is replaced.
    pub fn make_lazy_named(&self, base: &Arc<RecordSchema>, name: &str) -> Result<Arc<RecordSchema>> {
        if base.is_lazy() {
            return Ok(Arc::clone(base));
        }

        let key = (base.name().clone(), name.to_string());
        let cached = self.cache.get(&key).map(|entry| Arc::clone(entry.value()));
        if let Some(cached) = cached.filter(|lazy| built_from(lazy, base)) {
            return Ok(cached);
        }

        let mut builder = SchemaBuilder::new(name).extends(base).lazy_of(base);
        if base.is_abstract() {
            builder = builder.abstract_type();
        }
        if base.is_ui_hidden() {
            builder = builder.ui_hidden();
        }
        for field in base.fields() {
            builder = builder.field(self.lazy_field(field)?);
        }
        let synthesized = builder.build()?;

        let lazy = match self.cache.entry(key) {
            // Another thread got there first with the same base
            Entry::Occupied(entry) if built_from(entry.get(), base) => Arc::clone(entry.get()),
            Entry::Occupied(mut entry) => {
                tracing::debug!(base = %base.name(), lazy = %name, "Replacing lazy type built from an older schema");
                entry.insert(Arc::clone(&synthesized));
                synthesized
            }
            Entry::Vacant(entry) => Arc::clone(entry.insert(synthesized).value()),
        };

        match self.by_base.entry(base.name().clone()) {
            Entry::Occupied(entry) if built_from(entry.get(), base) => {}
            Entry::Occupied(mut entry) => {
                entry.insert(Arc::clone(&lazy));
            }
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&lazy));
            }
        }
        self.bases.insert(lazy.name().clone(), Arc::clone(base));

        tracing::debug!(base = %base.name(), lazy = %lazy.name(), "Synthesised lazy type");
        Ok(lazy)
    }

    /// Nested records become their lazy counterpart with a factory default;
    /// everything else becomes optional and unset. Metadata is carried over.
    fn lazy_field(&self, field: &FieldDef) -> Result<FieldDef> {
        let lazy = match field.kind() {
            FieldKind::Record(nested) => {
                let nested = self.make_lazy(nested)?;
                FieldDef::new(field.name(), FieldKind::Record(nested)).factory()
            }
            kind => FieldDef::new(field.name(), kind.clone()).unset(),
        };
        Ok(lazy
            .optional()
            .with_meta(field.field_meta().clone()))
    }

    /// The lazy type first synthesised for `base_name`.
    pub fn lazy_for_base(&self, base_name: &str) -> Option<Arc<RecordSchema>> {
        self.by_base.get(base_name).map(|entry| Arc::clone(entry.value()))
    }

    /// The base type a lazy type mirrors.
    pub fn base_for_lazy(&self, lazy_name: &str) -> Option<Arc<RecordSchema>> {
        self.bases.get(lazy_name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&self) {
        self.cache.clear();
        self.by_base.clear();
        self.bases.clear();
    }
}

/// Whether `lazy` was synthesised from this exact `base` schema.
fn built_from(lazy: &Arc<RecordSchema>, base: &Arc<RecordSchema>) -> bool {
    lazy.lazy_base().is_some_and(|b| Arc::ptr_eq(b, base))
}
