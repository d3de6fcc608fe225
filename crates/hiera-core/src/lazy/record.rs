//! Lazy record instances

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use hiera_schema::{FieldKind, Record, RecordSchema, TypeName, Value};

use crate::context::{self, ScopeSource};
use crate::error::{Error, Result};
use crate::resolver::{extract_all_configs, resolve_field_inheritance};

/// An instance of a lazy record type.
///
/// Reads go through [`get`](Self::get), which resolves unset fields against
/// the calling thread's active scopes:
///
/// 1. a value stored on this instance wins outright;
/// 2. otherwise the snapshot's sub-record for this type (the root field
///    named after the base type) is consulted;
/// 3. otherwise the dual-axis resolver runs over the whole snapshot.
///
/// With no scope active at all, reads fall back to the first static default
/// on the base type's ancestor chain.
#[derive(Debug, Clone, PartialEq)]
pub struct LazyRecord {
    record: Arc<Record>,
}

impl LazyRecord {
    /// An instance with nothing set. Nested record fields hold empty lazy
    /// instances of their own type.
    pub fn new(schema: &Arc<RecordSchema>) -> Result<Self> {
        ensure_lazy(schema)?;
        Ok(Self {
            record: Arc::new(Record::default_for(schema)?),
        })
    }

    /// Same as [`new`](Self::new).
    pub fn with_defaults(schema: &Arc<RecordSchema>) -> Result<Self> {
        Self::new(schema)
    }

    /// An instance with the given fields set explicitly.
    pub fn with_overrides<I, K, V>(schema: &Arc<RecordSchema>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        ensure_lazy(schema)?;
        let mut builder = Record::builder(schema);
        for (name, value) in values {
            builder = builder.set(name, value);
        }
        Ok(Self {
            record: Arc::new(builder.build()?),
        })
    }

    /// Wrap a record whose type is lazy.
    pub fn from_record(record: impl Into<Arc<Record>>) -> Result<Self> {
        let record = record.into();
        ensure_lazy(record.schema())?;
        Ok(Self { record })
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        self.record.schema()
    }

    /// The base type this lazy type mirrors.
    pub fn base_schema(&self) -> &Arc<RecordSchema> {
        // Checked at construction
        self.record
            .schema()
            .lazy_base()
            .unwrap_or_else(|| self.record.schema())
    }

    pub fn type_name(&self) -> &TypeName {
        self.record.type_name()
    }

    pub fn record(&self) -> &Arc<Record> {
        &self.record
    }

    /// Stored value of `field`, without resolution.
    pub fn raw(&self, field: &str) -> Option<&Value> {
        self.record.raw(field)
    }

    /// Fields passed explicitly at construction.
    pub fn explicit_fields(&self) -> &BTreeSet<String> {
        self.record.explicit_fields()
    }

    pub fn is_explicit(&self, field: &str) -> bool {
        self.record.is_explicit(field)
    }

    /// Resolve `field`.
    ///
    /// `None` means the field is not declared on this type or resolves to
    /// nothing anywhere.
    pub fn get(&self, field: &str) -> Option<Value> {
        let schema = self.schema();
        let def = schema.field(field)?;

        if let Some(value) = self.raw(field).filter(|v| !v.is_null()) {
            return Some(value.clone());
        }

        let Some(snapshot) = context::current_snapshot() else {
            return self.base_schema().inherited_default(field);
        };

        let scope_field = schema.config_field_name();
        if let Some(value) = snapshot
            .raw(&scope_field)
            .and_then(Value::as_record)
            .and_then(|scoped| scoped.raw(field))
            .filter(|v| !v.is_null())
        {
            tracing::debug!(field, scope_field = %scope_field, "Resolved from scope field");
            return Some(value.clone());
        }

        let available = extract_all_configs(&snapshot);
        if let Some(value) = resolve_field_inheritance(schema, field, &available) {
            return Some(value);
        }

        match def.kind() {
            FieldKind::Record(nested) => Record::default_for(nested).ok().map(Value::from),
            _ => None,
        }
    }

    /// Resolve a nested record field as a lazy record.
    ///
    /// Returns `None` for unknown fields and fields that do not resolve to a
    /// lazy record.
    pub fn get_nested(&self, field: &str) -> Option<LazyRecord> {
        match self.get(field)? {
            Value::Record(record) if record.schema().is_lazy() => Some(LazyRecord { record }),
            _ => None,
        }
    }

    /// Plain base-type instance holding this instance's stored values.
    ///
    /// Unset fields stay unset; nothing is resolved. Nested lazy records are
    /// converted the same way.
    pub fn to_base_config(&self) -> Result<Record> {
        to_base_record(&self.record)
    }

    /// Plain base-type instance holding every field resolved through the
    /// active scopes, nested lazy records included.
    pub fn materialize(&self) -> Result<Record> {
        let base = self.base_schema();
        let mut values = Vec::with_capacity(base.field_count());
        for field in base.fields() {
            let value = match self.get(field.name()) {
                Some(Value::Record(nested)) if nested.schema().is_lazy() => {
                    Value::from(LazyRecord { record: nested }.materialize()?)
                }
                Some(value) => value,
                None => Value::Null,
            };
            values.push(value);
        }
        Ok(Record::from_raw_parts(
            base,
            values,
            self.explicit_fields().clone(),
        )?)
    }
}

impl fmt::Display for LazyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.record)
    }
}

impl ScopeSource for LazyRecord {
    fn scope_label(&self) -> String {
        self.type_name().to_string()
    }

    fn scope_fields(&self) -> Vec<(String, Value)> {
        self.record.scope_fields()
    }

    fn scope_record(&self) -> Option<Arc<Record>> {
        Some(Arc::clone(&self.record))
    }
}

/// Convert a lazy record to its base type, copying stored values only.
/// Non-lazy records are returned unchanged.
pub fn to_base_record(record: &Record) -> Result<Record> {
    let Some(base) = record.schema().lazy_base() else {
        return Ok(record.clone());
    };

    let mut values = Vec::with_capacity(base.field_count());
    for field in base.fields() {
        values.push(to_base_value(record.raw(field.name()).cloned().unwrap_or_default())?);
    }
    Ok(Record::from_raw_parts(
        base,
        values,
        record.explicit_fields().clone(),
    )?)
}

/// Replace any lazy record inside `value` by its base-type equivalent.
pub fn to_base_value(value: Value) -> Result<Value> {
    match value {
        Value::Record(record) if record.schema().is_lazy() => {
            Ok(Value::from(to_base_record(&record)?))
        }
        Value::List(items) => items
            .into_iter()
            .map(to_base_value)
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        other => Ok(other),
    }
}

fn ensure_lazy(schema: &RecordSchema) -> Result<()> {
    if schema.is_lazy() {
        Ok(())
    } else {
        Err(Error::NotLazy {
            name: schema.name().to_string(),
        })
    }
}
