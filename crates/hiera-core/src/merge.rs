//! Layering one record's concrete fields onto another
//!
//! Merging never mutates its inputs. When nothing changes the base `Arc` is
//! handed back as-is, so callers can detect a no-op with `Arc::ptr_eq`.

use std::sync::Arc;

use hiera_schema::{Record, Value};

use crate::error::{Error, Result};

/// The field values layered onto a base record.
#[derive(Debug, Clone, Copy)]
pub enum Overrides<'a> {
    /// Every field of another record, matched by name
    Record(&'a Record),
    /// An explicit list of `(field, value)` pairs
    Fields(&'a [(String, Value)]),
}

impl Overrides<'_> {
    fn pairs(&self) -> Vec<(&str, &Value)> {
        match self {
            Overrides::Record(record) => record
                .iter()
                .map(|(field, value)| (field.name(), value))
                .collect(),
            Overrides::Fields(fields) => fields
                .iter()
                .map(|(name, value)| (name.as_str(), value))
                .collect(),
        }
    }
}

/// Merge `overrides` onto `base`, which must hold a record.
pub fn merge(base: &Value, overrides: Overrides<'_>, mask_with_none: bool) -> Result<Arc<Record>> {
    match base {
        Value::Record(record) => merge_records(record, overrides, mask_with_none),
        other => Err(Error::MergeTypeMismatch {
            found: other.kind_name().to_string(),
        }),
    }
}

/// Merge `overrides` onto `base`, producing a record of `base`'s type.
///
/// Per override field:
/// - null, not masking: keep the base value
/// - null, masking: force the field to null
/// - record onto a non-null record: merge the two recursively
/// - anything else: take the override verbatim
///
/// Override fields the base type does not declare are skipped.
pub fn merge_records(
    base: &Arc<Record>,
    overrides: Overrides<'_>,
    mask_with_none: bool,
) -> Result<Arc<Record>> {
    let mut changes: Vec<(String, Value)> = Vec::new();

    for (name, value) in overrides.pairs() {
        let Some(current) = base.raw(name) else {
            tracing::debug!(field = name, record = %base.type_name(), "Skipping override for undeclared field");
            continue;
        };

        let merged = match (value, current) {
            (Value::Null, _) if !mask_with_none => continue,
            (Value::Null, _) => Value::Null,
            (Value::Record(incoming), Value::Record(existing)) => Value::Record(merge_records(
                existing,
                Overrides::Record(incoming),
                mask_with_none,
            )?),
            (value, _) => value.clone(),
        };

        if &merged != current {
            changes.push((name.to_string(), merged));
        }
    }

    if changes.is_empty() {
        return Ok(Arc::clone(base));
    }

    tracing::debug!(
        record = %base.type_name(),
        changed = ?changes.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
        mask_with_none,
        "Merged overrides"
    );
    Ok(Arc::new(base.replace(changes)?))
}
