//! Placeholder text for "current effective default" hints
//!
//! Formats what a field would resolve to under the active scopes, e.g.
//! `Default: 4` or `Default: compression=zstd, level=3`. Formatting only;
//! resolution goes through [`LazyRecord::get`].

use std::sync::Arc;

use hiera_schema::{Record, RecordSchema, Value};

use crate::error::Result;
use crate::lazy::LazyRecord;
use crate::runtime::ConfigRuntime;

pub const DEFAULT_PREFIX: &str = "Default";
pub const NONE_VALUE_TEXT: &str = "(none)";

const SUMMARY_MAX_CHARS: usize = 20;
const SUMMARY_KEEP_CHARS: usize = 17;

#[derive(Debug, Clone)]
pub struct PlaceholderFormatter {
    runtime: ConfigRuntime,
    prefix: String,
    none_text: String,
}

impl PlaceholderFormatter {
    pub fn new(runtime: &ConfigRuntime) -> Self {
        Self {
            runtime: runtime.clone(),
            prefix: DEFAULT_PREFIX.to_string(),
            none_text: NONE_VALUE_TEXT.to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_none_text(mut self, none_text: impl Into<String>) -> Self {
        self.none_text = none_text.into();
        self
    }

    /// Placeholder for `field` of `schema` under the active scopes.
    ///
    /// Base types are resolved through their lazy counterpart when one
    /// exists. Types without one report their static default, or `None`
    /// when there is no default to show.
    pub fn placeholder(&self, schema: &Arc<RecordSchema>, field: &str) -> Result<Option<String>> {
        let lazy = if schema.is_lazy() {
            Some(Arc::clone(schema))
        } else {
            self.runtime.lazy_type_for_base(schema.name().as_str())
        };

        let Some(lazy) = lazy else {
            return Ok(schema
                .static_default(field)
                .map(|value| self.with_prefix_applied(&self.format_value(Some(&value)))));
        };

        let resolved = LazyRecord::new(&lazy)?.get(field);
        Ok(Some(self.with_prefix_applied(&self.format_value(resolved.as_ref()))))
    }

    /// Text for a resolved value, without the prefix.
    pub fn format_value(&self, value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => self.none_text.clone(),
            Some(Value::Record(record)) => summarize(record),
            Some(other) => other.to_string(),
        }
    }

    fn with_prefix_applied(&self, text: &str) -> String {
        let prefix = self.prefix.as_str();
        if prefix.is_empty() {
            text.to_string()
        } else if prefix.ends_with(": ") {
            format!("{}{}", prefix, text)
        } else if prefix.ends_with(':') {
            format!("{} {}", prefix, text)
        } else {
            format!("{}: {}", prefix, text)
        }
    }
}

/// `field=value` pairs for every non-null field, resolving through the
/// active scopes when the record is lazy.
fn summarize(record: &Arc<Record>) -> String {
    let lazy = LazyRecord::from_record(Arc::clone(record)).ok();
    let mut parts = Vec::new();

    for (field, stored) in record.iter() {
        let value = match &lazy {
            Some(lazy) => lazy.get(field.name()),
            None => Some(stored.clone()),
        };
        let text = match value {
            None | Some(Value::Null) => continue,
            Some(Value::Str(s)) if s.chars().count() > SUMMARY_MAX_CHARS => {
                let kept: String = s.chars().take(SUMMARY_KEEP_CHARS).collect();
                format!("{}...", kept)
            }
            Some(Value::Record(nested)) => format!("{}(...)", nested.type_name()),
            Some(other) => other.to_string(),
        };
        parts.push(format!("{}={}", field.name(), text));
    }

    if parts.is_empty() {
        format!("{} (default settings)", record.type_name())
    } else {
        parts.join(", ")
    }
}
