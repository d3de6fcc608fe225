//! Loading record instances from TOML
//!
//! Tables map onto nested record fields, strings onto path and enum fields
//! according to the declared [`FieldKind`]. Keys absent from the document
//! take the schema default; keys the schema does not declare are rejected.

use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::record::Record;
use crate::schema::{FieldKind, RecordSchema};
use crate::value::Value;

/// Parse a record of type `schema` from TOML text.
pub fn load_record(schema: &Arc<RecordSchema>, content: &str) -> Result<Record> {
    let table: toml::Table = toml::from_str(content)?;
    record_from_table(schema, &table)
}

/// Read and parse a record of type `schema` from a TOML file.
pub fn load_record_file(schema: &Arc<RecordSchema>, path: impl AsRef<Path>) -> Result<Record> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    tracing::debug!(path = %path.display(), record = %schema.name(), "Loading record");
    load_record(schema, &content)
}

/// Convert an already parsed table into a record of type `schema`.
pub fn record_from_table(schema: &Arc<RecordSchema>, table: &toml::Table) -> Result<Record> {
    let mut builder = Record::builder(schema);
    for (key, raw) in table {
        let field = schema.field(key).ok_or_else(|| Error::UnknownField {
            record: schema.name().to_string(),
            field: key.clone(),
        })?;
        let value = convert(schema, key, field.kind(), raw)?;
        builder = builder.set(key.as_str(), value);
    }
    builder.build()
}

fn convert(schema: &RecordSchema, field: &str, kind: &FieldKind, raw: &toml::Value) -> Result<Value> {
    let mismatch = || {
        Error::invalid(
            schema.name().as_str(),
            field,
            format!("expected {}, found {}", kind.describe(), raw.type_str()),
        )
    };

    match (kind, raw) {
        (FieldKind::Any, value) => convert_any(schema, field, value),
        (FieldKind::Bool, toml::Value::Boolean(b)) => Ok(Value::Bool(*b)),
        (FieldKind::Int, toml::Value::Integer(i)) => Ok(Value::Int(*i)),
        (FieldKind::Float, toml::Value::Float(x)) => Ok(Value::Float(*x)),
        (FieldKind::Float, toml::Value::Integer(i)) => Ok(Value::Float(*i as f64)),
        (FieldKind::Str, toml::Value::String(s)) => Ok(Value::Str(s.clone())),
        (FieldKind::Path, toml::Value::String(s)) => Ok(Value::path(s)),
        (FieldKind::Enum(enum_type), toml::Value::String(s)) => enum_type
            .variant(s)
            .map(|variant| enum_type.value(variant))
            .ok_or_else(|| {
                Error::invalid(
                    schema.name().as_str(),
                    field,
                    format!("'{}' is not a variant of {}", s, enum_type.name),
                )
            }),
        (FieldKind::List(inner), toml::Value::Array(items)) => items
            .iter()
            .map(|item| convert(schema, field, inner, item))
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        (FieldKind::Record(nested), toml::Value::Table(table)) => {
            record_from_table(nested, table).map(Value::from)
        }
        _ => Err(mismatch()),
    }
}

fn convert_any(schema: &RecordSchema, field: &str, raw: &toml::Value) -> Result<Value> {
    match raw {
        toml::Value::String(s) => Ok(Value::Str(s.clone())),
        toml::Value::Integer(i) => Ok(Value::Int(*i)),
        toml::Value::Float(x) => Ok(Value::Float(*x)),
        toml::Value::Boolean(b) => Ok(Value::Bool(*b)),
        toml::Value::Datetime(dt) => Ok(Value::Str(dt.to_string())),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| convert_any(schema, field, item))
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        toml::Value::Table(_) => Err(Error::invalid(
            schema.name().as_str(),
            field,
            "tables need a record-typed field",
        )),
    }
}
