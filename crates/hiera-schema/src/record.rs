//! Immutable record instances

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};
use crate::schema::{FieldDef, FieldDefault, RecordSchema, TypeName};
use crate::value::Value;

/// An immutable configuration record.
///
/// Values are stored in schema field order. The explicit set records which
/// fields were supplied at construction, as opposed to those that took
/// their declared default.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<RecordSchema>,
    values: Vec<Value>,
    explicit: BTreeSet<String>,
}

impl Record {
    /// Start building an instance of `schema`.
    pub fn builder(schema: &Arc<RecordSchema>) -> RecordBuilder {
        RecordBuilder {
            schema: Arc::clone(schema),
            values: Vec::new(),
        }
    }

    /// An instance holding every declared default.
    ///
    /// Fails when the schema has a required field.
    pub fn default_for(schema: &Arc<RecordSchema>) -> Result<Self> {
        Self::builder(schema).build()
    }

    /// Assemble a record from values already in schema order.
    pub fn from_raw_parts(
        schema: &Arc<RecordSchema>,
        values: Vec<Value>,
        explicit: BTreeSet<String>,
    ) -> Result<Self> {
        if values.len() != schema.field_count() {
            return Err(Error::ArityMismatch {
                record: schema.name().to_string(),
                expected: schema.field_count(),
                found: values.len(),
            });
        }
        if let Some(unknown) = explicit.iter().find(|f| !schema.has_field(f)) {
            return Err(Error::UnknownField {
                record: schema.name().to_string(),
                field: unknown.clone(),
            });
        }
        Ok(Self {
            schema: Arc::clone(schema),
            values,
            explicit,
        })
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    pub fn type_name(&self) -> &TypeName {
        self.schema.name()
    }

    /// The stored value of `field`, without any resolution.
    pub fn raw(&self, field: &str) -> Option<&Value> {
        self.schema.field_index(field).map(|i| &self.values[i])
    }

    /// Stored values in schema order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldDef, &Value)> {
        self.schema.fields().iter().zip(self.values.iter())
    }

    pub fn explicit_fields(&self) -> &BTreeSet<String> {
        &self.explicit
    }

    pub fn is_explicit(&self, field: &str) -> bool {
        self.explicit.contains(field)
    }

    /// A copy with the given fields replaced. Replaced fields join the
    /// explicit set.
    pub fn replace<I, K>(&self, changes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut values = self.values.clone();
        let mut explicit = self.explicit.clone();
        for (name, value) in changes {
            let name = name.into();
            let index = self.schema.field_index(&name).ok_or_else(|| Error::UnknownField {
                record: self.schema.name().to_string(),
                field: name.clone(),
            })?;
            values[index] = value;
            explicit.insert(name);
        }
        Ok(Self {
            schema: Arc::clone(&self.schema),
            values,
            explicit,
        })
    }

    /// JSON view of the stored values.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.values == other.values
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.type_name())?;
        for (i, (field, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", field.name(), value)?;
        }
        write!(f, ")")
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.name(), value)?;
        }
        map.end()
    }
}

/// Builder for [`Record`] instances.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    schema: Arc<RecordSchema>,
    values: Vec<(String, Value)>,
}

impl RecordBuilder {
    /// Supply a field value. Supplied fields form the explicit set, even
    /// when the value is `Value::Null`.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((field.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<Record> {
        let schema = self.schema;
        let mut slots: Vec<Option<Value>> = vec![None; schema.field_count()];
        let mut explicit = BTreeSet::new();

        for (name, value) in self.values {
            let index = schema.field_index(&name).ok_or_else(|| Error::UnknownField {
                record: schema.name().to_string(),
                field: name.clone(),
            })?;
            slots[index] = Some(value);
            explicit.insert(name);
        }

        let mut values = Vec::with_capacity(slots.len());
        for (field, slot) in schema.fields().iter().zip(slots) {
            let value = match slot {
                Some(value) => value,
                None => default_value(&schema, field)?,
            };
            values.push(value);
        }

        Ok(Record {
            schema,
            values,
            explicit,
        })
    }
}

fn default_value(schema: &RecordSchema, field: &FieldDef) -> Result<Value> {
    match field.default() {
        FieldDefault::Required => Err(Error::MissingRequiredField {
            record: schema.name().to_string(),
            field: field.name().to_string(),
        }),
        FieldDefault::Unset => Ok(Value::Null),
        FieldDefault::Value(value) => Ok(value.clone()),
        FieldDefault::Factory => match field.kind().record_schema() {
            Some(nested) => Ok(Value::Record(Arc::new(Record::default_for(nested)?))),
            None => Ok(Value::Null),
        },
    }
}
