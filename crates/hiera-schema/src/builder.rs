//! Schema construction and derivation
//!
//! Schemas are never edited after they are built. Deriving one type from
//! another (subclassing, inherit-as-unset rewriting, lazy synthesis, root
//! assembly) always goes through [`SchemaBuilder`] and produces a new schema.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::schema::{FieldDef, FieldDefault, RecordSchema, TypeName};

/// Builder for [`RecordSchema`].
///
/// # Example
///
/// ```
/// use hiera_schema::{FieldDef, FieldKind, SchemaBuilder};
///
/// let base = SchemaBuilder::new("WellFilterConfig")
///     .field(FieldDef::new("well_filter", FieldKind::Any).unset())
///     .build()
///     .unwrap();
/// let step = SchemaBuilder::new("StepWellFilterConfig")
///     .extends(&base)
///     .inherit_as_none()
///     .build()
///     .unwrap();
/// assert!(step.is_subtype_of("WellFilterConfig"));
/// ```
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: TypeName,
    parent: Option<Arc<RecordSchema>>,
    fields: Vec<FieldDef>,
    is_abstract: bool,
    inherit_as_none: bool,
    ui_hidden: bool,
    lazy_base: Option<Arc<RecordSchema>>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            fields: Vec::new(),
            is_abstract: false,
            inherit_as_none: false,
            ui_hidden: false,
            lazy_base: None,
        }
    }

    /// Start from an existing schema, keeping its name, parent, flags and
    /// every field it exposes. Used to rebuild a type with extra fields.
    pub fn from_schema(schema: &RecordSchema) -> Self {
        Self {
            name: schema.name.clone(),
            parent: schema.parent.clone(),
            fields: schema.fields.clone(),
            is_abstract: schema.is_abstract,
            inherit_as_none: schema.inherit_as_none,
            ui_hidden: schema.ui_hidden,
            lazy_base: schema.lazy_base.clone(),
        }
    }

    /// Set the single parent type.
    pub fn extends(mut self, parent: &Arc<RecordSchema>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Declare (or redeclare) a field.
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Force every inherited field that this type does not redeclare to the
    /// unset sentinel.
    pub fn inherit_as_none(mut self) -> Self {
        self.inherit_as_none = true;
        self
    }

    /// Mark the type abstract: it is never injected into a root schema.
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn ui_hidden(mut self) -> Self {
        self.ui_hidden = true;
        self
    }

    /// Mark the schema as the lazy counterpart of `base`.
    pub fn lazy_of(mut self, base: &Arc<RecordSchema>) -> Self {
        self.lazy_base = Some(Arc::clone(base));
        self
    }

    pub fn build(self) -> Result<Arc<RecordSchema>> {
        {
            let mut seen = HashSet::new();
            for field in &self.fields {
                if !seen.insert(field.name.as_str()) {
                    return Err(Error::DuplicateField {
                        record: self.name.to_string(),
                        field: field.name.clone(),
                    });
                }
            }
        }

        let mut fields: Vec<FieldDef> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        if let Some(parent) = &self.parent {
            for inherited in &parent.fields {
                let mut field = inherited.clone();
                if self.inherit_as_none {
                    field.default = FieldDefault::Unset;
                    field.optional = true;
                }
                index.insert(field.name.clone(), fields.len());
                fields.push(field);
            }
        }

        for mut field in self.fields {
            if field.declared_in.is_none() {
                field.declared_in = Some(self.name.clone());
            }
            match index.get(&field.name) {
                Some(&i) => fields[i] = field,
                None => {
                    index.insert(field.name.clone(), fields.len());
                    fields.push(field);
                }
            }
        }

        tracing::debug!(name = %self.name, fields = fields.len(), "Built record schema");

        Ok(Arc::new(RecordSchema {
            name: self.name,
            parent: self.parent,
            fields,
            index,
            is_abstract: self.is_abstract,
            inherit_as_none: self.inherit_as_none,
            ui_hidden: self.ui_hidden,
            lazy_base: self.lazy_base,
        }))
    }
}
