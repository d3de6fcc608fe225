//! Record schemas
//!
//! A [`RecordSchema`] is the static description of a configuration record
//! type: its identity tag, its single parent, and its flattened field list
//! (inherited fields first, in declaration order). Schemas are immutable and
//! shared behind `Arc`; derived schemas are produced by
//! [`SchemaBuilder`](crate::SchemaBuilder), never by mutation.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::naming::camel_to_snake;
use crate::value::Value;

/// Identity tag of a record type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Arc<str>);

impl TypeName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TypeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl Serialize for TypeName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// A declared enumeration and its variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub variants: Vec<String>,
}

impl EnumType {
    pub fn new<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a value of this enumeration.
    pub fn value(&self, variant: impl Into<String>) -> Value {
        Value::enumeration(self.name.clone(), variant)
    }

    /// Find the canonical spelling of a variant (case-insensitive).
    pub fn variant(&self, candidate: &str) -> Option<&str> {
        self.variants
            .iter()
            .find(|v| v.eq_ignore_ascii_case(candidate))
            .map(String::as_str)
    }
}

/// Declared type of a field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Any,
    Bool,
    Int,
    Float,
    Str,
    Path,
    Enum(EnumType),
    List(Box<FieldKind>),
    /// Nested configuration record
    Record(Arc<RecordSchema>),
}

impl FieldKind {
    /// Schema of the nested record, if this is a record-typed field.
    pub fn record_schema(&self) -> Option<&Arc<RecordSchema>> {
        match self {
            FieldKind::Record(schema) => Some(schema),
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FieldKind::Any => "any".to_string(),
            FieldKind::Bool => "bool".to_string(),
            FieldKind::Int => "int".to_string(),
            FieldKind::Float => "float".to_string(),
            FieldKind::Str => "string".to_string(),
            FieldKind::Path => "path".to_string(),
            FieldKind::Enum(e) => e.name.clone(),
            FieldKind::List(inner) => format!("list<{}>", inner.describe()),
            FieldKind::Record(schema) => schema.name().to_string(),
        }
    }
}

/// Static default of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDefault {
    /// No default: must be supplied at construction
    Required,
    /// The unset sentinel: always look outward
    Unset,
    /// A concrete default value
    Value(Value),
    /// Construct a default instance of the nested record type
    Factory,
}

/// Field metadata carried verbatim through schema transforms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMeta {
    /// Hidden from UI rendering but still part of resolution
    pub ui_hidden: bool,
    pub extra: BTreeMap<String, String>,
}

/// One field of a record schema.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub(crate) name: String,
    pub(crate) kind: FieldKind,
    pub(crate) default: FieldDefault,
    pub(crate) optional: bool,
    pub(crate) meta: FieldMeta,
    pub(crate) declared_in: Option<TypeName>,
}

impl FieldDef {
    /// A required field of the given kind.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: FieldDefault::Required,
            optional: false,
            meta: FieldMeta::default(),
            declared_in: None,
        }
    }

    /// A nested record field defaulting to a fresh instance of `schema`.
    pub fn record(name: impl Into<String>, schema: &Arc<RecordSchema>) -> Self {
        Self::new(name, FieldKind::Record(Arc::clone(schema))).factory()
    }

    /// Set a concrete default. `Value::Null` means unset.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        if value.is_null() {
            self.default = FieldDefault::Unset;
            self.optional = true;
        } else {
            self.default = FieldDefault::Value(value);
        }
        self
    }

    pub fn unset(mut self) -> Self {
        self.default = FieldDefault::Unset;
        self.optional = true;
        self
    }

    pub fn factory(mut self) -> Self {
        self.default = FieldDefault::Factory;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn ui_hidden(mut self) -> Self {
        self.meta.ui_hidden = true;
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.extra.insert(key.into(), value.into());
        self
    }

    pub fn with_meta(mut self, meta: FieldMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn default(&self) -> &FieldDefault {
        &self.default
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn field_meta(&self) -> &FieldMeta {
        &self.meta
    }

    /// The type that declared (or last redeclared) this field.
    pub fn declared_in(&self) -> Option<&TypeName> {
        self.declared_in.as_ref()
    }

    /// The concrete static default, if any.
    ///
    /// Factory defaults are not static values: a nested record field has no
    /// class-level default to inherit from.
    pub fn static_default(&self) -> Option<&Value> {
        match &self.default {
            FieldDefault::Value(v) if !v.is_null() => Some(v),
            _ => None,
        }
    }
}

/// Static description of a configuration record type.
#[derive(Debug)]
pub struct RecordSchema {
    pub(crate) name: TypeName,
    pub(crate) parent: Option<Arc<RecordSchema>>,
    pub(crate) fields: Vec<FieldDef>,
    pub(crate) index: HashMap<String, usize>,
    pub(crate) is_abstract: bool,
    pub(crate) inherit_as_none: bool,
    pub(crate) ui_hidden: bool,
    pub(crate) lazy_base: Option<Arc<RecordSchema>>,
}

impl RecordSchema {
    pub fn name(&self) -> &TypeName {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<RecordSchema>> {
        self.parent.as_ref()
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn inherits_as_none(&self) -> bool {
        self.inherit_as_none
    }

    pub fn is_ui_hidden(&self) -> bool {
        self.ui_hidden
    }

    /// Whether this schema was synthesised as the lazy counterpart of another.
    pub fn is_lazy(&self) -> bool {
        self.lazy_base.is_some()
    }

    /// The base type this lazy schema mirrors.
    pub fn lazy_base(&self) -> Option<&Arc<RecordSchema>> {
        self.lazy_base.as_ref()
    }

    /// The inheritance chain, most specific first, starting with `self`.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// Whether `name` appears anywhere on this type's ancestor chain.
    pub fn is_subtype_of(&self, name: &str) -> bool {
        self.ancestors().any(|s| s.name.as_str() == name)
    }

    /// The concrete static default declared on this exact type.
    pub fn static_default(&self, field: &str) -> Option<Value> {
        self.field(field).and_then(|f| f.static_default()).cloned()
    }

    /// First concrete static default found walking the ancestor chain.
    pub fn inherited_default(&self, field: &str) -> Option<Value> {
        self.ancestors().find_map(|s| s.static_default(field))
    }

    /// Name of the root-record field this type is injected under.
    ///
    /// Lazy schemas answer for their base type.
    pub fn config_field_name(&self) -> String {
        match &self.lazy_base {
            Some(base) => camel_to_snake(base.name.as_str()),
            None => camel_to_snake(self.name.as_str()),
        }
    }
}

/// Iterator over a schema's inheritance chain.
pub struct Ancestors<'a> {
    next: Option<&'a RecordSchema>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a RecordSchema;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent.as_deref();
        Some(current)
    }
}
