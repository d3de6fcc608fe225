//! Record model for hierarchical configuration
//!
//! Configuration is a tree of immutable records. Each record type has a
//! [`RecordSchema`] naming its single parent and its fields; each field has a
//! declared [`FieldKind`] and a static [`FieldDefault`]. A field holding
//! [`Value::Null`] is unset and defers to the enclosing scopes at resolution
//! time.
//!
//! This crate only describes and stores records. Resolution lives in
//! `hiera-core`.

pub mod builder;
pub mod error;
pub mod loader;
pub mod naming;
pub mod record;
pub mod registry;
pub mod schema;
pub mod value;

pub use builder::SchemaBuilder;
pub use error::{Error, Result};
pub use loader::{load_record, load_record_file, record_from_table};
pub use naming::{camel_to_snake, lazy_type_name, GLOBAL_PREFIX, LAZY_PREFIX};
pub use record::{Record, RecordBuilder};
pub use registry::{reachable_schemas, SchemaRegistry};
pub use schema::{
    Ancestors, EnumType, FieldDef, FieldDefault, FieldKind, FieldMeta, RecordSchema, TypeName,
};
pub use value::{EnumValue, Value};
