//! Resolution core for hierarchical configuration
//!
//! Configuration records form a tree (global, pipeline, step, ...) in which
//! any field may be left unset and inherit its value. This crate provides:
//!
//! - **Config merge** ([`merge`]): layer one record's concrete fields onto
//!   another, optionally masking with nulls
//! - **Scoped context stack** ([`context`]): per-thread stack of merged
//!   snapshots, opened with [`ConfigRuntime::enter_scope`]
//! - **Dual-axis resolver** ([`resolver`]): look a field up by exact type in
//!   the current context, then along the requester's ancestor chain, then in
//!   static defaults
//! - **Lazy records** ([`lazy`]): generated record types whose unset fields
//!   resolve through the active scopes on read
//! - **Runtime** ([`ConfigRuntime`]): owns the schema registry, root type,
//!   global config store and lazy type cache
//!
//! # Example
//!
//! ```
//! use hiera_core::{ConfigRuntime, GlobalSchemaAssembler, InjectOptions, LazyRecord};
//! use hiera_schema::{FieldDef, FieldKind, Record, SchemaBuilder, Value};
//!
//! let root = SchemaBuilder::new("GlobalPipelineConfig")
//!     .field(FieldDef::new("num_workers", FieldKind::Int).with_default(2))
//!     .build()?;
//! let zarr = SchemaBuilder::new("ZarrConfig")
//!     .field(FieldDef::new("compression", FieldKind::Str).with_default("zstd"))
//!     .build()?;
//!
//! let runtime = ConfigRuntime::init();
//! let mut assembler = GlobalSchemaAssembler::new(&root)?;
//! assembler.inject(&zarr, InjectOptions::default());
//! let assembled = assembler.finish(&runtime)?;
//!
//! let patch = Record::builder(&zarr).set("compression", "lz4").build()?;
//! let _scope = runtime.enter_scope(&patch, false)?;
//!
//! let lazy = runtime.new_lazy("ZarrConfig")?;
//! assert_eq!(lazy.get("compression"), Some(Value::from("lz4")));
//! # let _ = assembled;
//! # Ok::<(), hiera_core::Error>(())
//! ```

pub mod assembly;
pub mod context;
pub mod error;
pub mod global;
pub mod lazy;
pub mod logging;
pub mod merge;
pub mod placeholder;
pub mod resolver;
pub mod runtime;

pub use assembly::{AssembledSchema, GlobalSchemaAssembler, InjectOptions};
pub use context::{
    ContextInfo, ScopeGuard, ScopeSource, clear, context_info, current_snapshot, set_for_testing,
    stack_depth,
};
pub use error::{Error, Result};
pub use global::GlobalConfigStore;
pub use lazy::{LazyRecord, LazyTypeFactory, to_base_record, to_base_value};
pub use merge::{Overrides, merge, merge_records};
pub use placeholder::PlaceholderFormatter;
pub use resolver::{AvailableConfigs, extract_all_configs, resolve, resolve_field_inheritance};
pub use runtime::ConfigRuntime;
