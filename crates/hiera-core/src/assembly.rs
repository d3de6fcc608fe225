//! Root schema assembly
//!
//! Independently defined config records are gathered into a single root
//! ("global") record type as named sub-record fields, and each gets a lazy
//! counterpart. The resolution core only consumes the result.

use std::collections::BTreeMap;
use std::sync::Arc;

use hiera_schema::{
    FieldDef, FieldKind, GLOBAL_PREFIX, RecordSchema, SchemaBuilder, TypeName, camel_to_snake,
};

use crate::error::{Error, Result};
use crate::runtime::ConfigRuntime;

/// How a record type is injected into the root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InjectOptions {
    /// Field defaults to unset instead of a default instance
    pub optional: bool,
    /// Field is hidden from UI rendering
    pub ui_hidden: bool,
}

impl InjectOptions {
    pub fn optional() -> Self {
        Self {
            optional: true,
            ..Self::default()
        }
    }

    pub fn hidden() -> Self {
        Self {
            ui_hidden: true,
            ..Self::default()
        }
    }
}

/// Result of [`GlobalSchemaAssembler::finish`].
#[derive(Debug, Clone)]
pub struct AssembledSchema {
    /// Root type with every injected field
    pub root: Arc<RecordSchema>,
    /// Lazy counterpart of the root, named without the `Global` prefix
    pub lazy_root: Arc<RecordSchema>,
    /// Base type name to lazy type, for every assembled type
    pub lazy_types: BTreeMap<TypeName, Arc<RecordSchema>>,
}

/// Collects record types to inject into a root config type.
///
/// # Example
///
/// ```
/// use hiera_core::{ConfigRuntime, GlobalSchemaAssembler, InjectOptions};
/// use hiera_schema::{FieldDef, FieldKind, SchemaBuilder};
///
/// let root = SchemaBuilder::new("GlobalPipelineConfig")
///     .field(FieldDef::new("num_workers", FieldKind::Int).with_default(2))
///     .build()
///     .unwrap();
/// let zarr = SchemaBuilder::new("ZarrConfig")
///     .field(FieldDef::new("compression", FieldKind::Str).with_default("zstd"))
///     .build()
///     .unwrap();
///
/// let runtime = ConfigRuntime::init();
/// let mut assembler = GlobalSchemaAssembler::new(&root).unwrap();
/// assembler.inject(&zarr, InjectOptions::default());
/// let assembled = assembler.finish(&runtime).unwrap();
///
/// assert!(assembled.root.has_field("zarr_config"));
/// assert_eq!(assembled.lazy_root.name().as_str(), "PipelineConfig");
/// ```
#[derive(Debug, Clone)]
pub struct GlobalSchemaAssembler {
    root: Arc<RecordSchema>,
    pending: Vec<(Arc<RecordSchema>, InjectOptions)>,
}

impl GlobalSchemaAssembler {
    /// Start assembling onto `root`, whose name must be `Global<Name>`.
    pub fn new(root: &Arc<RecordSchema>) -> Result<Self> {
        lazy_root_name(root.name().as_str())?;
        Ok(Self {
            root: Arc::clone(root),
            pending: Vec::new(),
        })
    }

    /// Queue `schema` for injection as the field `snake_case(type name)`.
    ///
    /// Abstract types get a lazy counterpart but no field.
    pub fn inject(&mut self, schema: &Arc<RecordSchema>, options: InjectOptions) -> &mut Self {
        self.pending.push((Arc::clone(schema), options));
        self
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Build the root, register everything with `runtime` and make the
    /// root the base config type.
    pub fn finish(self, runtime: &ConfigRuntime) -> Result<AssembledSchema> {
        let mut builder = SchemaBuilder::from_schema(&self.root);
        for (schema, options) in &self.pending {
            if schema.is_abstract() {
                tracing::debug!(record = %schema.name(), "Abstract type not injected");
                continue;
            }
            let field_name = camel_to_snake(schema.name().as_str());
            if self.root.has_field(&field_name) {
                tracing::debug!(field = %field_name, "Root already declares field, not injecting");
                continue;
            }
            let mut field = FieldDef::new(field_name, FieldKind::Record(Arc::clone(schema)));
            field = if options.optional {
                field.unset()
            } else {
                field.factory()
            };
            if options.ui_hidden {
                field = field.ui_hidden();
            }
            builder = builder.field(field);
        }
        let root = builder.build()?;
        runtime.register_schema(&root);

        let mut lazy_types = BTreeMap::new();
        for (schema, _) in &self.pending {
            let lazy = runtime.lazy_type(schema)?;
            lazy_types.insert(schema.name().clone(), lazy);
        }
        let lazy_root = runtime.lazy_type_named(&root, lazy_root_name(root.name().as_str())?)?;
        lazy_types.insert(root.name().clone(), Arc::clone(&lazy_root));

        runtime.set_base_config_type(&root);
        tracing::debug!(
            root = %root.name(),
            injected = self.pending.len(),
            "Assembled global config schema"
        );

        Ok(AssembledSchema {
            root,
            lazy_root,
            lazy_types,
        })
    }
}

fn lazy_root_name(root_name: &str) -> Result<&str> {
    match root_name.strip_prefix(GLOBAL_PREFIX) {
        Some(rest) if !rest.is_empty() => Ok(rest),
        _ => Err(Error::InvalidRootName {
            name: root_name.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("GlobalPipelineConfig", Some("PipelineConfig"))]
    #[case("GlobalX", Some("X"))]
    #[case("Global", None)]
    #[case("PipelineConfig", None)]
    fn test_lazy_root_name(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(lazy_root_name(input).ok(), expected);
    }
}
