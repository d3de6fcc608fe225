//! [`TestWorld`]: an assembled runtime over the fixture schemas.

use std::sync::Arc;

use hiera_core::{
    AssembledSchema, ConfigRuntime, GlobalSchemaAssembler, InjectOptions, LazyRecord, ScopeSource,
};
use hiera_schema::{Record, RecordSchema, Value};

use crate::schemas::Fixtures;

/// A fresh runtime with the fixture hierarchy assembled under
/// `GlobalPipelineConfig`.
///
/// Creating one clears the calling thread's context stack.
///
/// # Example
///
/// ```
/// use hiera_schema::Value;
/// use hiera_test_utils::TestWorld;
///
/// let world = TestWorld::new();
/// let global = world.global([("num_workers", Value::from(4))]);
/// let _scope = world.runtime.enter_scope(&global, false).unwrap();
/// assert_eq!(
///     world.lazy("GlobalPipelineConfig").get("num_workers"),
///     Some(Value::from(4))
/// );
/// ```
pub struct TestWorld {
    pub runtime: ConfigRuntime,
    pub fixtures: Fixtures,
    pub assembled: AssembledSchema,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    pub fn new() -> Self {
        hiera_core::clear();
        let runtime = ConfigRuntime::init();
        let fixtures = Fixtures::new();

        let mut assembler = GlobalSchemaAssembler::new(&fixtures.global).unwrap();
        assembler
            .inject(&fixtures.well_filter, InjectOptions::default())
            .inject(&fixtures.path_planning, InjectOptions::default())
            .inject(&fixtures.step_well_filter, InjectOptions::default())
            .inject(&fixtures.step_materialization, InjectOptions::hidden())
            .inject(&fixtures.zarr, InjectOptions::default())
            .inject(&fixtures.storage, InjectOptions::optional())
            .inject(&fixtures.processing, InjectOptions::default());
        let assembled = assembler.finish(&runtime).unwrap();

        Self {
            runtime,
            fixtures,
            assembled,
        }
    }

    /// The assembled `GlobalPipelineConfig`.
    pub fn root(&self) -> &Arc<RecordSchema> {
        &self.assembled.root
    }

    /// A root instance with `fields` set and defaults elsewhere.
    pub fn global<'a>(&self, fields: impl IntoIterator<Item = (&'a str, Value)>) -> Record {
        build(self.root(), fields)
    }

    /// An instance of the registered base type `type_name`.
    pub fn record<'a>(
        &self,
        type_name: &str,
        fields: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> Record {
        let schema = self.runtime.schema(type_name).unwrap();
        build(&schema, fields)
    }

    /// An empty lazy instance of the base (or lazy) type `type_name`.
    pub fn lazy(&self, type_name: &str) -> LazyRecord {
        self.runtime.new_lazy(type_name).unwrap()
    }

    /// A lazy instance of `type_name` with `fields` set explicitly.
    pub fn lazy_with<'a>(
        &self,
        type_name: &str,
        fields: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> LazyRecord {
        let schema = self.runtime.make_lazy(type_name).unwrap();
        LazyRecord::with_overrides(&schema, fields).unwrap()
    }
}

fn build<'a>(
    schema: &Arc<RecordSchema>,
    fields: impl IntoIterator<Item = (&'a str, Value)>,
) -> Record {
    let mut builder = Record::builder(schema);
    for (name, value) in fields {
        builder = builder.set(name, value);
    }
    builder.build().unwrap()
}

/// An application object that opens a scope from several named configs,
/// the way a pipeline step carrying its own sub-configs would.
#[derive(Debug, Clone, Default)]
pub struct StepContext {
    pub name: String,
    pub configs: Vec<(String, Value)>,
}

impl StepContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            configs: Vec::new(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.configs.push((field.into(), value.into()));
        self
    }
}

impl ScopeSource for StepContext {
    fn scope_label(&self) -> String {
        format!("step '{}'", self.name)
    }

    fn scope_fields(&self) -> Vec<(String, Value)> {
        self.configs.clone()
    }
}
