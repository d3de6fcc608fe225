//! Fixture record types.
//!
//! ```text
//! WellFilterConfig          well_filter=unset, well_filter_mode=INCLUDE
//! ├── PathPlanningConfig    output_dir_suffix="_outputs", sub_dir="images", global_output_folder=unset
//! │   └── StepMaterializationConfig   inherit-as-none, sub_dir="checkpoints"
//! └── StepWellFilterConfig  inherit-as-none
//! ZarrConfig                compression="zstd", compression_level=unset, chunk_strategy=WELL
//! StorageConfig             backend=DISK, read_only=false
//! ProcessingConfig          abstract, enabled=true
//! GlobalPipelineConfig      num_workers=2, microscope="auto", use_threading=false
//! ```

use std::sync::Arc;

use hiera_schema::{EnumType, FieldDef, FieldKind, RecordSchema, SchemaBuilder, Value};

/// The fixture schemas, built once per call to [`Fixtures::new`].
#[derive(Debug, Clone)]
pub struct Fixtures {
    pub well_filter_mode: EnumType,
    pub well_filter: Arc<RecordSchema>,
    pub path_planning: Arc<RecordSchema>,
    pub step_well_filter: Arc<RecordSchema>,
    pub step_materialization: Arc<RecordSchema>,
    pub zarr: Arc<RecordSchema>,
    pub storage: Arc<RecordSchema>,
    pub processing: Arc<RecordSchema>,
    /// Root type before assembly: only its own scalar fields
    pub global: Arc<RecordSchema>,
}

impl Default for Fixtures {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixtures {
    pub fn new() -> Self {
        let well_filter_mode = EnumType::new("WellFilterMode", ["INCLUDE", "EXCLUDE"]);

        let well_filter = SchemaBuilder::new("WellFilterConfig")
            .field(FieldDef::new("well_filter", FieldKind::Any).unset())
            .field(
                FieldDef::new("well_filter_mode", FieldKind::Enum(well_filter_mode.clone()))
                    .with_default(well_filter_mode.value("INCLUDE")),
            )
            .build()
            .unwrap();

        let path_planning = SchemaBuilder::new("PathPlanningConfig")
            .extends(&well_filter)
            .field(FieldDef::new("output_dir_suffix", FieldKind::Str).with_default("_outputs"))
            .field(FieldDef::new("sub_dir", FieldKind::Str).with_default("images"))
            .field(FieldDef::new("global_output_folder", FieldKind::Path).unset())
            .build()
            .unwrap();

        let step_well_filter = SchemaBuilder::new("StepWellFilterConfig")
            .extends(&well_filter)
            .inherit_as_none()
            .build()
            .unwrap();

        let step_materialization = SchemaBuilder::new("StepMaterializationConfig")
            .extends(&path_planning)
            .inherit_as_none()
            .field(FieldDef::new("sub_dir", FieldKind::Str).with_default("checkpoints"))
            .build()
            .unwrap();

        let chunk_strategy = EnumType::new("ZarrChunkStrategy", ["WELL", "FILE"]);
        let zarr = SchemaBuilder::new("ZarrConfig")
            .field(FieldDef::new("compression", FieldKind::Str).with_default("zstd"))
            .field(FieldDef::new("compression_level", FieldKind::Int).unset())
            .field(
                FieldDef::new("chunk_strategy", FieldKind::Enum(chunk_strategy.clone()))
                    .with_default(chunk_strategy.value("WELL")),
            )
            .build()
            .unwrap();

        let backend = EnumType::new("Backend", ["MEMORY", "DISK", "ZARR"]);
        let storage = SchemaBuilder::new("StorageConfig")
            .field(
                FieldDef::new("backend", FieldKind::Enum(backend.clone()))
                    .with_default(backend.value("DISK")),
            )
            .field(FieldDef::new("read_only", FieldKind::Bool).with_default(false))
            .build()
            .unwrap();

        let processing = SchemaBuilder::new("ProcessingConfig")
            .abstract_type()
            .field(FieldDef::new("enabled", FieldKind::Bool).with_default(true))
            .build()
            .unwrap();

        let global = SchemaBuilder::new("GlobalPipelineConfig")
            .field(FieldDef::new("num_workers", FieldKind::Int).with_default(2))
            .field(FieldDef::new("microscope", FieldKind::Str).with_default("auto"))
            .field(FieldDef::new("use_threading", FieldKind::Bool).with_default(false))
            .build()
            .unwrap();

        Self {
            well_filter_mode,
            well_filter,
            path_planning,
            step_well_filter,
            step_materialization,
            zarr,
            storage,
            processing,
            global,
        }
    }

    /// A `WellFilterMode` value.
    pub fn mode(&self, variant: &str) -> Value {
        self.well_filter_mode.value(variant)
    }
}
