//! Global config loaded from disk, then layered by pipeline and step scopes

use std::fs;

use hiera_core::{PlaceholderFormatter, context_info, stack_depth};
use hiera_schema::{Value, load_record_file};
use hiera_test_utils::{StepContext, TestWorld};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const GLOBAL_TOML: &str = r#"
num_workers = 8
microscope = "imagexpress"

[path_planning_config]
sub_dir = "processed"

[zarr_config]
compression_level = 5
"#;

/// A world whose global store holds the config loaded from `GLOBAL_TOML`.
fn loaded_world() -> (TestWorld, TempDir) {
    let world = TestWorld::new();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("global.toml");
    fs::write(&path, GLOBAL_TOML).unwrap();

    let global = load_record_file(world.root(), &path).unwrap();
    world
        .runtime
        .set_current_global_config(world.root(), global)
        .unwrap();
    (world, temp)
}

#[test]
fn test_loaded_global_is_the_base_snapshot() {
    let (world, _temp) = loaded_world();
    let current = world.runtime.current().unwrap();
    assert_eq!(current.raw("num_workers"), Some(&Value::from(8)));

    // The global store alone is not a scope; lazy reads need one pushed
    let global = world.runtime.base_global_config().unwrap();
    let _scope = world.runtime.enter_scope(&global, false).unwrap();
    let path = world.lazy("PathPlanningConfig");
    assert_eq!(path.get("sub_dir"), Some(Value::from("processed")));
    assert_eq!(path.get("output_dir_suffix"), Some(Value::from("_outputs")));
}

#[test]
fn test_pipeline_then_step_layers() {
    let (world, _temp) = loaded_world();
    let global = world.runtime.base_global_config().unwrap();
    let _global = world.runtime.enter_scope(&global, false).unwrap();

    let pipeline = StepContext::new("pipeline")
        .with("num_workers", Value::from(4))
        .with(
            "zarr_config",
            world.record("ZarrConfig", [("compression", Value::from("blosc"))]),
        );
    let _pipeline = world.runtime.enter_scope(&pipeline, false).unwrap();

    {
        let step_path = world.record(
            "StepMaterializationConfig",
            [("output_dir_suffix", Value::from("_step"))],
        );
        let step = StepContext::new("materialize").with("step_materialization_config", step_path);
        let _step = world.runtime.enter_scope(&step, false).unwrap();
        assert_eq!(stack_depth(), 3);

        let root = world.lazy("GlobalPipelineConfig");
        assert_eq!(root.get("num_workers"), Some(Value::from(4)));
        assert_eq!(root.get("microscope"), Some(Value::from("imagexpress")));

        let zarr = root.get_nested("zarr_config").unwrap();
        assert_eq!(zarr.get("compression"), Some(Value::from("blosc")));
        // Lower layers survive the nested merge
        assert_eq!(zarr.get("compression_level"), Some(Value::from(5)));

        let step_mat = world.lazy("StepMaterializationConfig");
        assert_eq!(step_mat.get("output_dir_suffix"), Some(Value::from("_step")));
        assert_eq!(step_mat.get("sub_dir"), Some(Value::from("checkpoints")));
    }

    assert_eq!(stack_depth(), 2);
    let step_mat = world.lazy("StepMaterializationConfig");
    assert_eq!(step_mat.get("output_dir_suffix"), Some(Value::from("_outputs")));
}

#[test]
fn test_step_can_mask_inherited_value() {
    let (world, _temp) = loaded_world();
    let global = world.runtime.base_global_config().unwrap();
    let _global = world.runtime.enter_scope(&global, false).unwrap();

    let step = StepContext::new("raw").with("microscope", Value::Null);
    let root = world.lazy("GlobalPipelineConfig");
    let masked = world
        .runtime
        .with_scope(&step, true, || root.get("microscope"))
        .unwrap();
    assert_eq!(masked, None);
    assert_eq!(root.get("microscope"), Some(Value::from("imagexpress")));
}

#[test]
fn test_placeholder_text_tracks_the_stack() {
    let (world, _temp) = loaded_world();
    let formatter = PlaceholderFormatter::new(&world.runtime);
    let lazy_root = world.assembled.lazy_root.clone();

    let global = world.runtime.base_global_config().unwrap();
    let _global = world.runtime.enter_scope(&global, false).unwrap();
    assert_eq!(
        formatter.placeholder(&lazy_root, "num_workers").unwrap(),
        Some("Default: 8".to_string())
    );

    let pipeline = StepContext::new("pipeline").with("num_workers", Value::from(3));
    world
        .runtime
        .with_scope(&pipeline, false, || {
            assert_eq!(
                formatter.placeholder(&lazy_root, "num_workers").unwrap(),
                Some("Default: 3".to_string())
            );
        })
        .unwrap();
    assert_eq!(context_info().depth, 1);
}
