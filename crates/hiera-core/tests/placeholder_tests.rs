//! Placeholder text under active scopes

use hiera_core::PlaceholderFormatter;
use hiera_schema::Value;
use hiera_test_utils::TestWorld;
use pretty_assertions::assert_eq;

#[test]
fn test_placeholder_follows_scope() {
    let world = TestWorld::new();
    let formatter = PlaceholderFormatter::new(&world.runtime);
    let lazy_root = world.assembled.lazy_root.clone();

    assert_eq!(
        formatter.placeholder(&lazy_root, "num_workers").unwrap(),
        Some("Default: 2".to_string())
    );

    let global = world.global([("num_workers", Value::from(4))]);
    let _scope = world.runtime.enter_scope(&global, false).unwrap();
    assert_eq!(
        formatter.placeholder(&lazy_root, "num_workers").unwrap(),
        Some("Default: 4".to_string())
    );
}

#[test]
fn test_base_type_resolved_through_its_lazy_type() {
    let world = TestWorld::new();
    let zarr = world.record("ZarrConfig", [("compression", Value::from("lz4"))]);
    let _scope = world.runtime.enter_scope(&zarr, false).unwrap();

    let formatter = PlaceholderFormatter::new(&world.runtime).with_prefix("Inherited");
    assert_eq!(
        formatter.placeholder(&world.fixtures.zarr, "compression").unwrap(),
        Some("Inherited: lz4".to_string())
    );
    assert_eq!(
        formatter
            .placeholder(&world.fixtures.zarr, "compression_level")
            .unwrap(),
        Some("Inherited: (none)".to_string())
    );
}

#[test]
fn test_nested_record_summary_resolves_lazily() {
    let world = TestWorld::new();
    let zarr = world.record("ZarrConfig", [("compression_level", Value::from(3))]);
    let _scope = world.runtime.enter_scope(&zarr, false).unwrap();

    let formatter = PlaceholderFormatter::new(&world.runtime).with_prefix("");
    assert_eq!(
        formatter
            .placeholder(&world.assembled.lazy_root, "zarr_config")
            .unwrap(),
        Some("compression=zstd, compression_level=3, chunk_strategy=WELL".to_string())
    );
}

#[test]
fn test_enum_placeholder_through_ancestor_entry() {
    let world = TestWorld::new();
    let well_filter = world.record(
        "WellFilterConfig",
        [("well_filter_mode", world.fixtures.mode("EXCLUDE"))],
    );
    let _scope = world.runtime.enter_scope(&well_filter, false).unwrap();

    let formatter = PlaceholderFormatter::new(&world.runtime);
    assert_eq!(
        formatter
            .placeholder(&world.fixtures.step_well_filter, "well_filter_mode")
            .unwrap(),
        Some("Default: EXCLUDE".to_string())
    );
}
