//! End-to-end resolution scenarios over a hand-built root type
//!
//! These build the schemas directly against the runtime, without the
//! assembler, the way an application with a fixed root type would.

use std::sync::Arc;

use hiera_core::{ConfigRuntime, LazyRecord, clear, stack_depth};
use hiera_schema::{EnumType, FieldDef, FieldKind, Record, RecordSchema, SchemaBuilder, Value};
use pretty_assertions::assert_eq;
use rstest::rstest;

struct Scenario {
    runtime: ConfigRuntime,
    mode: EnumType,
    global: Arc<RecordSchema>,
    path: Arc<RecordSchema>,
}

/// `Global{num_workers=2, path: Path}` where `Path` extends `WellFilter`.
fn scenario() -> Scenario {
    clear();
    let mode = EnumType::new("WellFilterMode", ["INCLUDE", "EXCLUDE"]);
    let well_filter = SchemaBuilder::new("WellFilter")
        .field(FieldDef::new("well_filter", FieldKind::Any).unset())
        .field(
            FieldDef::new("well_filter_mode", FieldKind::Enum(mode.clone()))
                .with_default(mode.value("INCLUDE")),
        )
        .build()
        .unwrap();
    let path = SchemaBuilder::new("Path")
        .extends(&well_filter)
        .field(FieldDef::new("output_dir", FieldKind::Path).unset())
        .build()
        .unwrap();
    let global = SchemaBuilder::new("Global")
        .field(FieldDef::new("num_workers", FieldKind::Int).with_default(2))
        .field(FieldDef::record("path", &path))
        .build()
        .unwrap();

    let runtime = ConfigRuntime::init();
    runtime.set_base_config_type(&global);
    runtime.prewarm_lazy_types(&global).unwrap();

    Scenario {
        runtime,
        mode,
        global,
        path,
    }
}

#[test]
fn test_nested_scope_resolution() {
    let s = scenario();

    let global = Record::builder(&s.global).set("num_workers", 4).build().unwrap();
    let _outer = s.runtime.enter_scope(&global, false).unwrap();

    let path = Record::builder(&s.path)
        .set("well_filter", Value::List(Vec::new()))
        .set("well_filter_mode", s.mode.value("EXCLUDE"))
        .build()
        .unwrap();
    let _inner = s.runtime.enter_scope(&path, false).unwrap();

    let lazy = s.runtime.new_lazy("Path").unwrap();
    // Not declared anywhere on Path's ancestor chain
    assert_eq!(lazy.get("num_workers"), None);
    assert_eq!(lazy.get("well_filter_mode"), Some(s.mode.value("EXCLUDE")));
    assert_eq!(lazy.get("well_filter"), Some(Value::List(Vec::new())));
    assert_eq!(lazy.get("output_dir"), None);

    let root = s.runtime.new_lazy("Global").unwrap();
    assert_eq!(root.get("num_workers"), Some(Value::from(4)));
}

#[rstest]
#[case("Global", "num_workers", Some(Value::from(2)))]
#[case("Global", "no_such_field", None)]
#[case("Path", "well_filter", None)]
#[case("Path", "output_dir", None)]
#[case("WellFilter", "well_filter", None)]
fn test_no_scope_reads_static_defaults(
    #[case] type_name: &str,
    #[case] field: &str,
    #[case] expected: Option<Value>,
) {
    let s = scenario();
    assert_eq!(stack_depth(), 0);
    assert_eq!(s.runtime.new_lazy(type_name).unwrap().get(field), expected);
}

#[test]
fn test_no_scope_enum_default_from_ancestor() {
    let s = scenario();
    let lazy = s.runtime.new_lazy("Path").unwrap();
    assert_eq!(lazy.get("well_filter_mode"), Some(s.mode.value("INCLUDE")));
}

#[test]
fn test_no_scope_nested_field_is_lazy_instance() {
    let s = scenario();
    let root = s.runtime.new_lazy("Global").unwrap();
    let path = root.get_nested("path").unwrap();
    assert!(path.schema().is_lazy());
    assert_eq!(path.base_schema().name().as_str(), "Path");
}

#[test]
fn test_lazy_round_trip_reproduces_base_record() {
    let s = scenario();
    let original = Record::builder(&s.path)
        .set("well_filter", Value::list(["A01"]))
        .set("well_filter_mode", s.mode.value("EXCLUDE"))
        .set("output_dir", Value::path("/out"))
        .build()
        .unwrap();

    let explicit: Vec<(String, Value)> = original
        .explicit_fields()
        .iter()
        .map(|name| (name.clone(), original.raw(name).cloned().unwrap_or(Value::Null)))
        .collect();
    let lazy_type = s.runtime.make_lazy("Path").unwrap();
    let lazy = LazyRecord::with_overrides(&lazy_type, explicit).unwrap();

    assert_eq!(lazy.to_base_config().unwrap(), original);
}

#[test]
fn test_shutdown_forgets_root_type() {
    let s = scenario();
    s.runtime.shutdown();
    assert!(s.runtime.base_config_type().is_err());
    assert!(s.runtime.new_lazy("Path").is_err());
}
