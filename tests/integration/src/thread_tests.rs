//! Per-thread scope stacks and the shared lazy type cache

use std::sync::{Arc, Barrier};
use std::thread;

use hiera_core::{context_info, stack_depth};
use hiera_schema::Value;
use hiera_test_utils::TestWorld;
use pretty_assertions::assert_eq;

#[test]
fn test_spawned_thread_sees_no_scope() {
    let world = TestWorld::new();
    let global = world.global([("num_workers", Value::from(16))]);
    let _scope = world.runtime.enter_scope(&global, false).unwrap();
    assert_eq!(
        world.lazy("GlobalPipelineConfig").get("num_workers"),
        Some(Value::from(16))
    );

    let runtime = world.runtime.clone();
    let seen = thread::spawn(move || {
        assert_eq!(stack_depth(), 0);
        assert!(!context_info().active);
        runtime
            .new_lazy("GlobalPipelineConfig")
            .unwrap()
            .get("num_workers")
    })
    .join()
    .unwrap();

    // Static default, not the other thread's scope
    assert_eq!(seen, Some(Value::from(2)));
    assert_eq!(stack_depth(), 1);
}

#[test]
fn test_global_store_shared_across_threads() {
    let world = TestWorld::new();
    let stored = world.global([("microscope", Value::from("opera"))]);
    world
        .runtime
        .set_current_global_config(world.root(), stored)
        .unwrap();

    let runtime = world.runtime.clone();
    let microscope = thread::spawn(move || {
        let global = runtime.base_global_config().unwrap();
        let _scope = runtime.enter_scope(&global, false).unwrap();
        runtime
            .new_lazy("GlobalPipelineConfig")
            .unwrap()
            .get("microscope")
    })
    .join()
    .unwrap();

    assert_eq!(microscope, Some(Value::from("opera")));
}

#[test]
fn test_threads_scope_independently() {
    let world = TestWorld::new();
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4i64)
        .map(|i| {
            let runtime = world.runtime.clone();
            let root = Arc::clone(world.root());
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let global = hiera_schema::Record::builder(&root)
                    .set("num_workers", i)
                    .build()
                    .unwrap();
                let _scope = runtime.enter_scope(&global, false).unwrap();
                // Every thread has its scope open at once
                barrier.wait();
                runtime
                    .new_lazy("GlobalPipelineConfig")
                    .unwrap()
                    .get("num_workers")
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(
        results,
        (0..4i64).map(|i| Some(Value::from(i))).collect::<Vec<_>>()
    );
}

#[test]
fn test_lazy_types_shared_between_threads() {
    let world = TestWorld::new();
    let local = world.runtime.make_lazy("ZarrConfig").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let runtime = world.runtime.clone();
            thread::spawn(move || runtime.make_lazy("ZarrConfig").unwrap())
        })
        .collect();

    for handle in handles {
        assert!(Arc::ptr_eq(&handle.join().unwrap(), &local));
    }
}
