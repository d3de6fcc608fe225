//! Scoped context stack
//!
//! Each thread owns a stack of merged snapshots. The top entry is "the
//! current configuration" for lazy reads on that thread; other threads never
//! see it. Entries are pushed by [`ConfigRuntime::enter_scope`] and popped
//! when the returned [`ScopeGuard`] drops, including during unwinding.
//!
//! [`ConfigRuntime::enter_scope`]: crate::ConfigRuntime::enter_scope

use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::sync::Arc;

use hiera_schema::{Record, Value};
use serde::Serialize;

thread_local! {
    static STACK: RefCell<Vec<Arc<Record>>> = const { RefCell::new(Vec::new()) };
    // Bumped whenever the stack is reset outside scope pairing
    static GENERATION: Cell<u64> = const { Cell::new(0) };
}

/// Something that can open a configuration scope.
///
/// Records and lazy records are sources; so are application objects that
/// carry several config records as named fields (a pipeline step holding
/// its own path and output configs, say).
pub trait ScopeSource {
    /// Short description used in log output.
    fn scope_label(&self) -> String;

    /// Config values contributed by name. Only names that are fields of the
    /// root config type take part in the merge.
    fn scope_fields(&self) -> Vec<(String, Value)>;

    /// The source as a single record, when it is one. A record whose type is
    /// the declared type of a root sub-record field is merged into that field.
    fn scope_record(&self) -> Option<Arc<Record>> {
        None
    }
}

impl ScopeSource for Record {
    fn scope_label(&self) -> String {
        self.type_name().to_string()
    }

    fn scope_fields(&self) -> Vec<(String, Value)> {
        self.iter()
            .map(|(field, value)| (field.name().to_string(), value.clone()))
            .collect()
    }

    fn scope_record(&self) -> Option<Arc<Record>> {
        Some(Arc::new(self.clone()))
    }
}

impl ScopeSource for Arc<Record> {
    fn scope_label(&self) -> String {
        self.as_ref().scope_label()
    }

    fn scope_fields(&self) -> Vec<(String, Value)> {
        self.as_ref().scope_fields()
    }

    fn scope_record(&self) -> Option<Arc<Record>> {
        Some(Arc::clone(self))
    }
}

/// Pops the scope it was returned for when dropped.
///
/// Dropping truncates the stack back to the depth it had before this scope,
/// so dropping an outer guard first also discards the scopes above it.
/// Guards from before a [`clear`] or [`set_for_testing`] do nothing.
///
/// Not `Send`: a scope belongs to the thread that opened it.
#[must_use = "the scope closes as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScopeGuard {
    depth: usize,
    generation: u64,
    snapshot: Arc<Record>,
    _not_send: PhantomData<*const ()>,
}

impl ScopeGuard {
    /// The snapshot this scope pushed.
    pub fn snapshot(&self) -> &Arc<Record> {
        &self.snapshot
    }

    /// Stack depth once this scope is active.
    pub fn depth(&self) -> usize {
        self.depth + 1
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        let depth = self.depth;
        let current = GENERATION.try_with(Cell::get).ok();
        if current != Some(self.generation) {
            return;
        }
        let _ = STACK.try_with(|stack| stack.borrow_mut().truncate(depth));
        tracing::debug!(depth, record = %self.snapshot.type_name(), "Exited config scope");
    }
}

pub(crate) fn push(snapshot: Arc<Record>) -> ScopeGuard {
    let depth = STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        let depth = stack.len();
        stack.push(Arc::clone(&snapshot));
        depth
    });
    ScopeGuard {
        depth,
        generation: GENERATION.with(Cell::get),
        snapshot,
        _not_send: PhantomData,
    }
}

/// The top snapshot of this thread's stack, if any scope is active.
pub fn current_snapshot() -> Option<Arc<Record>> {
    STACK.with(|stack| stack.borrow().last().cloned())
}

/// Number of snapshots on this thread's stack.
pub fn stack_depth() -> usize {
    STACK.with(|stack| stack.borrow().len())
}

/// Replace this thread's stack with a single snapshot.
///
/// Test harness only: bypasses scope pairing.
pub fn set_for_testing(snapshot: impl Into<Arc<Record>>) {
    let snapshot = snapshot.into();
    GENERATION.with(|g| g.set(g.get() + 1));
    STACK.with(|stack| *stack.borrow_mut() = vec![snapshot]);
}

/// Empty this thread's stack.
///
/// Test harness only: guards opened before the call become no-ops.
pub fn clear() {
    GENERATION.with(|g| g.set(g.get() + 1));
    STACK.with(|stack| stack.borrow_mut().clear());
}

/// Summary of the active context, for debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextInfo {
    pub active: bool,
    pub type_name: Option<String>,
    pub field_count: usize,
    pub non_null_fields: usize,
    pub depth: usize,
}

pub fn context_info() -> ContextInfo {
    match current_snapshot() {
        Some(snapshot) => ContextInfo {
            active: true,
            type_name: Some(snapshot.type_name().to_string()),
            field_count: snapshot.values().len(),
            non_null_fields: snapshot.values().iter().filter(|v| !v.is_null()).count(),
            depth: stack_depth(),
        },
        None => ContextInfo {
            active: false,
            type_name: None,
            field_count: 0,
            non_null_fields: 0,
            depth: 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiera_schema::{FieldDef, FieldKind, SchemaBuilder};

    fn record(workers: i64) -> Arc<Record> {
        let schema = SchemaBuilder::new("GlobalTestConfig")
            .field(FieldDef::new("num_workers", FieldKind::Int).with_default(1))
            .field(FieldDef::new("label", FieldKind::Str).unset())
            .build()
            .unwrap();
        Arc::new(
            Record::builder(&schema)
                .set("num_workers", workers)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_guard_restores_previous_snapshot() {
        clear();
        let outer = push(record(1));
        {
            let _inner = push(record(2));
            assert_eq!(stack_depth(), 2);
            assert_eq!(current_snapshot(), Some(record(2)));
        }
        assert_eq!(stack_depth(), 1);
        assert_eq!(current_snapshot(), Some(record(1)));
        drop(outer);
        assert_eq!(current_snapshot(), None);
    }

    #[test]
    fn test_set_for_testing_and_clear() {
        set_for_testing(record(4));
        assert_eq!(stack_depth(), 1);
        clear();
        assert_eq!(current_snapshot(), None);
    }

    #[test]
    fn test_context_info() {
        clear();
        assert!(!context_info().active);

        let _guard = push(record(3));
        let info = context_info();
        assert_eq!(
            info,
            ContextInfo {
                active: true,
                type_name: Some("GlobalTestConfig".to_string()),
                field_count: 2,
                non_null_fields: 1,
                depth: 1,
            }
        );
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["depth"], 1);
    }

    #[test]
    fn test_stacks_are_per_thread() {
        clear();
        let _guard = push(record(9));
        let seen = std::thread::spawn(stack_depth).join().unwrap();
        assert_eq!(seen, 0);
        assert_eq!(stack_depth(), 1);
    }

    #[test]
    fn test_guard_from_before_clear_is_inert() {
        clear();
        let stale = push(record(1));
        clear();

        let _a = push(record(2));
        let _b = push(record(3));
        drop(stale);
        assert_eq!(stack_depth(), 2);
        assert_eq!(current_snapshot(), Some(record(3)));
    }

    #[test]
    fn test_outer_guard_drop_discards_inner_scopes() {
        clear();
        let outer = push(record(1));
        let inner = push(record(2));
        drop(outer);
        assert_eq!(stack_depth(), 0);
        // Already gone; dropping it changes nothing
        drop(inner);
        assert_eq!(stack_depth(), 0);
    }
}
