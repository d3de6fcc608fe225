use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Install a tracing subscriber for resolution diagnostics.
///
/// Scope entry and exit, merge decisions and resolver hits are logged at
/// debug level, so `RUST_LOG=hiera_core=debug` shows the full resolution
/// trail. Thread ids are included because every thread owns its own
/// context stack.
///
/// Fails if a global subscriber is already installed.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_with_default(DEFAULT_FILTER)
}

/// Like [`init`], falling back to `directives` (e.g. `"hiera_core=debug"`)
/// instead of [`DEFAULT_FILTER`] when `RUST_LOG` is unset.
pub fn init_with_default(directives: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(directives))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_thread_ids(true).compact())
        .try_init()?;

    Ok(())
}
