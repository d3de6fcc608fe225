//! Shared test utilities for the hieraconf workspace.
//!
//! Provides one example configuration hierarchy (a microscopy pipeline:
//! global, path planning, step-level well filtering, materialization) so
//! test suites do not each define their own. Never published.
//!
//! # Modules
//!
//! - [`schemas`]: the fixture record types
//! - [`world`]: [`TestWorld`](world::TestWorld), an assembled runtime with
//!   helpers for building records and lazy instances

pub mod schemas;
pub mod world;

pub use schemas::Fixtures;
pub use world::{StepContext, TestWorld};
