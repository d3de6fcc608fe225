//! Lazy record types
//!
//! A lazy type mirrors a base record type field for field, with every
//! default forced to unset and nested records replaced by their own lazy
//! counterparts. Its parent is the base type, so the base's ancestors are
//! on its resolution chain.

mod factory;
mod record;

pub use factory::LazyTypeFactory;
pub use record::{LazyRecord, to_base_record, to_base_value};
