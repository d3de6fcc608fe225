//! Error types for hiera-core

/// Result type for hiera-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while assembling schemas or resolving configuration
///
/// Absence of a value is never an error here: a field that resolves to
/// nothing is reported as `None`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Root record type read before it was registered
    #[error("Base config type has not been set; call set_base_config_type during startup")]
    ConfigNotInitialized,

    /// Merge attempted onto something that is not a record
    #[error("Cannot merge onto a non-record value of kind {found}")]
    MergeTypeMismatch { found: String },

    /// Lazy synthesis requested for a name that is not a record type
    #[error("'{name}' is not a registered record type")]
    NotARecordType { name: String },

    /// Global config instance stored under the wrong type
    #[error("Global config for {expected} must be an instance of it, got {found}")]
    GlobalTypeMismatch { expected: String, found: String },

    /// Root schema name does not follow the Global prefix convention
    #[error("Root config type '{name}' must start with 'Global' followed by a name")]
    InvalidRootName { name: String },

    /// A lazy record was expected
    #[error("{name} is not a lazy record type")]
    NotLazy { name: String },

    /// Record model error from hiera-schema
    #[error(transparent)]
    Schema(#[from] hiera_schema::Error),
}
