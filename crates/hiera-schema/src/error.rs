//! Error types for hiera-schema

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown field '{field}' on {record}")]
    UnknownField { record: String, field: String },

    #[error("Missing required field '{field}' on {record}")]
    MissingRequiredField { record: String, field: String },

    #[error("Field '{field}' declared twice on {record}")]
    DuplicateField { record: String, field: String },

    #[error("Record type not registered: {name}")]
    UnknownType { name: String },

    #[error("Invalid value for {record}.{field}: {message}")]
    InvalidValue {
        record: String,
        field: String,
        message: String,
    },

    #[error("Record {record} expects {expected} values, got {found}")]
    ArityMismatch {
        record: String,
        expected: usize,
        found: usize,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(record: &str, field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            record: record.to_string(),
            field: field.to_string(),
            message: message.into(),
        }
    }
}
