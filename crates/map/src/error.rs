//! Error types for the typed mapping.

use redmap_store::StoreError;
use thiserror::Error;

/// Errors returned by [`Mapping`](crate::Mapping) operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A key or value does not have an accepted shape. Raised before the
    /// store is contacted.
    #[error("{0}")]
    InvalidDataType(String),

    /// The key is absent from the store.
    #[error("Key '{0}' does not exist")]
    KeyError(String),

    /// The store holds a value type the mapping cannot read.
    #[error("key '{key}' holds unsupported type '{tag}'")]
    UnsupportedType { key: String, tag: String },

    /// Failure reported by the store, passed through unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience type alias for Result with redmap's Error.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(msg: &str) -> Self {
        Error::InvalidDataType(msg.to_string())
    }
}
