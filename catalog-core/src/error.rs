//! Error types for the catalog core
//!
//! Domain-level failures (blank names, missing parents, unknown ids) are not
//! errors: the store declines them silently. Everything here comes from the
//! persistence layer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    Storage(String),
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for CatalogError {
    fn from(err: rusqlite::Error) -> Self {
        CatalogError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
