use datablocks_core::SchemaError;
use thiserror::Error;

/// Errors from reading or writing resource and glossary files.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required input file does not exist
    #[error("required input not found: {0}")]
    MissingInput(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    /// A record in the file does not match the record schema
    #[error("schema error in {path}: {source}")]
    Schema { path: String, source: SchemaError },
}

impl StoreError {
    pub fn missing_input(path: impl Into<String>) -> Self {
        Self::MissingInput(path.into())
    }
}

/// Errors from materializing or finalizing a catalog tree.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A glossary entry is malformed; nothing was written
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

impl CatalogError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
