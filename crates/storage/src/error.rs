use thiserror::Error;
use treeline_core::Error as CoreError;

/// Storage-specific error types
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Content file {path} could not be read: {source}")]
    ContentUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid content: {0}")]
    InvalidContent(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidConfig(msg) => CoreError::config(msg),
            other => CoreError::with_context("storage", other),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::InvalidContent(err.to_string())
    }
}
