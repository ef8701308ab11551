//! Side-channel error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// The surface does not exist on this platform
    #[error("Not supported on {0}")]
    Unsupported(String),

    /// Shared snapshot could not be written
    #[error("Storage error: {0}")]
    Storage(#[from] shell_storage::StorageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type BridgeResult<T> = Result<T, BridgeError>;
