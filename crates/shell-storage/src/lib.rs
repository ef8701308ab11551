//! Durable token persistence for the go2go shell.
//!
//! - [`KeyValueStore`]: string key-value backend (file-backed or in-memory)
//! - [`TokenStore`]: the three-entry session record on top of a backend
//! - [`TokenPair`]: access/refresh credential pair issued by the auth backend

mod file;
mod keys;
mod memory;
mod record;
mod token_store;
mod traits;

pub use file::{atomic_write, FileStore};
pub use keys::StorageKeys;
pub use memory::MemoryStore;
pub use record::TokenPair;
pub use token_store::TokenStore;
pub use traits::KeyValueStore;

use std::path::Path;
use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend refused or failed the operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Create a token store persisted to the given JSON file.
pub fn create_file_token_store(path: &Path) -> StorageResult<TokenStore> {
    let storage = FileStore::open(path)?;
    Ok(TokenStore::new(Box::new(storage)))
}

/// Create a token store that lives only as long as the process.
pub fn create_memory_token_store() -> TokenStore {
    TokenStore::new(Box::new(MemoryStore::new()))
}
