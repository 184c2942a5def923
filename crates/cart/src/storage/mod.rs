//! On-device key-value storage port and backends.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when touching on-device storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// On-device key-value storage port.
///
/// Values are opaque strings; callers own the encoding. Keys are short
/// dotted names (`mercato.cart.v1`) and are used verbatim by backends.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`. A missing key is `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value under `key`. A missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
