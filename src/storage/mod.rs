use crate::error::Result;
use async_trait::async_trait;

#[cfg(feature = "file-storage")]
pub mod file_store;
pub mod memory_store;

#[cfg(feature = "file-storage")]
pub use file_store::FileStore;
pub use memory_store::MemoryStore;

/// String key-value store the board and its version are persisted in
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value; `None` if the key was never set or has been removed
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a key. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;
}
