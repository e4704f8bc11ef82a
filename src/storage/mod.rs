use crate::error::Result;
use async_trait::async_trait;

#[cfg(feature = "file-storage")]
pub mod file_storage;
pub mod memory_storage;

#[cfg(feature = "file-storage")]
pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;

/// Key/value persistence for encoded board snapshots
#[async_trait]
pub trait Storage: Send + Sync {
    /// Stores a snapshot under `key`, replacing any previous one
    async fn save_snapshot(&self, key: &str, snapshot: &str) -> Result<()>;

    /// Loads the snapshot stored under `key`, if any
    async fn load_snapshot(&self, key: &str) -> Result<Option<String>>;
}
