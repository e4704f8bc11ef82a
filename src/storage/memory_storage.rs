use crate::{error::Result, storage::Storage};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process snapshot storage, the analogue of browser local storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn save_snapshot(&self, key: &str, snapshot: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), snapshot.to_string());
        Ok(())
    }

    async fn load_snapshot(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }
}
