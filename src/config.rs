use crate::domain::board::{BoardId, UserId};
use serde::{Deserialize, Serialize};

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Owner stamped on newly created tasks
    pub owner: UserId,
    /// Prefix of the storage key a board's snapshot is saved under
    pub snapshot_key_prefix: String,
    /// Indent encoded snapshots
    pub pretty_snapshots: bool,
}

impl StoreConfig {
    /// Storage key for the given board, e.g. `taskBoard-board-1`
    pub fn snapshot_key(&self, board_id: &BoardId) -> String {
        format!("{}{}", self.snapshot_key_prefix, board_id)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            owner: UserId::placeholder(),
            snapshot_key_prefix: "taskBoard-".to_string(),
            pretty_snapshots: true,
        }
    }
}
