use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoardError>;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Stage not found: {0}")]
    StageNotFound(String),

    #[error("Task {task} is not in stage {stage}")]
    TaskNotInStage { task: String, stage: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BoardError {
    /// True for every "referenced id does not exist" failure
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TaskNotFound(_) | Self::StageNotFound(_) | Self::TaskNotInStage { .. }
        )
    }

    pub(crate) fn empty_title(what: &str) -> Self {
        Self::InvalidArgument(format!("{what} title must not be empty"))
    }
}
