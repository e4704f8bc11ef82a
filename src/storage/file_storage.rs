use crate::{
    error::{BoardError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Bytes left as-is in snapshot file names; `.` is escaped so no name is hidden or relative
const KEY_FILENAME_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

/// File-based snapshot storage: one JSON file per key
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const STORAGE_DIR: &'static str = ".stageboard";
    const SNAPSHOTS_DIR: &'static str = "snapshots";
    const EXTENSION: &'static str = "json";

    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::STORAGE_DIR),
        }
    }

    fn snapshots_dir(&self) -> PathBuf {
        self.root_path.join(Self::SNAPSHOTS_DIR)
    }

    /// Maps a key to its file; distinct keys never share a file
    fn snapshot_file(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() {
            return Err(BoardError::StorageError("snapshot key must not be empty".to_string()));
        }
        let file_name = format!(
            "{}.{}",
            utf8_percent_encode(key, KEY_FILENAME_SET),
            Self::EXTENSION
        );
        Ok(self.snapshots_dir().join(file_name))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn save_snapshot(&self, key: &str, snapshot: &str) -> Result<()> {
        let file_path = self.snapshot_file(key)?;
        self.ensure_directory_exists(&self.snapshots_dir()).await?;

        // Replaced atomically via rename
        let tmp_path = file_path.with_extension("json.tmp");
        fs::write(&tmp_path, snapshot).await?;
        fs::rename(&tmp_path, &file_path).await?;
        Ok(())
    }

    async fn load_snapshot(&self, key: &str) -> Result<Option<String>> {
        let file_path = self.snapshot_file(key)?;

        if !file_path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&file_path).await?;
        Ok(Some(contents))
    }
}
