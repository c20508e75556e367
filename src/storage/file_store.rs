use crate::{
    error::{KanbanError, Result},
    storage::KeyValueStore,
};
use async_trait::async_trait;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::fs;

/// File-based store: one file per key under `<project>/.kanban/`
pub struct FileStore {
    root_path: PathBuf,
}

impl FileStore {
    const KANBAN_DIR: &'static str = ".kanban";

    /// Creates a new FileStore for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::KANBAN_DIR),
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn key_file(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(KanbanError::StorageError(format!(
                "invalid storage key: {:?}",
                key
            )));
        }
        Ok(self.root_path.join(key))
    }

    async fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_path.exists() {
            fs::create_dir_all(&self.root_path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let file_path = self.key_file(key)?;

        match fs::read_to_string(&file_path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let file_path = self.key_file(key)?;
        self.ensure_directory_exists().await?;

        // Write to a sibling temp file first so readers never see a partial value.
        // The leading dot keeps temp names out of the valid key space.
        let tmp_path = self.root_path.join(format!(".{}.tmp", key));
        fs::write(&tmp_path, value).await?;
        fs::rename(&tmp_path, &file_path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let file_path = self.key_file(key)?;

        match fs::remove_file(&file_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
