//! TOML-based DiscussionRepository implementation.
//!
//! One file per discussion:
//!
//! ```text
//! discussions/
//! ├── <discussion-id-1>.toml
//! └── <discussion-id-2>.toml
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use roundtable_core::discussion::{Discussion, DiscussionRepository, Turn};
use roundtable_core::error::{Result, RoundtableError};

use crate::paths::RoundtablePaths;
use crate::storage::AtomicTomlFile;

pub struct TomlDiscussionRepository {
    dir: PathBuf,
}

impl TomlDiscussionRepository {
    /// Creates a repository rooted at `dir`, creating the directory.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn from_paths(paths: &RoundtablePaths) -> Result<Self> {
        Self::new(paths.discussions_dir())
    }

    fn file(&self, discussion_id: &str) -> Result<AtomicTomlFile<Discussion>> {
        let valid = !discussion_id.is_empty()
            && discussion_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(RoundtableError::validation(format!(
                "Invalid discussion id '{}'",
                discussion_id
            )));
        }
        Ok(AtomicTomlFile::new(
            self.dir.join(format!("{}.toml", discussion_id)),
        ))
    }

    /// Applies `f` to a stored discussion under the file lock.
    async fn modify<F>(&self, discussion_id: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut Discussion) + Send + 'static,
    {
        let file = self.file(discussion_id)?;
        let id = discussion_id.to_string();
        let found = tokio::task::spawn_blocking(move || {
            file.update(|data| match data {
                Some(discussion) => {
                    f(discussion);
                    discussion.updated_at = Utc::now().to_rfc3339();
                    Ok(true)
                }
                None => Ok(false),
            })
        })
        .await
        .map_err(|e| RoundtableError::internal(format!("Storage task failed: {}", e)))??;

        if found {
            Ok(())
        } else {
            Err(RoundtableError::not_found("Discussion", id))
        }
    }
}

#[async_trait]
impl DiscussionRepository for TomlDiscussionRepository {
    async fn find_by_id(&self, discussion_id: &str) -> Result<Option<Discussion>> {
        let file = self.file(discussion_id)?;
        let loaded = tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| RoundtableError::internal(format!("Storage task failed: {}", e)))??;
        Ok(loaded)
    }

    async fn save(&self, discussion: &Discussion) -> Result<()> {
        let file = self.file(&discussion.id)?;
        let discussion = discussion.clone();
        tokio::task::spawn_blocking(move || file.save(&discussion))
            .await
            .map_err(|e| RoundtableError::internal(format!("Storage task failed: {}", e)))??;
        Ok(())
    }

    async fn delete(&self, discussion_id: &str) -> Result<()> {
        let file = self.file(discussion_id)?;
        file.remove()?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Discussion>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut discussions = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            let file = AtomicTomlFile::<Discussion>::new(path.clone());
            match tokio::task::spawn_blocking(move || file.load()).await {
                Ok(Ok(Some(discussion))) => discussions.push(discussion),
                Ok(Ok(None)) => {}
                Ok(Err(e)) => tracing::warn!("Skipping unreadable discussion file {:?}: {}", path, e),
                Err(e) => tracing::warn!("Storage task failed for {:?}: {}", path, e),
            }
        }

        discussions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(discussions)
    }

    async fn append_turn(&self, discussion_id: &str, turn: &Turn) -> Result<()> {
        let turn = turn.clone();
        self.modify(discussion_id, move |discussion| discussion.turns.push(turn))
            .await
    }

    async fn clear_turns(&self, discussion_id: &str) -> Result<()> {
        self.modify(discussion_id, |discussion| discussion.turns.clear())
            .await
    }
}
