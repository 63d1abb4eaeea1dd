//! TOML-based CharacterRepository implementation.
//!
//! ```toml
//! [[character]]
//! id = "sage"
//! name = "Sage"
//!
//! [character.kind]
//! type = "generative"
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use roundtable_core::error::{Result, RoundtableError};
use roundtable_core::participant::{CharacterRepository, CharacterSource, Participant};
use serde::{Deserialize, Serialize};

use crate::paths::RoundtablePaths;
use crate::storage::AtomicTomlFile;

#[derive(Serialize, Deserialize, Debug, Default)]
struct CharacterCatalog {
    #[serde(rename = "character", default)]
    characters: Vec<Participant>,
}

/// Stores user-defined characters in a single `characters.toml`.
pub struct TomlCharacterRepository {
    path: PathBuf,
}

impl TomlCharacterRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_paths(paths: &RoundtablePaths) -> Self {
        Self::new(paths.characters_file())
    }
}

#[async_trait]
impl CharacterRepository for TomlCharacterRepository {
    async fn get_all(&self) -> Result<Vec<Participant>> {
        let file = AtomicTomlFile::<CharacterCatalog>::new(self.path.clone());
        let catalog = tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| RoundtableError::internal(format!("Storage task failed: {}", e)))??;
        Ok(catalog.map(|c| c.characters).unwrap_or_default())
    }

    async fn save_all(&self, characters: &[Participant]) -> Result<()> {
        let catalog = CharacterCatalog {
            characters: characters
                .iter()
                .cloned()
                .map(|mut c| {
                    c.source = CharacterSource::User;
                    c
                })
                .collect(),
        };
        let file = AtomicTomlFile::<CharacterCatalog>::new(self.path.clone());
        tokio::task::spawn_blocking(move || file.update(move |data| {
            *data = Some(catalog);
            Ok(true)
        }))
        .await
        .map_err(|e| RoundtableError::internal(format!("Storage task failed: {}", e)))??;
        Ok(())
    }
}
