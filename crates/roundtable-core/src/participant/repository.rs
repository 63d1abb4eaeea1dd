//! Character repository trait.

use super::model::Participant;
use crate::error::Result;

/// Persistence for user-defined characters.
///
/// Built-in characters are not stored here; callers combine them with
/// `builtin_characters()`.
#[async_trait::async_trait]
pub trait CharacterRepository: Send + Sync {
    /// Retrieves all stored characters.
    async fn get_all(&self) -> Result<Vec<Participant>>;

    /// Replaces the stored catalogue.
    async fn save_all(&self, characters: &[Participant]) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Participant>> {
        Ok(self.get_all().await?.into_iter().find(|c| c.id == id))
    }

    /// Inserts a character or replaces the one with the same id.
    async fn upsert(&self, character: Participant) -> Result<()> {
        let mut all = self.get_all().await?;
        match all.iter_mut().find(|c| c.id == character.id) {
            Some(existing) => *existing = character,
            None => all.push(character),
        }
        self.save_all(&all).await
    }

    /// Removes a character. Returns `false` when no such id was stored.
    async fn delete(&self, id: &str) -> Result<bool> {
        let mut all = self.get_all().await?;
        let before = all.len();
        all.retain(|c| c.id != id);
        if all.len() == before {
            return Ok(false);
        }
        self.save_all(&all).await?;
        Ok(true)
    }
}
