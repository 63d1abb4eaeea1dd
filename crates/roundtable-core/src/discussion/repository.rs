//! Discussion repository trait.

use super::model::Discussion;
use super::turn::Turn;
use crate::error::Result;

/// Persistence for discussions and their turn logs.
///
/// `append_turn` and `clear_turns` are called from a background writer in
/// the order the turns were produced; implementations only need to apply
/// them in call order.
#[async_trait::async_trait]
pub trait DiscussionRepository: Send + Sync {
    /// Finds a discussion by id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Discussion))`: Discussion found
    /// - `Ok(None)`: No discussion with that id
    /// - `Err(RoundtableError)`: Storage failure
    async fn find_by_id(&self, discussion_id: &str) -> Result<Option<Discussion>>;

    /// Creates or replaces a discussion.
    async fn save(&self, discussion: &Discussion) -> Result<()>;

    /// Deletes a discussion. Deleting an unknown id is not an error.
    async fn delete(&self, discussion_id: &str) -> Result<()>;

    /// All stored discussions.
    async fn list_all(&self) -> Result<Vec<Discussion>>;

    /// Appends one turn to a stored discussion.
    async fn append_turn(&self, discussion_id: &str, turn: &Turn) -> Result<()>;

    /// Removes every turn of a stored discussion, keeping its roster.
    async fn clear_turns(&self, discussion_id: &str) -> Result<()>;
}
