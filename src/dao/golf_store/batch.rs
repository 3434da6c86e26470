use uuid::Uuid;

use crate::dao::models::{FeedItemEntity, PowerupEntity, ScoreEntity, TeamEntity, UserEntity};

/// Every record a single mutation writes.
///
/// [`GolfStore::commit`](super::GolfStore::commit) applies the whole batch or
/// nothing, so a failed mutation never leaves a score approved without its
/// feed items or a snake moved without its announcement.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    /// New teams. Names must be unique.
    pub teams: Vec<TeamEntity>,
    /// Users inserted or replaced by id.
    pub users: Vec<UserEntity>,
    /// Scores inserted or replaced by id.
    pub scores: Vec<ScoreEntity>,
    /// Power-ups inserted or replaced by id.
    pub powerups: Vec<PowerupEntity>,
    /// Feed items appended in order.
    pub feed_items: Vec<FeedItemEntity>,
    /// New snake holder when the mutation moves the snake.
    pub snake_holder: Option<Uuid>,
}

impl WriteBatch {
    /// Empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when committing would write nothing.
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
            && self.users.is_empty()
            && self.scores.is_empty()
            && self.powerups.is_empty()
            && self.feed_items.is_empty()
            && self.snake_holder.is_none()
    }
}
