mod batch;
#[cfg(test)]
pub(crate) mod flaky;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{
    FeedItemEntity, FeedKind, PowerupEntity, PowerupStatus, ScoreEntity, ScoreStatus, TeamEntity,
    UserEntity,
};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

pub use batch::WriteBatch;
pub use memory::MemoryGolfStore;

/// Abstraction over the record store backing the outing.
///
/// Reads go straight to the backend. Writes only happen through [`commit`],
/// one batch per mutation; the write gate in [`crate::state::AppState`]
/// keeps the reads a mutation bases its batch on stable.
///
/// [`commit`]: GolfStore::commit
pub trait GolfStore: Send + Sync {
    /// Apply every write of `batch`, or none of them.
    ///
    /// Fails with [`StorageError::Duplicate`] when a new team reuses a name.
    ///
    /// [`StorageError::Duplicate`]: crate::dao::storage::StorageError::Duplicate
    fn commit(&self, batch: WriteBatch) -> BoxFuture<'static, StorageResult<()>>;

    /// Team by id.
    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>>;
    /// Team by exact name.
    fn find_team_by_name(
        &self,
        name: String,
    ) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>>;
    /// Teams in creation order.
    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>>;

    /// User by id.
    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    /// Members of a team in registration order.
    fn list_team_members(
        &self,
        team_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>>;

    /// Current holder of the snake singleton.
    fn snake_holder(&self) -> BoxFuture<'static, StorageResult<Option<Uuid>>>;

    /// Score by id.
    fn find_score(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ScoreEntity>>>;
    /// The one score a player holds for a hole, if any.
    fn find_score_by_player_hole(
        &self,
        player_id: Uuid,
        hole: u8,
    ) -> BoxFuture<'static, StorageResult<Option<ScoreEntity>>>;
    /// Scores of a team, optionally filtered by status, oldest write first.
    fn list_team_scores(
        &self,
        team_id: Uuid,
        status: Option<ScoreStatus>,
    ) -> BoxFuture<'static, StorageResult<Vec<ScoreEntity>>>;
    /// Scores of a player ordered by hole.
    fn list_player_scores(
        &self,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ScoreEntity>>>;

    /// Power-up by id.
    fn find_powerup(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PowerupEntity>>>;
    /// Power-ups of a user, optionally filtered by status.
    fn list_user_powerups(
        &self,
        user_id: Uuid,
        status: Option<PowerupStatus>,
    ) -> BoxFuture<'static, StorageResult<Vec<PowerupEntity>>>;
    /// Every power-up, grouped by owner.
    fn list_powerups(&self) -> BoxFuture<'static, StorageResult<Vec<PowerupEntity>>>;

    /// Newest feed items first, optionally restricted to one kind.
    fn latest_feed(
        &self,
        limit: usize,
        kind: Option<FeedKind>,
    ) -> BoxFuture<'static, StorageResult<Vec<FeedItemEntity>>>;

    /// Short name of the backend, reported by the health check.
    fn backend_name(&self) -> &'static str;

    /// Cheap round trip proving the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Rebuild the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
