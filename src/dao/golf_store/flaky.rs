//! In-memory store whose commits can be told to fail, for error-path tests.

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    golf_store::{GolfStore, MemoryGolfStore, WriteBatch},
    models::{
        FeedItemEntity, FeedKind, PowerupEntity, PowerupStatus, ScoreEntity, ScoreStatus,
        TeamEntity, UserEntity,
    },
    storage::{StorageError, StorageResult},
};

/// Rejects any batch carrying feed items while `fail_feed_writes(true)` is set.
#[derive(Clone, Default)]
pub(crate) struct FlakyFeedStore {
    inner: MemoryGolfStore,
    fail_feed: Arc<AtomicBool>,
}

impl FlakyFeedStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_feed_writes(&self, fail: bool) {
        self.fail_feed.store(fail, Ordering::SeqCst);
    }
}

impl GolfStore for FlakyFeedStore {
    fn commit(&self, batch: WriteBatch) -> BoxFuture<'static, StorageResult<()>> {
        if self.fail_feed.load(Ordering::SeqCst) && !batch.feed_items.is_empty() {
            return Box::pin(async {
                Err(StorageError::unavailable(
                    "feed write failed".into(),
                    io::Error::other("feed collection rejected the write"),
                ))
            });
        }
        self.inner.commit(batch)
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        self.inner.find_team(id)
    }

    fn find_team_by_name(
        &self,
        name: String,
    ) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        self.inner.find_team_by_name(name)
    }

    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        self.inner.list_teams()
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        self.inner.find_user(id)
    }

    fn list_team_members(
        &self,
        team_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        self.inner.list_team_members(team_id)
    }

    fn snake_holder(&self) -> BoxFuture<'static, StorageResult<Option<Uuid>>> {
        self.inner.snake_holder()
    }

    fn find_score(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ScoreEntity>>> {
        self.inner.find_score(id)
    }

    fn find_score_by_player_hole(
        &self,
        player_id: Uuid,
        hole: u8,
    ) -> BoxFuture<'static, StorageResult<Option<ScoreEntity>>> {
        self.inner.find_score_by_player_hole(player_id, hole)
    }

    fn list_team_scores(
        &self,
        team_id: Uuid,
        status: Option<ScoreStatus>,
    ) -> BoxFuture<'static, StorageResult<Vec<ScoreEntity>>> {
        self.inner.list_team_scores(team_id, status)
    }

    fn list_player_scores(
        &self,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ScoreEntity>>> {
        self.inner.list_player_scores(player_id)
    }

    fn find_powerup(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PowerupEntity>>> {
        self.inner.find_powerup(id)
    }

    fn list_user_powerups(
        &self,
        user_id: Uuid,
        status: Option<PowerupStatus>,
    ) -> BoxFuture<'static, StorageResult<Vec<PowerupEntity>>> {
        self.inner.list_user_powerups(user_id, status)
    }

    fn list_powerups(&self) -> BoxFuture<'static, StorageResult<Vec<PowerupEntity>>> {
        self.inner.list_powerups()
    }

    fn latest_feed(
        &self,
        limit: usize,
        kind: Option<FeedKind>,
    ) -> BoxFuture<'static, StorageResult<Vec<FeedItemEntity>>> {
        self.inner.latest_feed(limit, kind)
    }

    fn backend_name(&self) -> &'static str {
        "flaky-memory"
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.health_check()
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.try_reconnect()
    }
}
