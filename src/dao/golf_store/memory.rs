use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use dashmap::DashMap;
use futures::future::BoxFuture;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::dao::{
    golf_store::{GolfStore, WriteBatch},
    models::{
        FeedItemEntity, FeedKind, PowerupEntity, PowerupKind, PowerupStatus, ScoreEntity,
        ScoreStatus, TeamEntity, UserEntity,
    },
    storage::{StorageError, StorageResult},
};

/// Process-local store used by tests and `STORAGE_BACKEND=memory` deployments.
#[derive(Clone, Default)]
pub struct MemoryGolfStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    teams: DashMap<Uuid, TeamEntity>,
    // Held for a whole commit: checks and writes never interleave.
    writes: Mutex<()>,
    users: DashMap<Uuid, UserEntity>,
    scores: DashMap<Uuid, ScoreEntity>,
    powerups: DashMap<Uuid, PowerupEntity>,
    feed: DashMap<u64, FeedItemEntity>,
    feed_seq: AtomicU64,
    snake: Mutex<Option<Uuid>>,
}

impl MemoryGolfStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryInner {
    fn check_team_names(&self, teams: &[TeamEntity]) -> StorageResult<()> {
        for (position, team) in teams.iter().enumerate() {
            let taken = self.teams.iter().any(|entry| entry.name == team.name)
                || teams[..position].iter().any(|earlier| earlier.name == team.name);
            if taken {
                return Err(StorageError::Duplicate(format!(
                    "team `{}` already exists",
                    team.name
                )));
            }
        }
        Ok(())
    }
}

fn values<K, V>(map: &DashMap<K, V>, keep: impl Fn(&V) -> bool) -> Vec<V>
where
    K: Eq + std::hash::Hash,
    V: Clone,
{
    map.iter()
        .filter(|entry| keep(entry.value()))
        .map(|entry| entry.value().clone())
        .collect()
}

impl GolfStore for MemoryGolfStore {
    fn commit(&self, batch: WriteBatch) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let _writes = inner.writes.lock().await;
            // Every fallible check runs before the first write.
            inner.check_team_names(&batch.teams)?;

            for team in batch.teams {
                inner.teams.insert(team.id, team);
            }
            for user in batch.users {
                inner.users.insert(user.id, user);
            }
            for score in batch.scores {
                inner.scores.insert(score.id, score);
            }
            for powerup in batch.powerups {
                inner.powerups.insert(powerup.id, powerup);
            }
            for item in batch.feed_items {
                let seq = inner.feed_seq.fetch_add(1, Ordering::SeqCst);
                inner.feed.insert(seq, item);
            }
            if let Some(holder) = batch.snake_holder {
                *inner.snake.lock().await = Some(holder);
            }
            Ok(())
        })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.teams.get(&id).map(|entry| entry.clone())) })
    }

    fn find_team_by_name(
        &self,
        name: String,
    ) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            Ok(inner
                .teams
                .iter()
                .find(|entry| entry.name == name)
                .map(|entry| entry.clone()))
        })
    }

    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut teams = values(&inner.teams, |_| true);
            teams.sort_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.name.cmp(&b.name))
            });
            Ok(teams)
        })
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.users.get(&id).map(|entry| entry.clone())) })
    }

    fn list_team_members(
        &self,
        team_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut members = values(&inner.users, |user| user.team_id == team_id);
            members.sort_by_key(|user| user.created_at);
            Ok(members)
        })
    }

    fn snake_holder(&self) -> BoxFuture<'static, StorageResult<Option<Uuid>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(*inner.snake.lock().await) })
    }

    fn find_score(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ScoreEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.scores.get(&id).map(|entry| entry.clone())) })
    }

    fn find_score_by_player_hole(
        &self,
        player_id: Uuid,
        hole: u8,
    ) -> BoxFuture<'static, StorageResult<Option<ScoreEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            Ok(inner
                .scores
                .iter()
                .find(|entry| entry.player_id == player_id && entry.hole == hole)
                .map(|entry| entry.clone()))
        })
    }

    fn list_team_scores(
        &self,
        team_id: Uuid,
        status: Option<ScoreStatus>,
    ) -> BoxFuture<'static, StorageResult<Vec<ScoreEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut scores = values(&inner.scores, |score| {
                score.team_id == team_id && status.is_none_or(|wanted| score.status == wanted)
            });
            scores.sort_by_key(|score| score.updated_at);
            Ok(scores)
        })
    }

    fn list_player_scores(
        &self,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ScoreEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut scores = values(&inner.scores, |score| score.player_id == player_id);
            scores.sort_by_key(|score| score.hole);
            Ok(scores)
        })
    }

    fn find_powerup(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PowerupEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.powerups.get(&id).map(|entry| entry.clone())) })
    }

    fn list_user_powerups(
        &self,
        user_id: Uuid,
        status: Option<PowerupStatus>,
    ) -> BoxFuture<'static, StorageResult<Vec<PowerupEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut powerups = values(&inner.powerups, |powerup| {
                powerup.user_id == user_id && status.is_none_or(|wanted| powerup.status == wanted)
            });
            powerups.sort_by_key(|powerup| kind_rank(powerup.kind));
            Ok(powerups)
        })
    }

    fn list_powerups(&self) -> BoxFuture<'static, StorageResult<Vec<PowerupEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut powerups = values(&inner.powerups, |_| true);
            powerups.sort_by_key(|powerup| (powerup.user_id, kind_rank(powerup.kind)));
            Ok(powerups)
        })
    }

    fn latest_feed(
        &self,
        limit: usize,
        kind: Option<FeedKind>,
    ) -> BoxFuture<'static, StorageResult<Vec<FeedItemEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut items: Vec<(u64, FeedItemEntity)> = inner
                .feed
                .iter()
                .filter(|entry| kind.is_none_or(|wanted| entry.kind == wanted))
                .map(|entry| (*entry.key(), entry.value().clone()))
                .collect();
            items.sort_by(|a, b| b.0.cmp(&a.0));
            Ok(items.into_iter().take(limit).map(|(_, item)| item).collect())
        })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

fn kind_rank(kind: PowerupKind) -> usize {
    PowerupKind::ALL
        .iter()
        .position(|candidate| *candidate == kind)
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;

    fn team(name: &str) -> TeamEntity {
        TeamEntity {
            id: Uuid::new_v4(),
            name: name.into(),
            color: "#ffd700".into(),
            created_at: SystemTime::now(),
        }
    }

    fn feed_item(kind: FeedKind, message: &str) -> FeedItemEntity {
        FeedItemEntity {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            timestamp: SystemTime::now(),
            player_id: None,
            team_id: None,
            target_team_id: None,
            media_url: None,
        }
    }

    fn batch(edit: impl FnOnce(&mut WriteBatch)) -> WriteBatch {
        let mut batch = WriteBatch::new();
        edit(&mut batch);
        batch
    }

    #[tokio::test]
    async fn duplicate_team_names_are_refused() {
        let store = MemoryGolfStore::new();
        store
            .commit(batch(|b| b.teams.push(team("Sales Sleigh"))))
            .await
            .unwrap();
        let err = store
            .commit(batch(|b| b.teams.push(team("Sales Sleigh"))))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Duplicate(_)));
    }

    #[tokio::test]
    async fn refused_batch_writes_nothing() {
        let store = MemoryGolfStore::new();
        let refused = batch(|b| {
            b.teams.push(team("Elves"));
            b.teams.push(team("Elves"));
            b.feed_items.push(feed_item(FeedKind::Info, "welcome"));
            b.snake_holder = Some(Uuid::new_v4());
        });

        assert!(store.commit(refused).await.is_err());
        assert!(store.list_teams().await.unwrap().is_empty());
        assert!(store.latest_feed(10, None).await.unwrap().is_empty());
        assert_eq!(store.snake_holder().await.unwrap(), None);
    }

    #[tokio::test]
    async fn snake_holder_follows_the_last_commit() {
        let store = MemoryGolfStore::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        store.commit(batch(|b| b.snake_holder = Some(first))).await.unwrap();
        assert_eq!(store.snake_holder().await.unwrap(), Some(first));
        store.commit(batch(|b| b.snake_holder = Some(second))).await.unwrap();
        assert_eq!(store.snake_holder().await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn latest_feed_is_newest_first_and_filters_by_kind() {
        let store = MemoryGolfStore::new();
        store
            .commit(batch(|b| {
                b.feed_items.push(feed_item(FeedKind::Info, "one"));
                b.feed_items.push(feed_item(FeedKind::Birdie, "two"));
            }))
            .await
            .unwrap();
        store
            .commit(batch(|b| b.feed_items.push(feed_item(FeedKind::Info, "three"))))
            .await
            .unwrap();

        let all = store.latest_feed(2, None).await.unwrap();
        let messages: Vec<_> = all.iter().map(|item| item.message.as_str()).collect();
        assert_eq!(messages, ["three", "two"]);

        let infos = store.latest_feed(10, Some(FeedKind::Info)).await.unwrap();
        let messages: Vec<_> = infos.iter().map(|item| item.message.as_str()).collect();
        assert_eq!(messages, ["three", "one"]);
    }
}
