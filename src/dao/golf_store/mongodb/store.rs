use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, ClientSession, Collection, Database, IndexModel,
    bson::{Document, doc},
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        FEED_COLLECTION, MongoFeedDocument, MongoPowerupDocument, MongoScoreDocument,
        MongoSnakeDocument, MongoTeamDocument, MongoUserDocument, POWERUP_COLLECTION,
        SCORE_COLLECTION, SINGLETON_COLLECTION, SNAKE_SINGLETON_ID, TEAM_COLLECTION,
        USER_COLLECTION, doc_id,
    },
};
use crate::dao::{
    golf_store::{GolfStore, WriteBatch},
    models::{
        FeedItemEntity, FeedKind, PowerupEntity, PowerupStatus, ScoreEntity, ScoreStatus,
        TeamEntity, UserEntity,
    },
    storage::StorageResult,
};

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone)]
pub struct MongoGolfStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoGolfStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let indexes: [(&'static str, &'static str, Document, bool); 6] = [
            (TEAM_COLLECTION, "team_name_idx", doc! {"name": 1}, true),
            (USER_COLLECTION, "user_team_idx", doc! {"team_id": 1}, false),
            (
                SCORE_COLLECTION,
                "score_player_hole_idx",
                doc! {"player_id": 1, "hole": 1},
                true,
            ),
            (
                SCORE_COLLECTION,
                "score_team_status_idx",
                doc! {"team_id": 1, "status": 1},
                false,
            ),
            (
                POWERUP_COLLECTION,
                "powerup_user_status_idx",
                doc! {"user_id": 1, "status": 1},
                false,
            ),
            (
                FEED_COLLECTION,
                "feed_timestamp_idx",
                doc! {"timestamp_nanos": -1},
                false,
            ),
        ];

        let database = self.database().await;
        for (collection, name, keys, unique) in indexes {
            let model = IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .name(Some(name.to_owned()))
                        .unique(Some(unique))
                        .build(),
                )
                .build();

            database
                .collection::<Document>(collection)
                .create_index(model)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection,
                    index: name,
                    source,
                })?;
        }

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        let guard = self.inner.state.read().await;
        guard.database.collection::<T>(name)
    }

    async fn find_one<D, E>(&self, collection: &'static str, filter: Document) -> MongoResult<Option<E>>
    where
        D: DeserializeOwned + Send + Sync,
        E: TryFrom<D, Error = MongoDaoError>,
    {
        self.collection::<D>(collection)
            .await
            .find_one(filter)
            .await
            .map_err(|source| MongoDaoError::Read { collection, source })?
            .map(E::try_from)
            .transpose()
    }

    async fn find_many<D, E>(
        &self,
        collection: &'static str,
        filter: Document,
        sort: Document,
        limit: Option<i64>,
    ) -> MongoResult<Vec<E>>
    where
        D: DeserializeOwned + Send + Sync,
        E: TryFrom<D, Error = MongoDaoError>,
    {
        let handle = self.collection::<D>(collection).await;
        let mut find = handle.find(filter).sort(sort);
        if let Some(limit) = limit {
            find = find.limit(limit);
        }

        let documents: Vec<D> = find
            .await
            .map_err(|source| MongoDaoError::Read { collection, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Read { collection, source })?;

        documents.into_iter().map(E::try_from).collect()
    }

    async fn client(&self) -> Client {
        let guard = self.inner.state.read().await;
        guard.client.clone()
    }

    /// Apply `batch` inside one multi-document transaction.
    ///
    /// Needs a replica set (a single-node one is enough); standalone servers
    /// refuse transactions and every mutation fails with `Unavailable`.
    async fn commit(&self, batch: WriteBatch) -> MongoResult<()> {
        let mut session = self
            .client()
            .await
            .start_session()
            .await
            .map_err(|source| MongoDaoError::Transaction {
                stage: "start_session",
                source,
            })?;
        session
            .start_transaction()
            .await
            .map_err(|source| MongoDaoError::Transaction {
                stage: "start_transaction",
                source,
            })?;

        if let Err(err) = self.write_batch(&mut session, batch).await {
            if let Err(abort) = session.abort_transaction().await {
                warn!(error = %abort, "failed to abort MongoDB transaction");
            }
            return Err(err);
        }

        session
            .commit_transaction()
            .await
            .map_err(|source| MongoDaoError::Transaction {
                stage: "commit_transaction",
                source,
            })
    }

    async fn write_batch(&self, session: &mut ClientSession, batch: WriteBatch) -> MongoResult<()> {
        let teams = self.collection::<MongoTeamDocument>(TEAM_COLLECTION).await;
        for team in batch.teams {
            let name = team.name.clone();
            teams
                .insert_one(MongoTeamDocument::from(team))
                .session(&mut *session)
                .await
                .map_err(|source| {
                    if is_duplicate_key(&source) {
                        MongoDaoError::DuplicateTeam { name }
                    } else {
                        MongoDaoError::Write {
                            collection: TEAM_COLLECTION,
                            source,
                        }
                    }
                })?;
        }

        for user in batch.users {
            let id = user.id;
            self.replace_in(session, USER_COLLECTION, id, MongoUserDocument::from(user))
                .await?;
        }
        for score in batch.scores {
            let id = score.id;
            self.replace_in(session, SCORE_COLLECTION, id, MongoScoreDocument::from(score))
                .await?;
        }
        for powerup in batch.powerups {
            let id = powerup.id;
            self.replace_in(session, POWERUP_COLLECTION, id, MongoPowerupDocument::from(powerup))
                .await?;
        }

        if !batch.feed_items.is_empty() {
            let documents: Vec<MongoFeedDocument> =
                batch.feed_items.into_iter().map(Into::into).collect();
            self.collection::<MongoFeedDocument>(FEED_COLLECTION)
                .await
                .insert_many(documents)
                .session(&mut *session)
                .await
                .map_err(|source| MongoDaoError::Write {
                    collection: FEED_COLLECTION,
                    source,
                })?;
        }

        if let Some(holder) = batch.snake_holder {
            self.collection::<MongoSnakeDocument>(SINGLETON_COLLECTION)
                .await
                .update_one(
                    doc! {"_id": SNAKE_SINGLETON_ID},
                    doc! {"$set": {"holder": holder.to_string()}},
                )
                .upsert(true)
                .session(&mut *session)
                .await
                .map_err(|source| MongoDaoError::Write {
                    collection: SINGLETON_COLLECTION,
                    source,
                })?;
        }

        Ok(())
    }

    async fn replace_in<D>(
        &self,
        session: &mut ClientSession,
        collection: &'static str,
        id: Uuid,
        document: D,
    ) -> MongoResult<()>
    where
        D: Serialize + Send + Sync,
    {
        self.collection::<D>(collection)
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .session(&mut *session)
            .await
            .map_err(|source| MongoDaoError::Write { collection, source })?;
        Ok(())
    }

    async fn snake_holder(&self) -> MongoResult<Option<Uuid>> {
        let current = self
            .collection::<MongoSnakeDocument>(SINGLETON_COLLECTION)
            .await
            .find_one(doc! {"_id": SNAKE_SINGLETON_ID})
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: SINGLETON_COLLECTION,
                source,
            })?;

        match current {
            Some(document) => document.holder(),
            None => Ok(None),
        }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY_CODE
    )
}

fn status_filter(mut filter: Document, status: Option<&'static str>) -> Document {
    if let Some(status) = status {
        filter.insert("status", status);
    }
    filter
}

impl GolfStore for MongoGolfStore {
    fn commit(&self, batch: WriteBatch) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.commit(batch).await.map_err(Into::into) })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_one::<MongoTeamDocument, TeamEntity>(TEAM_COLLECTION, doc_id(id))
                .await
                .map_err(Into::into)
        })
    }

    fn find_team_by_name(
        &self,
        name: String,
    ) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_one::<MongoTeamDocument, TeamEntity>(TEAM_COLLECTION, doc! {"name": name})
                .await
                .map_err(Into::into)
        })
    }

    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<MongoTeamDocument, TeamEntity>(
                    TEAM_COLLECTION,
                    doc! {},
                    doc! {"created_at": 1, "name": 1},
                    None,
                )
                .await
                .map_err(Into::into)
        })
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_one::<MongoUserDocument, UserEntity>(USER_COLLECTION, doc_id(id))
                .await
                .map_err(Into::into)
        })
    }

    fn list_team_members(
        &self,
        team_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<MongoUserDocument, UserEntity>(
                    USER_COLLECTION,
                    doc! {"team_id": team_id.to_string()},
                    doc! {"created_at": 1},
                    None,
                )
                .await
                .map_err(Into::into)
        })
    }

    fn snake_holder(&self) -> BoxFuture<'static, StorageResult<Option<Uuid>>> {
        let store = self.clone();
        Box::pin(async move { store.snake_holder().await.map_err(Into::into) })
    }

    fn find_score(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ScoreEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_one::<MongoScoreDocument, ScoreEntity>(SCORE_COLLECTION, doc_id(id))
                .await
                .map_err(Into::into)
        })
    }

    fn find_score_by_player_hole(
        &self,
        player_id: Uuid,
        hole: u8,
    ) -> BoxFuture<'static, StorageResult<Option<ScoreEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_one::<MongoScoreDocument, ScoreEntity>(
                    SCORE_COLLECTION,
                    doc! {"player_id": player_id.to_string(), "hole": i32::from(hole)},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn list_team_scores(
        &self,
        team_id: Uuid,
        status: Option<ScoreStatus>,
    ) -> BoxFuture<'static, StorageResult<Vec<ScoreEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<MongoScoreDocument, ScoreEntity>(
                    SCORE_COLLECTION,
                    status_filter(
                        doc! {"team_id": team_id.to_string()},
                        status.map(ScoreStatus::as_str),
                    ),
                    doc! {"updated_at": 1},
                    None,
                )
                .await
                .map_err(Into::into)
        })
    }

    fn list_player_scores(
        &self,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ScoreEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<MongoScoreDocument, ScoreEntity>(
                    SCORE_COLLECTION,
                    doc! {"player_id": player_id.to_string()},
                    doc! {"hole": 1},
                    None,
                )
                .await
                .map_err(Into::into)
        })
    }

    fn find_powerup(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PowerupEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_one::<MongoPowerupDocument, PowerupEntity>(POWERUP_COLLECTION, doc_id(id))
                .await
                .map_err(Into::into)
        })
    }

    fn list_user_powerups(
        &self,
        user_id: Uuid,
        status: Option<PowerupStatus>,
    ) -> BoxFuture<'static, StorageResult<Vec<PowerupEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<MongoPowerupDocument, PowerupEntity>(
                    POWERUP_COLLECTION,
                    status_filter(
                        doc! {"user_id": user_id.to_string()},
                        status.map(PowerupStatus::as_str),
                    ),
                    doc! {"kind": 1},
                    None,
                )
                .await
                .map_err(Into::into)
        })
    }

    fn list_powerups(&self) -> BoxFuture<'static, StorageResult<Vec<PowerupEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<MongoPowerupDocument, PowerupEntity>(
                    POWERUP_COLLECTION,
                    doc! {},
                    doc! {"user_id": 1, "kind": 1},
                    None,
                )
                .await
                .map_err(Into::into)
        })
    }

    fn latest_feed(
        &self,
        limit: usize,
        kind: Option<FeedKind>,
    ) -> BoxFuture<'static, StorageResult<Vec<FeedItemEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut filter = doc! {};
            if let Some(kind) = kind {
                filter.insert("kind", kind.as_str());
            }
            store
                .find_many::<MongoFeedDocument, FeedItemEntity>(
                    FEED_COLLECTION,
                    filter,
                    doc! {"timestamp_nanos": -1},
                    Some(i64::try_from(limit).unwrap_or(i64::MAX)),
                )
                .await
                .map_err(Into::into)
        })
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
