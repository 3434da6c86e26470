//! Social feed: system-generated events and user posts, newest first.

use std::{sync::Arc, time::SystemTime};

use crate::{
    dao::{
        golf_store::{GolfStore, WriteBatch},
        models::{FeedItemEntity, FeedKind},
    },
    dto::feed::{
        DEFAULT_FEED_LIMIT, DEFAULT_KIND_LIMIT, EnrichedFeedItem, FeedItemResponse,
        MAX_FEED_LIMIT, PostFeedItemRequest,
    },
    error::ServiceError,
    services::writes,
    state::{
        SharedState,
        feed::{FeedEvent, PostKind},
    },
};

/// Add `event` to the mutation's batch; it is broadcast once the batch commits.
pub(crate) fn stage(batch: &mut WriteBatch, event: FeedEvent) -> FeedItemEntity {
    let item = event.into_entity(SystemTime::now());
    batch.feed_items.push(item.clone());
    item
}

/// Latest feed items with players and teams resolved.
pub async fn get_latest_feed(
    state: &SharedState,
    limit: Option<usize>,
) -> Result<Vec<EnrichedFeedItem>, ServiceError> {
    let store = state.require_store().await?;
    let limit = clamp_limit(limit, DEFAULT_FEED_LIMIT);
    let items = store.latest_feed(limit, None).await?;
    enrich(&store, items).await
}

/// Latest feed items of a single kind.
pub async fn get_feed_by_type(
    state: &SharedState,
    kind: FeedKind,
    limit: Option<usize>,
) -> Result<Vec<FeedItemResponse>, ServiceError> {
    let store = state.require_store().await?;
    let limit = clamp_limit(limit, DEFAULT_KIND_LIMIT);
    let items = store.latest_feed(limit, Some(kind)).await?;
    Ok(items.into_iter().map(FeedItemResponse::from).collect())
}

/// Append a user-authored item. Only `info` and `powerup` can be posted directly.
pub async fn post_feed_item(
    state: &SharedState,
    request: PostFeedItemRequest,
) -> Result<FeedItemResponse, ServiceError> {
    let kind = PostKind::try_from(request.kind).map_err(|kind| {
        ServiceError::InvalidInput(format!(
            "feed items of kind `{}` are generated by the game and cannot be posted",
            kind.as_str()
        ))
    })?;
    let store = state.require_store().await?;

    let event = FeedEvent::Post {
        kind,
        message: request.message.trim().to_owned(),
        media_url: request.media_url,
        player_id: request.player_id,
        team_id: request.team_id,
        target_team_id: request.target_team_id,
    };

    let item = state
        .run_mutation("post_feed_item", || async {
            let mut batch = WriteBatch::new();
            let item = stage(&mut batch, event);
            writes::commit(state, &store, batch).await?;
            Ok(item)
        })
        .await?;
    Ok(item.into())
}

fn clamp_limit(limit: Option<usize>, default: usize) -> usize {
    limit.unwrap_or(default).clamp(1, MAX_FEED_LIMIT)
}

// Soft references: a missing player or team leaves the field empty.
async fn enrich(
    store: &Arc<dyn GolfStore>,
    items: Vec<FeedItemEntity>,
) -> Result<Vec<EnrichedFeedItem>, ServiceError> {
    let mut enriched = Vec::with_capacity(items.len());
    for item in items {
        let player = match item.player_id {
            Some(id) => store.find_user(id).await?.map(Into::into),
            None => None,
        };
        let team = match item.team_id {
            Some(id) => store.find_team(id).await?.map(Into::into),
            None => None,
        };
        let target_team = match item.target_team_id {
            Some(id) => store.find_team(id).await?.map(Into::into),
            None => None,
        };
        enriched.push(EnrichedFeedItem {
            item: item.into(),
            player,
            team,
            target_team,
        });
    }
    Ok(enriched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, dao::golf_store::MemoryGolfStore, state::AppState};

    async fn state() -> SharedState {
        AppState::with_store(AppConfig::default(), Arc::new(MemoryGolfStore::new())).await
    }

    fn post(kind: FeedKind, message: &str) -> PostFeedItemRequest {
        PostFeedItemRequest {
            kind,
            message: message.into(),
            media_url: None,
            player_id: None,
            team_id: None,
            target_team_id: None,
        }
    }

    #[tokio::test]
    async fn posts_are_returned_newest_first_and_broadcast() {
        let state = state().await;
        let mut events = state.public_sse().subscribe();

        post_feed_item(&state, post(FeedKind::Info, "first")).await.unwrap();
        post_feed_item(&state, post(FeedKind::Powerup, "second")).await.unwrap();

        let feed = get_latest_feed(&state, None).await.unwrap();
        let messages: Vec<_> = feed.iter().map(|item| item.item.message.as_str()).collect();
        assert_eq!(messages, ["second", "first"]);

        let event = events.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some("feed.item"));
        assert!(event.data.contains("first"));
    }

    #[tokio::test]
    async fn system_kinds_cannot_be_posted() {
        let state = state().await;
        for kind in [FeedKind::Birdie, FeedKind::Snake, FeedKind::Sabotage, FeedKind::Score] {
            let err = post_feed_item(&state, post(kind, "fake")).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(_)));
        }
        assert!(get_latest_feed(&state, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn filters_by_kind_and_honours_limit() {
        let state = state().await;
        for n in 0..3 {
            post_feed_item(&state, post(FeedKind::Info, &format!("info {n}")))
                .await
                .unwrap();
        }
        post_feed_item(&state, post(FeedKind::Powerup, "zap")).await.unwrap();

        let powerups = get_feed_by_type(&state, FeedKind::Powerup, None).await.unwrap();
        assert_eq!(powerups.len(), 1);
        let infos = get_feed_by_type(&state, FeedKind::Info, Some(2)).await.unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].message, "info 2");
    }

    #[tokio::test]
    async fn reads_fail_while_degraded() {
        let state = AppState::new(AppConfig::default());
        assert!(matches!(
            get_latest_feed(&state, None).await,
            Err(ServiceError::Degraded)
        ));
    }
}
