use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use axum_valid::Valid;

use crate::{
    dao::models::FeedKind,
    dto::feed::{EnrichedFeedItem, FeedItemResponse, FeedQuery, PostFeedItemRequest},
    error::AppError,
    services::feed_service,
    state::SharedState,
};

pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/feed", get(latest_feed).post(post_feed_item))
        .route("/feed/{kind}", get(feed_by_type))
}

#[utoipa::path(
    get,
    path = "/feed",
    tag = "feed",
    params(FeedQuery),
    responses((status = 200, description = "Newest feed items first", body = [EnrichedFeedItem]))
)]
pub async fn latest_feed(
    State(state): State<SharedState>,
    Valid(Query(query)): Valid<Query<FeedQuery>>,
) -> Result<Json<Vec<EnrichedFeedItem>>, AppError> {
    Ok(Json(
        feed_service::get_latest_feed(&state, query.limit).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/feed/{kind}",
    tag = "feed",
    params(
        ("kind" = FeedKind, Path, description = "Feed item kind"),
        FeedQuery
    ),
    responses((status = 200, description = "Newest items of one kind", body = [FeedItemResponse]))
)]
pub async fn feed_by_type(
    State(state): State<SharedState>,
    Path(kind): Path<FeedKind>,
    Valid(Query(query)): Valid<Query<FeedQuery>>,
) -> Result<Json<Vec<FeedItemResponse>>, AppError> {
    Ok(Json(
        feed_service::get_feed_by_type(&state, kind, query.limit).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/feed",
    tag = "feed",
    request_body = PostFeedItemRequest,
    responses(
        (status = 201, description = "Item appended", body = FeedItemResponse),
        (status = 400, description = "Kind reserved for game events")
    )
)]
/// Post an `info` or `powerup` message to the feed.
pub async fn post_feed_item(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<PostFeedItemRequest>>,
) -> Result<(StatusCode, Json<FeedItemResponse>), AppError> {
    let item = feed_service::post_feed_item(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}
