use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{FeedItemEntity, FeedKind},
    dto::{format_system_time, team::TeamSummary, user::PlayerRef, validation::validate_not_blank},
};

/// Default number of items returned by the latest-feed query.
pub const DEFAULT_FEED_LIMIT: usize = 50;
/// Default number of items returned by the per-kind query.
pub const DEFAULT_KIND_LIMIT: usize = 20;
pub const MAX_FEED_LIMIT: usize = 200;

#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct FeedQuery {
    /// Maximum number of items to return.
    #[validate(range(min = 1, max = 200))]
    pub limit: Option<usize>,
}

/// User-authored post. Only `info` and `powerup` may be posted directly.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PostFeedItemRequest {
    pub kind: FeedKind,
    #[validate(length(min = 1, max = 500), custom(function = "validate_not_blank"))]
    pub message: String,
    #[serde(default)]
    #[validate(url)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub player_id: Option<Uuid>,
    #[serde(default)]
    pub team_id: Option<Uuid>,
    #[serde(default)]
    pub target_team_id: Option<Uuid>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeedItemResponse {
    pub id: Uuid,
    pub kind: FeedKind,
    pub message: String,
    pub timestamp: String,
    pub player_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub target_team_id: Option<Uuid>,
    pub media_url: Option<String>,
}

impl From<FeedItemEntity> for FeedItemResponse {
    fn from(item: FeedItemEntity) -> Self {
        Self {
            id: item.id,
            kind: item.kind,
            message: item.message,
            timestamp: format_system_time(item.timestamp),
            player_id: item.player_id,
            team_id: item.team_id,
            target_team_id: item.target_team_id,
            media_url: item.media_url,
        }
    }
}

/// Feed item with its soft references resolved for display.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrichedFeedItem {
    #[serde(flatten)]
    pub item: FeedItemResponse,
    pub player: Option<PlayerRef>,
    pub team: Option<TeamSummary>,
    pub target_team: Option<TeamSummary>,
}
