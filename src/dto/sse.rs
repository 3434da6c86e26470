use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{PowerupKind, ScoreStatus},
    dto::{feed::FeedItemResponse, team::TeamSummary},
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Serialise `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// First event sent to the organizer stream, carrying the `X-Admin-Token` value.
pub struct AdminHandshake {
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast for every item appended to the feed.
pub struct FeedItemEvent(pub FeedItemResponse);

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever a score is submitted, approved or rejected.
pub struct ScoreUpdatedEvent {
    pub score_id: Uuid,
    pub player_id: Uuid,
    pub team_id: Uuid,
    pub hole: u8,
    pub status: ScoreStatus,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the snake changes hands.
pub struct SnakeTransferredEvent {
    pub previous_holder_id: Option<Uuid>,
    pub new_holder_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamCreatedEvent {
    pub team: TeamSummary,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a power-up is played against a team.
pub struct PowerupPlayedEvent {
    pub powerup_id: Uuid,
    pub kind: PowerupKind,
    pub user_id: Uuid,
    pub target_team_id: Uuid,
}
