use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    dao::models::{FeedItemEntity, PowerupEntity, ScoreEntity},
    dto::{
        feed::FeedItemResponse,
        sse::{
            FeedItemEvent, PowerupPlayedEvent, ScoreUpdatedEvent, ServerEvent,
            SnakeTransferredEvent, SystemStatus, TeamCreatedEvent,
        },
        team::TeamSummary,
    },
    state::SharedState,
};

const EVENT_FEED_ITEM: &str = "feed.item";
const EVENT_SCORE_UPDATED: &str = "score.updated";
const EVENT_SNAKE_TRANSFERRED: &str = "snake.transferred";
const EVENT_TEAM_CREATED: &str = "team.created";
const EVENT_POWERUP_PLAYED: &str = "powerup.played";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast a committed feed item.
pub fn broadcast_feed_item(state: &SharedState, item: &FeedItemEntity) {
    let payload = FeedItemEvent(FeedItemResponse::from(item.clone()));
    send_public_event(state, EVENT_FEED_ITEM, &payload);
}

/// Broadcast a score status change so leaderboards and approval queues refresh.
pub fn broadcast_score_updated(state: &SharedState, score: &ScoreEntity) {
    let payload = ScoreUpdatedEvent {
        score_id: score.id,
        player_id: score.player_id,
        team_id: score.team_id,
        hole: score.hole,
        status: score.status,
    };
    send_public_event(state, EVENT_SCORE_UPDATED, &payload);
}

/// Tell clients who holds the snake now.
pub fn broadcast_snake_transferred(state: &SharedState, previous: Option<Uuid>, new_holder: Uuid) {
    let payload = SnakeTransferredEvent {
        previous_holder_id: previous,
        new_holder_id: new_holder,
    };
    send_public_event(state, EVENT_SNAKE_TRANSFERRED, &payload);
}

/// Broadcast the creation of a new team to both streams.
pub fn broadcast_team_created(state: &SharedState, team: TeamSummary) {
    let payload = TeamCreatedEvent { team };
    send_public_event(state, EVENT_TEAM_CREATED, &payload);
    send_admin_event(state, EVENT_TEAM_CREATED, &payload);
}

/// Announce a played power-up on both streams.
pub fn broadcast_powerup_played(state: &SharedState, powerup: &PowerupEntity, target_team_id: Uuid) {
    let payload = PowerupPlayedEvent {
        powerup_id: powerup.id,
        kind: powerup.kind,
        user_id: powerup.user_id,
        target_team_id,
    };
    send_public_event(state, EVENT_POWERUP_PLAYED, &payload);
    send_admin_event(state, EVENT_POWERUP_PLAYED, &payload);
}

/// Broadcast the degraded flag to both streams.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    let payload = SystemStatus { degraded };
    send_public_event(state, EVENT_SYSTEM_STATUS, &payload);
    send_admin_event(state, EVENT_SYSTEM_STATUS, &payload);
}

/// Forward every degraded-mode change to SSE subscribers until the state is dropped.
pub fn spawn_status_forwarder(state: SharedState) -> tokio::task::JoinHandle<()> {
    let mut watcher = state.degraded_watcher();
    tokio::spawn(async move {
        while watcher.changed().await.is_ok() {
            let degraded = *watcher.borrow_and_update();
            debug!(degraded, "storage status changed");
            broadcast_system_status(&state, degraded);
        }
    })
}

fn send_public_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.public_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize public SSE payload"),
    }
}

fn send_admin_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.admin_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize admin SSE payload"),
    }
}
