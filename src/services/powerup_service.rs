//! One-shot sabotage power-ups.

use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{golf_store::WriteBatch, models::PowerupStatus},
    dto::powerup::{PowerupOverview, PowerupResponse, ResetPowerupsResponse, UsePowerupResponse},
    error::ServiceError,
    services::{feed_service, sse_events, team_service, user_service, writes},
    state::{SharedState, feed::FeedEvent},
};

/// Play a power-up against another team.
///
/// Nothing is written when the power-up was already played or targets the
/// owner's own team. The status flip commits with its sabotage feed item.
pub async fn use_powerup(
    state: &SharedState,
    powerup_id: Uuid,
    target_team_id: Uuid,
) -> Result<UsePowerupResponse, ServiceError> {
    let store = state.require_store().await?;
    state
        .run_mutation("use_powerup", || async {
            let mut powerup = store
                .find_powerup(powerup_id)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("power-up `{powerup_id}` not found"))
                })?;
            if powerup.status != PowerupStatus::Available {
                return Err(ServiceError::InvalidState(format!(
                    "power-up `{powerup_id}` was already played"
                )));
            }

            let owner = user_service::load_user(&store, powerup.user_id).await?;
            let team = team_service::load_team(&store, owner.team_id).await?;
            let target = team_service::load_team(&store, target_team_id).await?;
            if target.id == team.id {
                return Err(ServiceError::InvalidState(
                    "a power-up cannot target your own team".into(),
                ));
            }

            powerup.status = PowerupStatus::Played;
            powerup.used_at = Some(SystemTime::now());
            powerup.target_team_id = Some(target.id);

            let event = FeedEvent::Sabotage {
                kind: powerup.kind,
                player_id: owner.id,
                player_name: owner.name,
                team_id: team.id,
                team_name: team.name,
                target_team_id: target.id,
                target_team_name: target.name,
            };
            let mut batch = WriteBatch::new();
            batch.powerups.push(powerup.clone());
            let item = feed_service::stage(&mut batch, event);
            writes::commit(state, &store, batch).await?;
            sse_events::broadcast_powerup_played(state, &powerup, target.id);
            info!(
                powerup_id = %powerup.id,
                kind = ?powerup.kind,
                target_team_id = %target.id,
                "power-up played"
            );

            Ok(UsePowerupResponse {
                success: true,
                message: item.message,
            })
        })
        .await
}

/// Power-ups a user can still play.
pub async fn get_user_powerups(
    state: &SharedState,
    user_id: Uuid,
) -> Result<Vec<PowerupResponse>, ServiceError> {
    let store = state.require_store().await?;
    let powerups = store
        .list_user_powerups(user_id, Some(PowerupStatus::Available))
        .await?;
    Ok(powerups.into_iter().map(PowerupResponse::from).collect())
}

/// Every power-up with its owner and the owner's team.
pub async fn get_all_powerups(state: &SharedState) -> Result<Vec<PowerupOverview>, ServiceError> {
    let store = state.require_store().await?;
    let powerups = store.list_powerups().await?;

    let mut overview = Vec::with_capacity(powerups.len());
    for powerup in powerups {
        let user = store.find_user(powerup.user_id).await?;
        let team = match &user {
            Some(user) => store.find_team(user.team_id).await?,
            None => None,
        };
        overview.push(PowerupOverview {
            powerup: powerup.into(),
            user: user.map(Into::into),
            team: team.map(Into::into),
        });
    }
    Ok(overview)
}

/// Put every played power-up back in play.
pub async fn reset_all_powerups(state: &SharedState) -> Result<ResetPowerupsResponse, ServiceError> {
    let store = state.require_store().await?;
    state
        .run_mutation("reset_all_powerups", || async {
            let mut batch = WriteBatch::new();
            for mut powerup in store.list_powerups().await? {
                if powerup.status == PowerupStatus::Available {
                    continue;
                }
                powerup.status = PowerupStatus::Available;
                powerup.used_at = None;
                powerup.target_team_id = None;
                batch.powerups.push(powerup);
            }
            let reset_count = batch.powerups.len();

            feed_service::stage(&mut batch, FeedEvent::powerups_reset());
            writes::commit(state, &store, batch).await?;
            info!(reset_count, "power-ups reset");

            Ok(ResetPowerupsResponse {
                success: true,
                reset_count,
            })
        })
        .await
}
