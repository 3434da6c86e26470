use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{PowerupEntity, PowerupKind, PowerupStatus},
    dto::{format_system_time, team::TeamSummary, user::PlayerRef},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UsePowerupRequest {
    pub target_team_id: Uuid,
}

/// Outcome of playing a power-up.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UsePowerupResponse {
    pub success: bool,
    /// Feed message announcing the sabotage.
    pub message: String,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PowerupResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: PowerupKind,
    pub status: PowerupStatus,
    pub used_at: Option<String>,
    pub target_team_id: Option<Uuid>,
}

impl From<PowerupEntity> for PowerupResponse {
    fn from(powerup: PowerupEntity) -> Self {
        Self {
            id: powerup.id,
            user_id: powerup.user_id,
            kind: powerup.kind,
            status: powerup.status,
            used_at: powerup.used_at.map(format_system_time),
            target_team_id: powerup.target_team_id,
        }
    }
}

/// Power-up with its owner and the owner's team, for the organizer view.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PowerupOverview {
    #[serde(flatten)]
    pub powerup: PowerupResponse,
    pub user: Option<PlayerRef>,
    pub team: Option<TeamSummary>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResetPowerupsResponse {
    pub success: bool,
    /// Number of power-ups set back to available.
    pub reset_count: usize,
}
