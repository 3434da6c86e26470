use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{ScoreEntity, ScoreStatus},
    dto::{format_system_time, user::PlayerRef},
    state::scoring::{score_relative_to_par, signed},
};

/// Per-hole score typed in by a player or a teammate.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitScoreRequest {
    pub player_id: Uuid,
    #[validate(range(min = 1, max = 18))]
    pub hole: u8,
    #[validate(range(min = 1, max = 30))]
    pub strokes: u32,
    #[validate(range(max = 30))]
    pub putts: u32,
    /// User who entered the score.
    pub input_by: Uuid,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmitScoreResponse {
    pub score_id: Uuid,
}

/// Captain acting on a pending score.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScoreDecisionRequest {
    pub captain_id: Uuid,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScoreDecisionResponse {
    pub success: bool,
    pub status: ScoreStatus,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScoreResponse {
    pub id: Uuid,
    pub player_id: Uuid,
    pub team_id: Uuid,
    pub hole: u8,
    pub strokes: u32,
    pub putts: u32,
    pub par: u32,
    pub hole_index: u8,
    pub net_score: i32,
    pub shots_received: u32,
    /// Net result against par, e.g. `Birdie` or `+3`.
    pub net_label: String,
    pub net_emoji: String,
    pub status: ScoreStatus,
    pub input_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<String>,
    pub updated_at: String,
}

impl From<ScoreEntity> for ScoreResponse {
    fn from(score: ScoreEntity) -> Self {
        let label = score_relative_to_par(score.net_score, signed(score.par)).label;
        Self {
            id: score.id,
            player_id: score.player_id,
            team_id: score.team_id,
            hole: score.hole,
            strokes: score.strokes,
            putts: score.putts,
            par: score.par,
            hole_index: score.hole_index,
            net_score: score.net_score,
            shots_received: score.shots_received,
            net_label: label.to_string(),
            net_emoji: label.emoji().to_owned(),
            status: score.status,
            input_by: score.input_by,
            approved_by: score.approved_by,
            approved_at: score.approved_at.map(format_system_time),
            updated_at: format_system_time(score.updated_at),
        }
    }
}

/// Score with the player (and for pending scores, the submitter) resolved.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrichedScore {
    #[serde(flatten)]
    pub score: ScoreResponse,
    pub player: Option<PlayerRef>,
    pub input_by_user: Option<PlayerRef>,
}

/// Hole-by-hole approved strokes of one team member.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberScorecard {
    pub player: PlayerRef,
    pub handicap: u32,
    /// Hole number to gross strokes.
    pub holes: BTreeMap<u8, u32>,
    pub total_strokes: u32,
    pub net_total: i32,
    pub holes_played: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(hole: u8, strokes: u32) -> SubmitScoreRequest {
        SubmitScoreRequest {
            player_id: Uuid::new_v4(),
            hole,
            strokes,
            putts: 2,
            input_by: Uuid::new_v4(),
        }
    }

    #[test]
    fn hole_must_be_on_the_course() {
        assert!(request(1, 4).validate().is_ok());
        assert!(request(18, 4).validate().is_ok());
        assert!(request(0, 4).validate().is_err());
        assert!(request(19, 4).validate().is_err());
    }

    #[test]
    fn strokes_start_at_one() {
        assert!(request(5, 0).validate().is_err());
        assert!(request(5, 1).validate().is_ok());
    }

    #[test]
    fn response_labels_the_net_result() {
        let score = ScoreEntity {
            id: Uuid::new_v4(),
            player_id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            hole: 3,
            strokes: 5,
            putts: 2,
            par: 4,
            hole_index: 1,
            net_score: 3,
            shots_received: 2,
            status: ScoreStatus::Pending,
            input_by: Uuid::new_v4(),
            approved_by: None,
            approved_at: None,
            updated_at: std::time::SystemTime::now(),
        };

        let response = ScoreResponse::from(score);
        assert_eq!(response.net_label, "Birdie");
        assert_eq!(response.net_emoji, "🐦");
    }
}
