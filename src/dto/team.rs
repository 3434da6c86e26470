use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{Role, TeamEntity, UserEntity},
    dto::{
        format_system_time,
        user::UserResponse,
        validation::{validate_hex_color, validate_not_blank},
    },
    state::{
        leaderboard::TeamTotals,
        scoring::{score_relative_to_par, signed},
    },
};

/// Payload used by organizers to register a new team.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateTeamRequest {
    #[validate(length(min = 1, max = 64), custom(function = "validate_not_blank"))]
    pub name: String,
    /// CSS hex color, e.g. `#d63384`.
    #[validate(custom(function = "validate_hex_color"))]
    pub color: String,
}

/// Minimal team reference used when enriching other payloads.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct TeamSummary {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub created_at: String,
}

impl From<TeamEntity> for TeamSummary {
    fn from(team: TeamEntity) -> Self {
        Self {
            id: team.id,
            name: team.name,
            color: team.color,
            created_at: format_system_time(team.created_at),
        }
    }
}

/// Member entry of the team listing.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamMemberSummary {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub has_snake: bool,
}

impl TeamMemberSummary {
    pub fn new(user: UserEntity, snake_holder: Option<Uuid>) -> Self {
        Self {
            has_snake: snake_holder == Some(user.id),
            id: user.id,
            name: user.name,
            avatar_url: user.avatar_url,
            role: user.role,
        }
    }
}

/// Team with its gross total, as shown on the team listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamListing {
    #[serde(flatten)]
    pub team: TeamSummary,
    /// Sum of approved gross strokes.
    pub gross_total: u32,
    pub holes_played: u32,
    pub member_count: usize,
    pub members: Vec<TeamMemberSummary>,
}

/// Team with full member records.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: TeamSummary,
    pub members: Vec<UserResponse>,
    pub gross_total: u32,
    pub holes_played: u32,
}

/// Row of the net leaderboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub rank: usize,
    #[serde(flatten)]
    pub team: TeamSummary,
    pub net_total: i32,
    /// Net total against the par of the holes played.
    pub net_relative_to_par: i32,
    /// `"E"`, `"+3"` or `"-2"`.
    pub net_relative_display: String,
    pub gross_total: u32,
    pub gross_relative_to_par: i32,
    pub par_total: u32,
    pub shots_total: u32,
    pub holes_played: u32,
    pub member_count: usize,
    /// Avatars of the first members, for display.
    pub avatars: Vec<String>,
}

impl LeaderboardEntry {
    pub fn new(team: TeamEntity, totals: &TeamTotals, members: &[UserEntity]) -> Self {
        let relative = score_relative_to_par(totals.net_total, signed(totals.par_total));
        Self {
            rank: 0,
            team: team.into(),
            net_total: totals.net_total,
            net_relative_to_par: relative.relative,
            net_relative_display: relative.display(),
            gross_total: totals.gross_total,
            gross_relative_to_par: totals.gross_relative_to_par(),
            par_total: totals.par_total,
            shots_total: totals.shots_total,
            holes_played: totals.holes_played,
            member_count: members.len(),
            avatars: members
                .iter()
                .filter_map(|member| member.avatar_url.clone())
                .take(4)
                .collect(),
        }
    }
}

/// Outcome of the seeding operation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SeedTeamsResponse {
    /// False when teams already existed and nothing was created.
    pub created: bool,
    pub message: String,
    pub teams: Vec<TeamSummary>,
}
