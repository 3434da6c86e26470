use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// Representation of a team stored in persistence and shared across layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamEntity {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Display name chosen for the team (unique).
    pub name: String,
    /// CSS color used by the frontends (e.g. `#d63384`).
    pub color: String,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

/// Role held by a player inside their team.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Can approve, reject and promote within their team.
    Captain,
    /// Regular team member.
    Player,
}

/// Registered player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Stable identifier for the user.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Playing handicap.
    pub handicap: u32,
    /// Team the user registered with.
    pub team_id: Uuid,
    /// Public URL of the user's avatar, if any.
    pub avatar_url: Option<String>,
    /// Role inside the team.
    pub role: Role,
    /// Registration timestamp.
    pub created_at: SystemTime,
}

/// Lifecycle status of a submitted score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoreStatus {
    /// Waiting for a captain decision.
    Pending,
    /// Counted in every aggregate.
    Approved,
    /// Excluded from aggregates until resubmitted.
    Rejected,
}

impl ScoreStatus {
    /// Serialized form, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreStatus::Pending => "pending",
            ScoreStatus::Approved => "approved",
            ScoreStatus::Rejected => "rejected",
        }
    }
}

/// Per-hole score of a player. Unique per `(player_id, hole)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreEntity {
    /// Stable identifier for the score.
    pub id: Uuid,
    /// Player who played the hole.
    pub player_id: Uuid,
    /// Team of the player at submission time.
    pub team_id: Uuid,
    /// Hole number.
    pub hole: u8,
    /// Gross strokes.
    pub strokes: u32,
    /// Putts taken on the green.
    pub putts: u32,
    /// Par of the hole at submission time.
    pub par: u32,
    /// Stroke index of the hole at submission time.
    pub hole_index: u8,
    /// Gross strokes minus handicap shots received.
    pub net_score: i32,
    /// Handicap shots received on this hole.
    pub shots_received: u32,
    /// Lifecycle status.
    pub status: ScoreStatus,
    /// User who typed the score in.
    pub input_by: Uuid,
    /// Captain who approved the score.
    pub approved_by: Option<Uuid>,
    /// Approval timestamp.
    pub approved_at: Option<SystemTime>,
    /// Last time the score was written.
    pub updated_at: SystemTime,
}

/// Kinds of consumable power-ups.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PowerupKind {
    /// Do-over nightmare.
    Mulligan,
    /// Lobbed chaos.
    Grenade,
    /// A swiped club.
    ClubTheft,
}

impl PowerupKind {
    /// Every kind, in the order they are granted at registration.
    pub const ALL: [PowerupKind; 3] = [
        PowerupKind::Mulligan,
        PowerupKind::Grenade,
        PowerupKind::ClubTheft,
    ];
}

/// Status of a power-up; `Available -> Played` happens exactly once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PowerupStatus {
    /// Not used yet.
    Available,
    /// Already used against a team.
    Played,
}

impl PowerupStatus {
    /// Serialized form, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            PowerupStatus::Available => "available",
            PowerupStatus::Played => "played",
        }
    }
}

/// Power-up owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PowerupEntity {
    /// Stable identifier for the power-up.
    pub id: Uuid,
    /// Owner.
    pub user_id: Uuid,
    /// Kind of sabotage.
    pub kind: PowerupKind,
    /// Current status.
    pub status: PowerupStatus,
    /// When it was played.
    pub used_at: Option<SystemTime>,
    /// Team it was played against.
    pub target_team_id: Option<Uuid>,
}

/// Discriminant of a persisted feed item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// Gross birdie.
    Birdie,
    /// Gross eagle or better.
    Eagle,
    /// Three-putt snake transfer.
    Snake,
    /// Power-up played against a team.
    Sabotage,
    /// Informational message (joins, team creation, resets).
    Info,
    /// User-authored power-up chatter.
    Powerup,
    /// Approved score summary.
    Score,
}

impl FeedKind {
    /// Serialized form, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            FeedKind::Birdie => "birdie",
            FeedKind::Eagle => "eagle",
            FeedKind::Snake => "snake",
            FeedKind::Sabotage => "sabotage",
            FeedKind::Info => "info",
            FeedKind::Powerup => "powerup",
            FeedKind::Score => "score",
        }
    }
}

/// Append-only feed record. Never updated once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedItemEntity {
    /// Stable identifier for the item.
    pub id: Uuid,
    /// Event kind.
    pub kind: FeedKind,
    /// Rendered message.
    pub message: String,
    /// Creation timestamp; feed reads are ordered by it.
    pub timestamp: SystemTime,
    /// Player the item is about.
    pub player_id: Option<Uuid>,
    /// Team the item is about.
    pub team_id: Option<Uuid>,
    /// Team targeted by a sabotage.
    pub target_team_id: Option<Uuid>,
    /// Attached media.
    pub media_url: Option<String>,
}
