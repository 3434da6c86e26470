use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{MongoDaoError, MongoResult};
use crate::{
    dao::models::{
        FeedItemEntity, FeedKind, PowerupEntity, PowerupKind, PowerupStatus, Role, ScoreEntity,
        ScoreStatus, TeamEntity, UserEntity,
    },
    state::{
        course::{DEFAULT_INDEX, DEFAULT_PAR},
        scoring::signed,
    },
};

pub const TEAM_COLLECTION: &str = "teams";
pub const USER_COLLECTION: &str = "users";
pub const SCORE_COLLECTION: &str = "scores";
pub const POWERUP_COLLECTION: &str = "powerups";
pub const FEED_COLLECTION: &str = "feed_items";
pub const SINGLETON_COLLECTION: &str = "singletons";
pub const SNAKE_SINGLETON_ID: &str = "snake";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTeamDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub color: String,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUserDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub handicap: i64,
    pub team_id: String,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoScoreDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub player_id: String,
    pub team_id: String,
    pub hole: i32,
    pub strokes: i64,
    pub putts: i64,
    // Scores written before handicaps were tracked lack the fields below.
    #[serde(default)]
    pub par: Option<i64>,
    #[serde(default)]
    pub hole_index: Option<i32>,
    #[serde(default)]
    pub net_score: Option<i32>,
    #[serde(default)]
    pub shots_received: Option<i64>,
    pub status: ScoreStatus,
    pub input_by: String,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime>,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPowerupDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub kind: PowerupKind,
    pub status: PowerupStatus,
    pub used_at: Option<DateTime>,
    pub target_team_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoFeedDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub kind: FeedKind,
    pub message: String,
    pub timestamp: DateTime,
    /// Nanosecond precision ordering key; `timestamp` only keeps milliseconds.
    pub timestamp_nanos: i64,
    pub player_id: Option<String>,
    pub team_id: Option<String>,
    pub target_team_id: Option<String>,
    pub media_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSnakeDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub holder: Option<String>,
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

fn parse_id(collection: &'static str, value: &str) -> MongoResult<Uuid> {
    Uuid::parse_str(value).map_err(|err| MongoDaoError::Malformed {
        collection,
        reason: format!("invalid identifier `{value}`: {err}"),
    })
}

fn parse_optional_id(collection: &'static str, value: Option<&str>) -> MongoResult<Option<Uuid>> {
    value.map(|value| parse_id(collection, value)).transpose()
}

fn to_unsigned(collection: &'static str, field: &str, value: i64) -> MongoResult<u32> {
    u32::try_from(value).map_err(|_| MongoDaoError::Malformed {
        collection,
        reason: format!("field `{field}` out of range: {value}"),
    })
}

fn to_small(collection: &'static str, field: &str, value: i32) -> MongoResult<u8> {
    u8::try_from(value).map_err(|_| MongoDaoError::Malformed {
        collection,
        reason: format!("field `{field}` out of range: {value}"),
    })
}

impl From<TeamEntity> for MongoTeamDocument {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            color: value.color,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoTeamDocument> for TeamEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoTeamDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(TEAM_COLLECTION, &value.id)?,
            name: value.name,
            color: value.color,
            created_at: value.created_at.to_system_time(),
        })
    }
}

impl From<UserEntity> for MongoUserDocument {
    fn from(value: UserEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            handicap: i64::from(value.handicap),
            team_id: value.team_id.to_string(),
            avatar_url: value.avatar_url,
            role: value.role,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoUserDocument> for UserEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoUserDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(USER_COLLECTION, &value.id)?,
            name: value.name,
            handicap: to_unsigned(USER_COLLECTION, "handicap", value.handicap)?,
            team_id: parse_id(USER_COLLECTION, &value.team_id)?,
            avatar_url: value.avatar_url,
            role: value.role,
            created_at: value.created_at.to_system_time(),
        })
    }
}

impl From<ScoreEntity> for MongoScoreDocument {
    fn from(value: ScoreEntity) -> Self {
        Self {
            id: value.id.to_string(),
            player_id: value.player_id.to_string(),
            team_id: value.team_id.to_string(),
            hole: i32::from(value.hole),
            strokes: i64::from(value.strokes),
            putts: i64::from(value.putts),
            par: Some(i64::from(value.par)),
            hole_index: Some(i32::from(value.hole_index)),
            net_score: Some(value.net_score),
            shots_received: Some(i64::from(value.shots_received)),
            status: value.status,
            input_by: value.input_by.to_string(),
            approved_by: value.approved_by.map(|id| id.to_string()),
            approved_at: value.approved_at.map(DateTime::from_system_time),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<MongoScoreDocument> for ScoreEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoScoreDocument) -> MongoResult<Self> {
        let strokes = to_unsigned(SCORE_COLLECTION, "strokes", value.strokes)?;
        let par = match value.par {
            Some(par) => to_unsigned(SCORE_COLLECTION, "par", par)?,
            None => DEFAULT_PAR,
        };
        let hole_index = match value.hole_index {
            Some(index) => to_small(SCORE_COLLECTION, "hole_index", index)?,
            None => DEFAULT_INDEX,
        };
        let shots_received = match value.shots_received {
            Some(shots) => to_unsigned(SCORE_COLLECTION, "shots_received", shots)?,
            None => 0,
        };

        Ok(Self {
            id: parse_id(SCORE_COLLECTION, &value.id)?,
            player_id: parse_id(SCORE_COLLECTION, &value.player_id)?,
            team_id: parse_id(SCORE_COLLECTION, &value.team_id)?,
            hole: to_small(SCORE_COLLECTION, "hole", value.hole)?,
            strokes,
            putts: to_unsigned(SCORE_COLLECTION, "putts", value.putts)?,
            par,
            hole_index,
            // Without a stored net score the gross strokes stand in.
            net_score: value.net_score.unwrap_or_else(|| signed(strokes)),
            shots_received,
            status: value.status,
            input_by: parse_id(SCORE_COLLECTION, &value.input_by)?,
            approved_by: parse_optional_id(SCORE_COLLECTION, value.approved_by.as_deref())?,
            approved_at: value.approved_at.map(DateTime::to_system_time),
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

impl From<PowerupEntity> for MongoPowerupDocument {
    fn from(value: PowerupEntity) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            kind: value.kind,
            status: value.status,
            used_at: value.used_at.map(DateTime::from_system_time),
            target_team_id: value.target_team_id.map(|id| id.to_string()),
        }
    }
}

impl TryFrom<MongoPowerupDocument> for PowerupEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoPowerupDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(POWERUP_COLLECTION, &value.id)?,
            user_id: parse_id(POWERUP_COLLECTION, &value.user_id)?,
            kind: value.kind,
            status: value.status,
            used_at: value.used_at.map(DateTime::to_system_time),
            target_team_id: parse_optional_id(
                POWERUP_COLLECTION,
                value.target_team_id.as_deref(),
            )?,
        })
    }
}

impl From<FeedItemEntity> for MongoFeedDocument {
    fn from(value: FeedItemEntity) -> Self {
        let timestamp_nanos = value
            .timestamp
            .duration_since(std::time::UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        Self {
            id: value.id.to_string(),
            kind: value.kind,
            message: value.message,
            timestamp: DateTime::from_system_time(value.timestamp),
            timestamp_nanos,
            player_id: value.player_id.map(|id| id.to_string()),
            team_id: value.team_id.map(|id| id.to_string()),
            target_team_id: value.target_team_id.map(|id| id.to_string()),
            media_url: value.media_url,
        }
    }
}

impl TryFrom<MongoFeedDocument> for FeedItemEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoFeedDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(FEED_COLLECTION, &value.id)?,
            kind: value.kind,
            message: value.message,
            timestamp: value.timestamp.to_system_time(),
            player_id: parse_optional_id(FEED_COLLECTION, value.player_id.as_deref())?,
            team_id: parse_optional_id(FEED_COLLECTION, value.team_id.as_deref())?,
            target_team_id: parse_optional_id(FEED_COLLECTION, value.target_team_id.as_deref())?,
            media_url: value.media_url,
        })
    }
}

impl MongoSnakeDocument {
    pub fn holder(&self) -> MongoResult<Option<Uuid>> {
        parse_optional_id(SINGLETON_COLLECTION, self.holder.as_deref())
    }
}
