use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{Role, UserEntity},
    dto::{format_system_time, team::TeamSummary, validation::validate_not_blank},
};

/// Highest handicap accepted at registration.
pub const MAX_HANDICAP: u32 = 54;

/// Registration payload ("join team").
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 64), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(range(max = 54))]
    pub handicap: u32,
    pub team_id: Uuid,
    /// Already generated avatar, if any.
    #[serde(default)]
    #[validate(url)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateAvatarRequest {
    #[validate(url)]
    pub avatar_url: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PromoteRequest {
    /// Captain performing the promotion.
    pub promoted_by: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferSnakeRequest {
    pub new_holder_id: Uuid,
}

/// Identifier of a freshly created record.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: Uuid,
}

/// Registered player as exposed by the API.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub handicap: u32,
    pub team_id: Uuid,
    pub avatar_url: Option<String>,
    pub role: Role,
    /// True for the single current holder of the snake.
    pub has_snake: bool,
    pub created_at: String,
}

impl UserResponse {
    pub fn new(user: UserEntity, snake_holder: Option<Uuid>) -> Self {
        Self {
            has_snake: snake_holder == Some(user.id),
            id: user.id,
            name: user.name,
            handicap: user.handicap,
            team_id: user.team_id,
            avatar_url: user.avatar_url,
            role: user.role,
            created_at: format_system_time(user.created_at),
        }
    }
}

/// Player reference embedded in enriched payloads.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerRef {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl From<UserEntity> for PlayerRef {
    fn from(user: UserEntity) -> Self {
        Self {
            id: user.id,
            name: user.name,
            avatar_url: user.avatar_url,
        }
    }
}

/// User together with their team.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserWithTeam {
    #[serde(flatten)]
    pub user: UserResponse,
    pub team: Option<TeamSummary>,
}

/// Current snake holder, if any.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SnakeHolderResponse {
    pub holder: Option<UserResponse>,
    pub team: Option<TeamSummary>,
}

/// Result of a manual snake transfer.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SnakeTransferResponse {
    pub previous_holder_id: Option<Uuid>,
    pub new_holder: UserResponse,
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    fn request(name: &str, handicap: u32, avatar_url: Option<&str>) -> CreateUserRequest {
        CreateUserRequest {
            name: name.into(),
            handicap,
            team_id: Uuid::new_v4(),
            avatar_url: avatar_url.map(Into::into),
        }
    }

    #[test]
    fn accepts_valid_registration() {
        assert!(request("Rudy", 18, None).validate().is_ok());
        assert!(
            request("Rudy", MAX_HANDICAP, Some("https://cdn.example.com/a.png"))
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn rejects_out_of_range_handicap_and_blank_name() {
        assert!(request("Rudy", MAX_HANDICAP + 1, None).validate().is_err());
        assert!(request("  ", 10, None).validate().is_err());
        assert!(request("Rudy", 10, Some("not a url")).validate().is_err());
    }
}
