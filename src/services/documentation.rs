use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the Merry Mulligan backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::sse::admin_stream,
        crate::routes::course::course,
        crate::routes::course::shots_received,
        crate::routes::course::net_score,
        crate::routes::teams::list_teams,
        crate::routes::teams::get_team,
        crate::routes::teams::team_members,
        crate::routes::teams::team_scores,
        crate::routes::teams::pending_scores,
        crate::routes::teams::team_scorecard,
        crate::routes::teams::leaderboard,
        crate::routes::users::create_user,
        crate::routes::users::get_user,
        crate::routes::users::update_avatar,
        crate::routes::users::promote,
        crate::routes::users::user_powerups,
        crate::routes::users::player_scores,
        crate::routes::users::course_with_handicap,
        crate::routes::users::hole_info,
        crate::routes::users::snake_holder,
        crate::routes::scores::submit_score,
        crate::routes::scores::approve_score,
        crate::routes::scores::reject_score,
        crate::routes::powerups::use_powerup,
        crate::routes::feed::latest_feed,
        crate::routes::feed::feed_by_type,
        crate::routes::feed::post_feed_item,
        crate::routes::admin::create_team,
        crate::routes::admin::seed_teams,
        crate::routes::admin::transfer_snake,
        crate::routes::admin::list_powerups,
        crate::routes::admin::reset_powerups,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::sse::AdminHandshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::FeedItemEvent,
            crate::dto::sse::ScoreUpdatedEvent,
            crate::dto::sse::SnakeTransferredEvent,
            crate::dto::sse::TeamCreatedEvent,
            crate::dto::sse::PowerupPlayedEvent,
            crate::dto::course::CourseResponse,
            crate::dto::course::HoleResponse,
            crate::dto::course::HandicapHoleResponse,
            crate::dto::course::HoleInfoResponse,
            crate::dto::course::ShotsResponse,
            crate::dto::course::NetScoreResponse,
            crate::dto::team::CreateTeamRequest,
            crate::dto::team::TeamSummary,
            crate::dto::team::TeamMemberSummary,
            crate::dto::team::TeamListing,
            crate::dto::team::TeamDetail,
            crate::dto::team::LeaderboardEntry,
            crate::dto::team::SeedTeamsResponse,
            crate::dto::user::CreateUserRequest,
            crate::dto::user::UpdateAvatarRequest,
            crate::dto::user::PromoteRequest,
            crate::dto::user::TransferSnakeRequest,
            crate::dto::user::CreatedResponse,
            crate::dto::user::UserResponse,
            crate::dto::user::PlayerRef,
            crate::dto::user::UserWithTeam,
            crate::dto::user::SnakeHolderResponse,
            crate::dto::user::SnakeTransferResponse,
            crate::dto::score::SubmitScoreRequest,
            crate::dto::score::SubmitScoreResponse,
            crate::dto::score::ScoreDecisionRequest,
            crate::dto::score::ScoreDecisionResponse,
            crate::dto::score::ScoreResponse,
            crate::dto::score::EnrichedScore,
            crate::dto::score::MemberScorecard,
            crate::dto::powerup::UsePowerupRequest,
            crate::dto::powerup::UsePowerupResponse,
            crate::dto::powerup::PowerupResponse,
            crate::dto::powerup::PowerupOverview,
            crate::dto::powerup::ResetPowerupsResponse,
            crate::dto::feed::PostFeedItemRequest,
            crate::dto::feed::FeedItemResponse,
            crate::dto::feed::EnrichedFeedItem,
            crate::dao::models::Role,
            crate::dao::models::ScoreStatus,
            crate::dao::models::PowerupKind,
            crate::dao::models::PowerupStatus,
            crate::dao::models::FeedKind,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "course", description = "Course table and handicap calculators"),
        (name = "teams", description = "Teams and leaderboard"),
        (name = "users", description = "Players, captains and the snake"),
        (name = "scores", description = "Score submission and approval"),
        (name = "powerups", description = "Sabotage power-ups"),
        (name = "feed", description = "Social feed"),
        (name = "admin", description = "Organizer operations"),
    )
)]
pub struct ApiDoc;
