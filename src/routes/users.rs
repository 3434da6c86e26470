use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        course::{HandicapHoleResponse, HoleInfoResponse},
        powerup::PowerupResponse,
        score::ScoreResponse,
        user::{
            CreateUserRequest, CreatedResponse, PromoteRequest, SnakeHolderResponse,
            UpdateAvatarRequest, UserResponse, UserWithTeam,
        },
    },
    error::AppError,
    services::{course_service, powerup_service, score_service, user_service},
    state::SharedState,
};

/// Registration, profiles and per-player views.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/avatar", put(update_avatar))
        .route("/users/{id}/promote", post(promote))
        .route("/users/{id}/powerups", get(user_powerups))
        .route("/users/{id}/scores", get(player_scores))
        .route("/users/{id}/course", get(course_with_handicap))
        .route("/users/{id}/holes/{hole}", get(hole_info))
        .route("/snake", get(snake_holder))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Player registered", body = CreatedResponse),
        (status = 400, description = "Invalid registration"),
        (status = 404, description = "Unknown team")
    )
)]
/// Join a team. The first member becomes its captain.
pub async fn create_user(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateUserRequest>>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let created = user_service::create_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User with team", body = UserWithTeam),
        (status = 404, description = "Unknown user")
    )
)]
pub async fn get_user(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserWithTeam>, AppError> {
    Ok(Json(user_service::get_user(&state, id).await?))
}

#[utoipa::path(
    put,
    path = "/users/{id}/avatar",
    tag = "users",
    params(("id" = Uuid, Path, description = "User identifier")),
    request_body = UpdateAvatarRequest,
    responses((status = 200, description = "Avatar recorded", body = UserResponse))
)]
pub async fn update_avatar(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UpdateAvatarRequest>>,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(
        user_service::update_avatar(&state, id, payload.avatar_url).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/users/{id}/promote",
    tag = "users",
    params(("id" = Uuid, Path, description = "User to promote")),
    request_body = PromoteRequest,
    responses(
        (status = 200, description = "User promoted to captain", body = UserResponse),
        (status = 403, description = "Promoter is not a captain of the same team")
    )
)]
pub async fn promote(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PromoteRequest>,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(
        user_service::promote_to_captain(&state, id, payload.promoted_by).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/users/{id}/powerups",
    tag = "powerups",
    params(("id" = Uuid, Path, description = "User identifier")),
    responses((status = 200, description = "Power-ups still available", body = [PowerupResponse]))
)]
pub async fn user_powerups(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PowerupResponse>>, AppError> {
    Ok(Json(powerup_service::get_user_powerups(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/users/{id}/scores",
    tag = "scores",
    params(("id" = Uuid, Path, description = "Player identifier")),
    responses((status = 200, description = "Scores of the player by hole", body = [ScoreResponse]))
)]
pub async fn player_scores(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ScoreResponse>>, AppError> {
    Ok(Json(score_service::get_player_scores(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/users/{id}/course",
    tag = "course",
    params(("id" = Uuid, Path, description = "Player identifier")),
    responses((status = 200, description = "Course with the player's shots", body = [HandicapHoleResponse]))
)]
pub async fn course_with_handicap(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<HandicapHoleResponse>>, AppError> {
    Ok(Json(
        course_service::get_course_with_handicap(&state, id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/users/{id}/holes/{hole}",
    tag = "course",
    params(
        ("id" = Uuid, Path, description = "Player identifier"),
        ("hole" = u8, Path, description = "Hole number, 1 to 18")
    ),
    responses(
        (status = 200, description = "Hole seen through the player's handicap", body = HoleInfoResponse),
        (status = 404, description = "Unknown player or hole")
    )
)]
pub async fn hole_info(
    State(state): State<SharedState>,
    Path((id, hole)): Path<(Uuid, u8)>,
) -> Result<Json<HoleInfoResponse>, AppError> {
    Ok(Json(course_service::get_hole_info(&state, id, hole).await?))
}

#[utoipa::path(
    get,
    path = "/snake",
    tag = "users",
    responses((status = 200, description = "Current snake holder", body = SnakeHolderResponse))
)]
pub async fn snake_holder(
    State(state): State<SharedState>,
) -> Result<Json<SnakeHolderResponse>, AppError> {
    Ok(Json(user_service::get_snake_holder(&state).await?))
}
