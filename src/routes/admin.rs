use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_valid::Valid;
use tracing::debug;

use crate::{
    dto::{
        powerup::{PowerupOverview, ResetPowerupsResponse},
        team::{CreateTeamRequest, SeedTeamsResponse, TeamSummary},
        user::{SnakeTransferResponse, TransferSnakeRequest},
    },
    error::AppError,
    services::{powerup_service, sse_service, team_service, user_service},
    state::SharedState,
};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Organizer-only endpoints, guarded by the token of the `/sse/admin` stream.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/teams", post(create_team))
        .route("/admin/teams/seed", post(seed_teams))
        .route("/admin/snake", post(transfer_snake))
        .route("/admin/powerups", get(list_powerups))
        .route("/admin/powerups/reset", post(reset_powerups))
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

#[utoipa::path(
    post,
    path = "/admin/teams",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamSummary),
        (status = 409, description = "Team name already taken")
    )
)]
/// Register a new team.
pub async fn create_team(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateTeamRequest>>,
) -> Result<(StatusCode, Json<TeamSummary>), AppError> {
    let team = team_service::create_team(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

#[utoipa::path(
    post,
    path = "/admin/teams/seed",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    responses((status = 200, description = "Configured roster created, or existing teams returned", body = SeedTeamsResponse))
)]
pub async fn seed_teams(
    State(state): State<SharedState>,
) -> Result<Json<SeedTeamsResponse>, AppError> {
    Ok(Json(team_service::seed_teams(&state).await?))
}

#[utoipa::path(
    post,
    path = "/admin/snake",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    request_body = TransferSnakeRequest,
    responses(
        (status = 200, description = "Snake handed over", body = SnakeTransferResponse),
        (status = 404, description = "Unknown user")
    )
)]
/// Hand the snake to a player directly.
pub async fn transfer_snake(
    State(state): State<SharedState>,
    Json(payload): Json<TransferSnakeRequest>,
) -> Result<Json<SnakeTransferResponse>, AppError> {
    Ok(Json(
        user_service::transfer_snake(&state, payload.new_holder_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/admin/powerups",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    responses((status = 200, description = "Every power-up with its owner", body = [PowerupOverview]))
)]
pub async fn list_powerups(
    State(state): State<SharedState>,
) -> Result<Json<Vec<PowerupOverview>>, AppError> {
    Ok(Json(powerup_service::get_all_powerups(&state).await?))
}

#[utoipa::path(
    post,
    path = "/admin/powerups/reset",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    responses((status = 200, description = "Power-ups back in play", body = ResetPowerupsResponse))
)]
pub async fn reset_powerups(
    State(state): State<SharedState>,
) -> Result<Json<ResetPowerupsResponse>, AppError> {
    Ok(Json(powerup_service::reset_all_powerups(&state).await?))
}

async fn require_admin_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;

    if let Err(err) = sse_service::verify_admin_token(&state, &provided).await {
        debug!(path = %req.uri().path(), "organizer request refused");
        return Err(err.into());
    }
    Ok(next.run(req).await)
}
