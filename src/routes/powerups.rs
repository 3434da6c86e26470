use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use uuid::Uuid;

use crate::{
    dto::powerup::{UsePowerupRequest, UsePowerupResponse},
    error::AppError,
    services::powerup_service,
    state::SharedState,
};

pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/powerups/{id}/use", post(use_powerup))
}

#[utoipa::path(
    post,
    path = "/powerups/{id}/use",
    tag = "powerups",
    params(("id" = Uuid, Path, description = "Power-up identifier")),
    request_body = UsePowerupRequest,
    responses(
        (status = 200, description = "Power-up played", body = UsePowerupResponse),
        (status = 404, description = "Unknown power-up or team"),
        (status = 409, description = "Already played or aimed at the owner's team")
    )
)]
/// Play a power-up against another team.
pub async fn use_powerup(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UsePowerupRequest>,
) -> Result<Json<UsePowerupResponse>, AppError> {
    Ok(Json(
        powerup_service::use_powerup(&state, id, payload.target_team_id).await?,
    ))
}
