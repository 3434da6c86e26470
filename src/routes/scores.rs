use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::score::{
        ScoreDecisionRequest, ScoreDecisionResponse, SubmitScoreRequest, SubmitScoreResponse,
    },
    error::AppError,
    services::score_service,
    state::SharedState,
};

/// Score submission and captain decisions.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/scores", post(submit_score))
        .route("/scores/{id}/approve", post(approve_score))
        .route("/scores/{id}/reject", post(reject_score))
}

#[utoipa::path(
    post,
    path = "/scores",
    tag = "scores",
    request_body = SubmitScoreRequest,
    responses(
        (status = 201, description = "Score recorded as pending", body = SubmitScoreResponse),
        (status = 400, description = "Hole or strokes out of range"),
        (status = 404, description = "Unknown player")
    )
)]
/// Submit (or resubmit) a player's score for a hole.
pub async fn submit_score(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<SubmitScoreRequest>>,
) -> Result<(StatusCode, Json<SubmitScoreResponse>), AppError> {
    let submitted = score_service::submit_score(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(submitted)))
}

#[utoipa::path(
    post,
    path = "/scores/{id}/approve",
    tag = "scores",
    params(("id" = Uuid, Path, description = "Score identifier")),
    request_body = ScoreDecisionRequest,
    responses(
        (status = 200, description = "Score approved", body = ScoreDecisionResponse),
        (status = 403, description = "Not a captain of the score's team"),
        (status = 404, description = "Unknown score or captain"),
        (status = 409, description = "Score is not pending")
    )
)]
pub async fn approve_score(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ScoreDecisionRequest>,
) -> Result<Json<ScoreDecisionResponse>, AppError> {
    Ok(Json(
        score_service::approve_score(&state, id, payload.captain_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/scores/{id}/reject",
    tag = "scores",
    params(("id" = Uuid, Path, description = "Score identifier")),
    request_body = ScoreDecisionRequest,
    responses(
        (status = 200, description = "Score rejected", body = ScoreDecisionResponse),
        (status = 403, description = "Not a captain of the score's team"),
        (status = 404, description = "Unknown score or captain"),
        (status = 409, description = "Score is not pending")
    )
)]
pub async fn reject_score(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ScoreDecisionRequest>,
) -> Result<Json<ScoreDecisionResponse>, AppError> {
    Ok(Json(
        score_service::reject_score(&state, id, payload.captain_id).await?,
    ))
}
