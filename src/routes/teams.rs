use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        score::{EnrichedScore, MemberScorecard},
        team::{LeaderboardEntry, TeamDetail, TeamListing},
        user::UserResponse,
    },
    error::AppError,
    services::{score_service, team_service, user_service},
    state::SharedState,
};

/// Team listings, leaderboard and per-team score views.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/teams", get(list_teams))
        .route("/teams/{id}", get(get_team))
        .route("/teams/{id}/members", get(team_members))
        .route("/teams/{id}/scores", get(team_scores))
        .route("/teams/{id}/scores/pending", get(pending_scores))
        .route("/teams/{id}/scorecard", get(team_scorecard))
        .route("/leaderboard", get(leaderboard))
}

#[utoipa::path(
    get,
    path = "/teams",
    tag = "teams",
    responses((status = 200, description = "Teams ranked by gross total", body = [TeamListing]))
)]
/// List every team with members and approved gross total.
pub async fn list_teams(
    State(state): State<SharedState>,
) -> Result<Json<Vec<TeamListing>>, AppError> {
    Ok(Json(team_service::get_all_teams(&state).await?))
}

#[utoipa::path(
    get,
    path = "/teams/{id}",
    tag = "teams",
    params(("id" = Uuid, Path, description = "Team identifier")),
    responses(
        (status = 200, description = "Team detail", body = TeamDetail),
        (status = 404, description = "Unknown team")
    )
)]
pub async fn get_team(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamDetail>, AppError> {
    Ok(Json(team_service::get_team(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/teams/{id}/members",
    tag = "teams",
    params(("id" = Uuid, Path, description = "Team identifier")),
    responses((status = 200, description = "Team members in registration order", body = [UserResponse]))
)]
pub async fn team_members(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    Ok(Json(user_service::get_team_members(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/teams/{id}/scores",
    tag = "scores",
    params(("id" = Uuid, Path, description = "Team identifier")),
    responses((status = 200, description = "Approved scores of the team", body = [EnrichedScore]))
)]
pub async fn team_scores(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<EnrichedScore>>, AppError> {
    Ok(Json(score_service::get_team_scores(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/teams/{id}/scores/pending",
    tag = "scores",
    params(("id" = Uuid, Path, description = "Team identifier")),
    responses((status = 200, description = "Scores waiting for a captain", body = [EnrichedScore]))
)]
/// Approval queue of a team.
pub async fn pending_scores(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<EnrichedScore>>, AppError> {
    Ok(Json(score_service::get_pending_scores(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/teams/{id}/scorecard",
    tag = "scores",
    params(("id" = Uuid, Path, description = "Team identifier")),
    responses((status = 200, description = "Hole-by-hole card of every member", body = [MemberScorecard]))
)]
pub async fn team_scorecard(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MemberScorecard>>, AppError> {
    Ok(Json(score_service::get_team_scorecard(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "teams",
    responses((status = 200, description = "Teams ranked by net total", body = [LeaderboardEntry]))
)]
/// Net leaderboard; teams that have not played yet come last.
pub async fn leaderboard(
    State(state): State<SharedState>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    Ok(Json(team_service::get_leaderboard(&state).await?))
}
