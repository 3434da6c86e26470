use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use axum_valid::Valid;

use crate::{
    dto::course::{CourseResponse, NetScoreQuery, NetScoreResponse, ShotsQuery, ShotsResponse},
    services::course_service,
    state::SharedState,
};

/// Course table and the handicap calculators. None of these touch storage.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/course", get(course))
        .route("/scoring/shots", get(shots_received))
        .route("/scoring/net", get(net_score))
}

#[utoipa::path(
    get,
    path = "/course",
    tag = "course",
    responses((status = 200, description = "The 18 holes with par totals", body = CourseResponse))
)]
pub async fn course(State(state): State<SharedState>) -> Json<CourseResponse> {
    Json(course_service::get_course(&state))
}

#[utoipa::path(
    get,
    path = "/scoring/shots",
    tag = "course",
    params(ShotsQuery),
    responses((status = 200, description = "Handicap shots on a hole", body = ShotsResponse))
)]
pub async fn shots_received(Valid(Query(query)): Valid<Query<ShotsQuery>>) -> Json<ShotsResponse> {
    Json(course_service::calculate_shots(&query))
}

#[utoipa::path(
    get,
    path = "/scoring/net",
    tag = "course",
    params(NetScoreQuery),
    responses((status = 200, description = "Net score of a gross score", body = NetScoreResponse))
)]
pub async fn net_score(Valid(Query(query)): Valid<Query<NetScoreQuery>>) -> Json<NetScoreResponse> {
    Json(course_service::calculate_net_score(&query))
}
