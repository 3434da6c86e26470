use axum::Router;

use crate::state::SharedState;

pub mod admin;
pub mod course;
pub mod docs;
pub mod feed;
pub mod health;
pub mod powerups;
pub mod scores;
pub mod sse;
pub mod teams;
pub mod users;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(course::router())
        .merge(teams::router())
        .merge(users::router())
        .merge(scores::router())
        .merge(powerups::router())
        .merge(feed::router())
        .merge(admin::router(state.clone()));

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
