/// Course table and handicap calculators.
pub mod course_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Social feed reads, posts and event publication.
pub mod feed_service;
/// Health check service.
pub mod health_service;
/// Power-up play, listing and reset.
pub mod powerup_service;
/// Score submission, approval and scorecards.
pub mod score_service;
/// Typed Server-Sent Events broadcasts.
pub mod sse_events;
/// Server-Sent Events subscription and admin token handling.
pub mod sse_service;
/// Storage connection supervisor toggling degraded mode.
pub mod storage_supervisor;
/// Team registry and leaderboard.
pub mod team_service;
/// Player registration, roles and the snake.
pub mod user_service;
/// Single-commit write path shared by mutations.
mod writes;
