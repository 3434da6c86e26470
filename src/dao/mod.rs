/// Record storage operations for teams, players, scores, power-ups and the feed.
pub mod golf_store;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
