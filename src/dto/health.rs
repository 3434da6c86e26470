use serde::Serialize;
use utoipa::ToSchema;

/// Payload of the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" or "degraded".
    pub status: String,
    /// Name of the storage backend currently installed, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
}

impl HealthResponse {
    pub fn ok(storage: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            storage: Some(storage.into()),
        }
    }

    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
            storage: None,
        }
    }
}
