use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether storage is usable, pinging it when installed.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let store = match state.require_store().await {
        Ok(store) => store,
        Err(_) => {
            warn!("storage unavailable (degraded mode)");
            return HealthResponse::degraded();
        }
    };

    match store.health_check().await {
        Ok(()) => HealthResponse::ok(store.backend_name()),
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            HealthResponse::degraded()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{config::AppConfig, dao::golf_store::MemoryGolfStore, state::AppState};

    #[tokio::test]
    async fn reports_degraded_without_storage() {
        let state = AppState::new(AppConfig::default());
        let health = health_status(&state).await;
        assert_eq!(health.status, "degraded");
        assert!(health.storage.is_none());

        state.install_store(Arc::new(MemoryGolfStore::new())).await;
        let health = health_status(&state).await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.storage.as_deref(), Some("memory"));
    }
}
