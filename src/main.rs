//! Merry Mulligan binary entrypoint wiring REST, SSE and storage layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use merry_mulligan::{
    config::AppConfig,
    dao::{
        golf_store::{GolfStore, MemoryGolfStore},
        storage::StorageError,
    },
    routes,
    services::{sse_events, storage_supervisor},
    state::{AppState, SharedState},
};

/// Storage backends selectable through `STORAGE_BACKEND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StorageBackend {
    Memory,
    #[cfg(feature = "mongo-store")]
    Mongo,
}

impl StorageBackend {
    fn from_env() -> Self {
        match env::var("STORAGE_BACKEND").ok().as_deref() {
            Some("memory") => StorageBackend::Memory,
            #[cfg(feature = "mongo-store")]
            Some("mongo") | None => StorageBackend::Mongo,
            #[cfg(not(feature = "mongo-store"))]
            None => StorageBackend::Memory,
            Some(other) => {
                warn!(backend = other, "unknown STORAGE_BACKEND; using in-memory storage");
                StorageBackend::Memory
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = AppState::new(config);
    sse_events::spawn_status_forwarder(app_state.clone());

    let backend = StorageBackend::from_env();
    info!(?backend, "selected storage backend");
    spawn_storage(app_state.clone(), backend);

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Start the storage supervisor for the selected backend.
fn spawn_storage(state: SharedState, backend: StorageBackend) {
    match backend {
        StorageBackend::Memory => {
            tokio::spawn(storage_supervisor::run(state, || async {
                let store: Arc<dyn GolfStore> = Arc::new(MemoryGolfStore::new());
                Ok::<_, StorageError>(store)
            }));
        }
        #[cfg(feature = "mongo-store")]
        StorageBackend::Mongo => {
            use merry_mulligan::dao::golf_store::mongodb::{MongoConfig, MongoGolfStore};

            tokio::spawn(storage_supervisor::run(state, || async {
                let config = MongoConfig::from_env().await?;
                let store = MongoGolfStore::connect(config).await?;
                let store: Arc<dyn GolfStore> = Arc::new(store);
                Ok::<_, StorageError>(store)
            }));
        }
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("shutdown signal received");
}
