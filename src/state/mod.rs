pub mod course;
pub mod feed;
pub mod leaderboard;
pub mod score_lifecycle;
pub mod scoring;
mod sse;

use std::{future::Future, sync::Arc, time::Duration};

use tokio::sync::{Mutex, RwLock, watch};
use tokio::time::timeout;
use tracing::warn;

use crate::{config::AppConfig, dao::golf_store::GolfStore, error::ServiceError};

pub use self::sse::SseHub;
use self::{course::Course, sse::SseState};

pub type SharedState = Arc<AppState>;
/// Upper bound for a single mutation, storage round trips included.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Central application state: storage handle, realtime hubs and the write gate.
pub struct AppState {
    store: RwLock<Option<Arc<dyn GolfStore>>>,
    sse: SseState,
    config: AppConfig,
    degraded: watch::Sender<bool>,
    write_gate: Mutex<()>,
    write_timeout: Option<Duration>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`].
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            store: RwLock::new(None),
            sse: SseState::new(),
            config,
            degraded: degraded_tx,
            write_gate: Mutex::new(()),
            write_timeout: Some(DEFAULT_WRITE_TIMEOUT),
        })
    }

    /// Build a state with `store` already installed, out of degraded mode.
    pub async fn with_store(config: AppConfig, store: Arc<dyn GolfStore>) -> SharedState {
        let state = Self::new(config);
        state.install_store(store).await;
        state
    }

    /// Handle to the installed store, if any, regardless of the degraded flag.
    pub async fn store(&self) -> Option<Arc<dyn GolfStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Store handle for an operation, failing while degraded.
    pub async fn require_store(&self) -> Result<Arc<dyn GolfStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a store implementation and leave degraded mode.
    pub async fn install_store(&self, store: Arc<dyn GolfStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Drop the current store and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// True while no usable store is installed.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Flip the degraded flag, notifying watchers only on change.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Configuration the server started with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Hole ratings used to score submissions.
    pub fn course(&self) -> &Course {
        self.config.course()
    }

    /// Stream of game events for players and spectators.
    pub fn public_sse(&self) -> &SseHub {
        self.sse.public()
    }

    /// Stream of organizer events: new teams, played power-ups and system status.
    pub fn admin_sse(&self) -> &SseHub {
        self.sse.admin()
    }

    /// Token guard that ensures a single organizer SSE subscriber at a time.
    pub fn admin_token(&self) -> &Mutex<Option<String>> {
        self.sse.admin_token()
    }

    /// Run a mutation under the process-wide write gate.
    ///
    /// Mutations never interleave, so check-then-act sequences inside `work`
    /// (status checks, snake swap, power-up availability) see a stable view.
    pub async fn run_mutation<F, Fut, T>(
        &self,
        operation: &'static str,
        work: F,
    ) -> Result<T, ServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let gate = self.write_gate.lock().await;
        let outcome = match self.write_timeout {
            Some(limit) => match timeout(limit, work()).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(operation, limit_ms = limit.as_millis(), "mutation timed out");
                    Err(ServiceError::Timeout)
                }
            },
            None => work().await,
        };
        drop(gate);
        outcome
    }
}
