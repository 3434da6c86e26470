use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::sse::{AdminHandshake, ServerEvent},
    error::ServiceError,
    state::{SharedState, SseHub},
};

const ADMIN_TOKEN_EVENT: &str = "admin_token";

/// Subscribe to the shared public SSE stream.
pub fn subscribe_public(state: &SharedState) -> broadcast::Receiver<ServerEvent> {
    state.public_sse().subscribe()
}

/// Subscribe to the organizer stream, claiming the single admin token.
pub async fn subscribe_admin(
    state: &SharedState,
) -> Result<(broadcast::Receiver<ServerEvent>, String), ServiceError> {
    let token = claim_admin_token(state).await?;
    let receiver = state.admin_sse().subscribe();
    Ok((receiver, token))
}

/// Which stream a connection belongs to, for teardown bookkeeping.
#[derive(Clone)]
pub enum StreamKind {
    Public,
    /// The organizer stream releases the admin token when it closes.
    Admin(SharedState),
}

/// Convert a broadcast receiver into an SSE response, forwarding events and
/// cleaning up once the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    kind: StreamKind,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            let mut event = Event::default().data(payload.data);
                            if let Some(name) = payload.event {
                                event = event.event(name);
                            }

                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            // Clients re-query on the next event, so dropping is fine.
                            debug!(skipped, "SSE subscriber lagged");
                            continue;
                        }
                    }
                }
            }
        }

        match kind {
            StreamKind::Public => info!("public SSE stream disconnected"),
            StreamKind::Admin(state) => {
                reset_admin_token(&state).await;
                info!("admin SSE stream disconnected");
            }
        }
    });

    Sse::new(ReceiverStream::new(rx)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Check an `X-Admin-Token` value against the token of the live organizer stream.
pub async fn verify_admin_token(state: &SharedState, candidate: &str) -> Result<(), ServiceError> {
    let guard = state.admin_token().lock().await;
    match guard.as_deref() {
        Some(expected) if expected == candidate => Ok(()),
        Some(_) => Err(ServiceError::Unauthorized("invalid admin token".into())),
        None => Err(ServiceError::Unauthorized(
            "admin stream not initialised".into(),
        )),
    }
}

/// Reserve the admin token for a new stream; only one organizer stream may be open.
async fn claim_admin_token(state: &SharedState) -> Result<String, ServiceError> {
    let mut guard = state.admin_token().lock().await;
    match &mut *guard {
        slot @ None => {
            let token = Uuid::new_v4().simple().to_string();
            slot.replace(token.clone());
            Ok(token)
        }
        Some(_) => Err(ServiceError::Unauthorized(
            "another admin SSE stream is already active".into(),
        )),
    }
}

/// Send the freshly claimed token as the first organizer event.
pub fn broadcast_admin_handshake(hub: &SseHub, token: &str) {
    let payload = AdminHandshake {
        token: token.to_string(),
    };
    match ServerEvent::json(Some(ADMIN_TOKEN_EVENT.to_string()), &payload) {
        Ok(event) => hub.broadcast(event),
        Err(err) => warn!(error = %err, "failed to serialize admin handshake"),
    }
}

async fn reset_admin_token(state: &SharedState) {
    let mut guard = state.admin_token().lock().await;
    guard.take();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, state::AppState};

    #[tokio::test]
    async fn a_single_admin_stream_holds_the_token() {
        let state = AppState::new(AppConfig::default());
        assert!(verify_admin_token(&state, "anything").await.is_err());

        let (_receiver, token) = subscribe_admin(&state).await.unwrap();
        assert!(matches!(
            subscribe_admin(&state).await,
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(verify_admin_token(&state, &token).await.is_ok());
        assert!(verify_admin_token(&state, "forged").await.is_err());

        reset_admin_token(&state).await;
        assert!(verify_admin_token(&state, &token).await.is_err());
    }

    #[tokio::test]
    async fn handshake_is_sent_on_the_admin_hub() {
        let state = AppState::new(AppConfig::default());
        let (mut receiver, token) = subscribe_admin(&state).await.unwrap();
        broadcast_admin_handshake(state.admin_sse(), &token);

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some(ADMIN_TOKEN_EVENT));
        assert!(event.data.contains(&token));
    }
}
