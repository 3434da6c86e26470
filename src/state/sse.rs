use tokio::sync::{Mutex, broadcast};

use crate::dto::sse::ServerEvent;

const PUBLIC_CAPACITY: usize = 64;
const ADMIN_CAPACITY: usize = 16;

/// Broadcast hubs behind `/sse/public` and `/sse/admin`.
pub struct SseState {
    public: SseHub,
    admin: SseHub,
    /// Token issued to the single organizer stream currently connected.
    admin_token: Mutex<Option<String>>,
}

impl SseState {
    pub fn new() -> Self {
        Self {
            public: SseHub::new(PUBLIC_CAPACITY),
            admin: SseHub::new(ADMIN_CAPACITY),
            admin_token: Mutex::new(None),
        }
    }

    pub fn public(&self) -> &SseHub {
        &self.public
    }

    pub fn admin(&self) -> &SseHub {
        &self.admin
    }

    pub fn admin_token(&self) -> &Mutex<Option<String>> {
        &self.admin_token
    }
}

impl Default for SseState {
    fn default() -> Self {
        Self::new()
    }
}

/// Fan-out of server events to every connected subscriber.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a hub backed by a Tokio broadcast channel of the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to current subscribers. Having none is not an error.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}
