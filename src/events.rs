//! Request lifecycle events broadcast by the dispatcher.

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};

/// Request information for client events.
///
/// Never carries parameter values; signed requests contain credentials.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestInfo {
    /// The HTTP method (GET or POST)
    pub http_method: String,
    /// The Last.fm API method, e.g. `user.getRecentTracks`
    pub api_method: String,
}

impl RequestInfo {
    pub fn new(http_method: &str, api_method: &str) -> Self {
        Self {
            http_method: http_method.to_string(),
            api_method: api_method.to_string(),
        }
    }

    /// Get a short description of the request for logging
    pub fn short_description(&self) -> String {
        format!("{} {}", self.http_method, self.api_method)
    }
}

/// Event type to describe dispatcher activity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClientEvent {
    /// Request started
    RequestStarted {
        /// Request details
        request: RequestInfo,
    },
    /// Request finished with an HTTP status
    RequestCompleted {
        /// Request details
        request: RequestInfo,
        /// HTTP status code
        status_code: u16,
        /// Duration of the request in milliseconds
        duration_ms: u64,
    },
    /// Request never produced an HTTP response
    RequestFailed {
        /// Request details
        request: RequestInfo,
        /// Transport error message
        error: String,
        /// Duration of the request in milliseconds
        duration_ms: u64,
    },
}

/// Type alias for the broadcast receiver
pub type ClientEventReceiver = broadcast::Receiver<ClientEvent>;

/// Shared event broadcasting state that persists across dispatcher clones
#[derive(Clone)]
pub struct SharedEventBroadcaster {
    event_tx: broadcast::Sender<ClientEvent>,
    last_event_tx: watch::Sender<Option<ClientEvent>>,
}

impl SharedEventBroadcaster {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100);
        let (last_event_tx, _) = watch::channel(None);

        Self {
            event_tx,
            last_event_tx,
        }
    }

    /// Broadcast an event to all subscribers
    pub fn broadcast_event(&self, event: ClientEvent) {
        let _ = self.event_tx.send(event.clone());
        // send_replace stores the value even when nobody is watching
        self.last_event_tx.send_replace(Some(event));
    }

    pub fn subscribe(&self) -> ClientEventReceiver {
        self.event_tx.subscribe()
    }

    pub fn latest_event(&self) -> Option<ClientEvent> {
        self.last_event_tx.borrow().clone()
    }
}

impl Default for SharedEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SharedEventBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedEventBroadcaster")
            .field("subscribers", &self.event_tx.receiver_count())
            .finish()
    }
}
