//! MCP Session Registry
//!
//! Tracks live MCP sessions. Each session is identified by an opaque
//! random id (returned to the client in the `mcp-session-id` header) and
//! owns exactly one transport. The registry is the only shared map;
//! transports themselves are handed out as `Arc`s and carry their own
//! interior state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::mpsc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::protocol::McpResponse;

/// Buffered server-to-client messages per stream before backpressure.
const STREAM_CHANNEL_CAPACITY: usize = 32;

/// Per-session transport state.
///
/// A transport belongs to exactly one session id for its whole lifetime.
pub struct SessionTransport {
    pub id: String,
    pub created_at: DateTime<Utc>,
    initialized: AtomicBool,
    closed: AtomicBool,
    last_seen: Mutex<DateTime<Utc>>,
    stream_tx: Mutex<Option<mpsc::Sender<McpResponse>>>,
}

impl SessionTransport {
    fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            initialized: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            last_seen: Mutex::new(now),
            stream_tx: Mutex::new(None),
        }
    }

    /// Record client activity on this session.
    pub fn touch(&self) {
        *self.last_seen.lock().unwrap() = Utc::now();
    }

    /// Mark the MCP handshake as completed.
    pub fn mark_initialized(&self) {
        self.initialized.store(true, Ordering::SeqCst);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Open the server-to-client event stream for this session.
    ///
    /// A session has at most one stream; opening a new one replaces the
    /// previous sender, which ends the old stream on its next poll.
    pub fn open_stream(&self) -> mpsc::Receiver<McpResponse> {
        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        *self.stream_tx.lock().unwrap() = Some(tx);
        rx
    }

    /// Push a message onto the event stream, if one is open.
    pub async fn send_to_stream(&self, message: McpResponse) -> bool {
        let tx = self.stream_tx.lock().unwrap().clone();
        match tx {
            Some(tx) => tx.send(message).await.is_ok(),
            None => false,
        }
    }

    /// Close the transport. Drops the stream sender so any open event
    /// stream terminates.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.stream_tx.lock().unwrap().take();
    }

    /// How long since the client last used this session.
    pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        now - *self.last_seen.lock().unwrap()
    }
}

/// Registry of live sessions, keyed by session id.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<SessionTransport>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh session with a random id and register its transport.
    pub async fn create(&self) -> Arc<SessionTransport> {
        let id = Uuid::new_v4().to_string();
        let transport = Arc::new(SessionTransport::new(id.clone()));
        self.sessions
            .write()
            .await
            .insert(id.clone(), transport.clone());
        info!("MCP session created: {}", id);
        transport
    }

    /// Look up the transport that owns `id`.
    pub async fn lookup(&self, id: &str) -> Option<Arc<SessionTransport>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Remove a session. Removing an id that is absent is a no-op, so
    /// concurrent or repeated terminations are safe.
    pub async fn remove(&self, id: &str) {
        if let Some(transport) = self.sessions.write().await.remove(id) {
            transport.close();
            info!("MCP session removed: {}", id);
        }
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle for longer than `max_idle`. Returns how many
    /// were removed.
    pub async fn prune_idle(&self, max_idle: Duration) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let stale: Vec<String> = sessions
            .iter()
            .filter(|(_, transport)| transport.idle_for(now) > max_idle)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &stale {
            if let Some(transport) = sessions.remove(id) {
                transport.close();
                debug!("Pruned idle MCP session: {}", id);
            }
        }
        stale.len()
    }
}
