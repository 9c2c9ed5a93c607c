//! Process-local registry of live notification sockets.
//!
//! Each user maps to the set of connections currently open for them. A
//! connection is removed when its [`PresenceGuard`] drops and the user entry
//! goes with it once the set is empty. Nothing here is persisted, so presence
//! is lost on restart.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, warn};

use crate::domain::UserId;

type Connections = HashMap<UserId, HashMap<u64, UnboundedSender<String>>>;

/// User id to open connection handles.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    next_id: AtomicU64,
    connections: Mutex<Connections>,
}

impl PresenceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection for `user_id`.
    ///
    /// Messages pushed to the user arrive on the returned receiver until the
    /// guard is dropped.
    pub fn register(
        self: &Arc<Self>,
        user_id: UserId,
    ) -> (PresenceGuard, UnboundedReceiver<String>) {
        let connection_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = unbounded_channel();
        if let Some(mut connections) = self.lock() {
            connections
                .entry(user_id.clone())
                .or_default()
                .insert(connection_id, tx);
        }
        debug!(user_id = %user_id, connection_id, "notification socket registered");
        let guard = PresenceGuard {
            registry: Arc::clone(self),
            user_id,
            connection_id,
        };
        (guard, rx)
    }

    /// Send `payload` to every open connection of `user_id`, returning how
    /// many accepted it. Closed handles are pruned on the way.
    pub fn push(&self, user_id: &UserId, payload: &str) -> usize {
        let Some(mut connections) = self.lock() else {
            return 0;
        };
        let Some(handles) = connections.get_mut(user_id) else {
            return 0;
        };
        handles.retain(|_, tx| tx.send(payload.to_owned()).is_ok());
        let delivered = handles.len();
        if handles.is_empty() {
            connections.remove(user_id);
        }
        delivered
    }

    /// Whether `user_id` has at least one open connection.
    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.lock()
            .is_some_and(|connections| connections.contains_key(user_id))
    }

    /// Number of open connections across all users.
    pub fn connection_count(&self) -> usize {
        self.lock()
            .map_or(0, |connections| connections.values().map(HashMap::len).sum())
    }

    fn unregister(&self, user_id: &UserId, connection_id: u64) {
        let Some(mut connections) = self.lock() else {
            return;
        };
        if let Some(handles) = connections.get_mut(user_id) {
            handles.remove(&connection_id);
            if handles.is_empty() {
                connections.remove(user_id);
            }
        }
        debug!(user_id = %user_id, connection_id, "notification socket unregistered");
    }

    fn lock(&self) -> Option<MutexGuard<'_, Connections>> {
        match self.connections.lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                warn!("presence registry lock poisoned");
                None
            }
        }
    }
}

/// Keeps one connection registered; dropping it unregisters.
#[derive(Debug)]
pub struct PresenceGuard {
    registry: Arc<PresenceRegistry>,
    user_id: UserId,
    connection_id: u64,
}

impl PresenceGuard {
    /// The user this connection belongs to.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

impl Drop for PresenceGuard {
    fn drop(&mut self) {
        self.registry.unregister(&self.user_id, self.connection_id);
    }
}
