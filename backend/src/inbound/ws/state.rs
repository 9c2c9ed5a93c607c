//! Shared WebSocket adapter state.

use std::sync::Arc;

use crate::outbound::notifications::PresenceRegistry;

/// Dependency bundle for the notification socket.
///
/// The same registry must back the notification sink so pushes reach the
/// connections registered here.
#[derive(Clone)]
pub struct WsState {
    pub presence: Arc<PresenceRegistry>,
}

impl WsState {
    /// Construct state around a shared presence registry.
    pub fn new(presence: Arc<PresenceRegistry>) -> Self {
        Self { presence }
    }
}
