//! Per-connection WebSocket loop.
//!
//! Keeps framing and heartbeats at the edge. The socket is push-only:
//! payloads queued by the notification sink are written as text frames, and
//! any client frame only counts as liveness. The public contract pings every
//! 5s and considers a connection idle after 10s without client traffic.
//! Tests shorten both intervals.

use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time;
use tracing::{debug, warn};

use crate::outbound::notifications::PresenceGuard;

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn handle_ws_session(
    guard: PresenceGuard,
    outbound: UnboundedReceiver<String>,
    session: Session,
    stream: MessageStream,
) {
    WsSession { guard, outbound }.run(session, stream).await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    Network(Closed),
    Evicted,
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct WsSession {
    // Held for the connection's lifetime; dropping it unregisters presence.
    guard: PresenceGuard,
    outbound: UnboundedReceiver<String>,
}

impl WsSession {
    async fn run(mut self, mut session: Session, mut stream: MessageStream) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    Self::handle_heartbeat_tick(&mut session, &last_heartbeat).await
                }
                payload = self.outbound.recv() => {
                    Self::handle_push(&mut session, payload).await
                }
                message = stream.recv() => {
                    Self::handle_stream_message(&mut session, &mut last_heartbeat, message).await
                }
            };

            if let Err(error) = result {
                self.log_shutdown_reason(&error);
                let close_action = close_action_for(&error);
                close_session_if_needed(session, close_action).await;
                return;
            }
        }
    }

    async fn handle_heartbeat_tick(
        session: &mut Session,
        last_heartbeat: &Instant,
    ) -> Result<(), SessionError> {
        if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }

        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn handle_push(
        session: &mut Session,
        payload: Option<String>,
    ) -> Result<(), SessionError> {
        // The registry only drops the sender when the entry is removed.
        let Some(payload) = payload else {
            return Err(SessionError::Evicted);
        };
        session.text(payload).await.map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(Message::Ping(payload)) => {
                *last_heartbeat = Instant::now();
                session.pong(&payload).await.map_err(SessionError::Network)
            }
            Ok(Message::Close(reason)) => Err(SessionError::ClientClosed(reason)),
            Ok(
                Message::Text(_)
                | Message::Pong(_)
                | Message::Binary(_)
                | Message::Continuation(_)
                | Message::Nop,
            ) => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    fn log_shutdown_reason(&self, error: &SessionError) {
        let user_id = self.guard.user_id();
        match error {
            SessionError::HeartbeatTimeout => {
                warn!(user_id = %user_id, "WebSocket heartbeat timeout; closing connection");
            }
            SessionError::Protocol(error) => {
                warn!(user_id = %user_id, error = %error, "WebSocket protocol error");
            }
            SessionError::Network(error) => {
                warn!(user_id = %user_id, error = %error, "WebSocket send failed; closing connection");
            }
            SessionError::Evicted => {
                warn!(user_id = %user_id, "presence entry removed; closing connection");
            }
            SessionError::ClientClosed(_) | SessionError::StreamClosed => {
                debug!(user_id = %user_id, "notification socket closed by client");
            }
        }
    }
}

fn close_action_for(error: &SessionError) -> CloseAction {
    match error {
        SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Normal,
            description: Some("heartbeat timeout".to_owned()),
        })),
        SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Protocol,
            description: Some("protocol error".to_owned()),
        })),
        SessionError::Evicted => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Away,
            description: None,
        })),
        SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
        SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
    }
}

async fn close_session_if_needed(session: Session, close_action: CloseAction) {
    if let CloseAction::Close(reason) = close_action {
        if let Err(error) = session.close(reason).await {
            warn!(error = %error, "Failed to close WebSocket session");
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
