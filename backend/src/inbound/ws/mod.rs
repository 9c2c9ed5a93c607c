//! WebSocket inbound adapter for live notification delivery.
//!
//! Responsibilities:
//! - authenticate the upgrade from the session cookie
//! - register the connection with the presence registry
//! - run the per-connection heartbeat and push loop

use actix_web::web::{self, Payload};
use actix_web::{HttpRequest, HttpResponse, get};
use tracing::{error, info};

use crate::domain::Error;
use crate::inbound::http::session::SessionContext;

mod session;

pub mod state;

/// Handle the WebSocket upgrade for the `/ws` endpoint.
///
/// Anonymous upgrades are refused with `401` before any handshake bytes are
/// written.
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<state::WsState>,
    session: SessionContext,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let caller = session.require_caller()?;

    let (response, ws_session, message_stream) =
        actix_ws::handle(&req, stream).map_err(|error| {
            error!(error = %error, "WebSocket upgrade failed");
            Error::invalid_request("websocket upgrade failed")
        })?;

    let (guard, outbound) = state.presence.register(caller.user_id.clone());
    info!(user_id = %caller.user_id, "notification socket opened");
    actix_web::rt::spawn(session::handle_ws_session(
        guard,
        outbound,
        ws_session,
        message_stream,
    ));

    Ok(response)
}
