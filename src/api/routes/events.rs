//! WebSocket change feed for the caller's diagram history.
//!
//! Browsers cannot set headers on WebSocket upgrades, so the access token is
//! passed as a query parameter.

use axum::{
    Router,
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
    routing::get,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use uuid::Uuid;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiError;

#[derive(Deserialize)]
struct EventsQuery {
    access_token: Option<String>,
}

/// Create the change feed router
pub fn events_router() -> Router<AppState> {
    Router::new().route("/diagrams/events", get(handle_websocket))
}

/// Authenticate, then upgrade.
async fn handle_websocket(
    Query(query): Query<EventsQuery>,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let token = query
        .access_token
        .ok_or_else(|| ApiError::unauthorized("Authorization required"))?;
    let auth = AuthContext::from_token(&state.jwt, &token)?;

    info!(user_id = %auth.user_id, "[Events] WebSocket connection request");
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, auth.user_id, state)))
}

/// Forward events for `user_id` until either side goes away.
async fn handle_socket(socket: WebSocket, user_id: Uuid, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.events.subscribe();

    let mut send_task = tokio::spawn(async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("[Events] Subscriber lagged, {} events dropped", skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            if event.user_id != user_id {
                continue;
            }
            let Ok(json) = serde_json::to_string(&event) else {
                continue;
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Client messages are ignored; the loop only watches for close.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    info!(user_id = %user_id, "[Events] WebSocket disconnected");
}
