//! Axum WebSocket upgrade handler for viewer attach.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::registry::{ConnectionRegistry, ViewerConnection};
use crate::api::tenant_from_headers;
use crate::app_state::AppState;
use crate::error::CoreError;

/// `GET /ws/games/{game_id}` — attach a viewer to a game's live feed.
///
/// # Errors
///
/// [`CoreError::BadRequest`] when the tenant header is missing or invalid.
pub async fn ws_attach_handler(
    ws: WebSocketUpgrade,
    Path(game_id): Path<Uuid>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, CoreError> {
    let tenant_id = tenant_from_headers(&headers)?;
    let registry = Arc::clone(&state.registry);

    Ok(ws.on_upgrade(move |socket| run_viewer(socket, registry, game_id, tenant_id)))
}

/// Runs the pump loop for one attached viewer.
///
/// Registers the connection, forwards broadcast messages from the registry
/// channel to the socket, and deregisters on close or send failure.
async fn run_viewer(
    socket: WebSocket,
    registry: Arc<ConnectionRegistry>,
    game_id: Uuid,
    tenant_id: Uuid,
) {
    let connection_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::unbounded_channel();
    registry.insert(ViewerConnection {
        connection_id,
        game_id,
        tenant_id,
        tx,
    });
    tracing::debug!(%connection_id, %game_id, %tenant_id, "viewer attached");

    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            // Snapshot from the broadcast engine
            outbound = rx.recv() => {
                match outbound {
                    Some(message) => {
                        if ws_tx.send(message).await.is_err() {
                            break;
                        }
                    }
                    // Sender side pruned; the connection is dead.
                    None => break,
                }
            }
            // Viewers only listen; anything inbound besides ping/pong
            // noise means detach.
            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
        }
    }

    registry.remove(connection_id);
    tracing::debug!(%connection_id, %game_id, "viewer detached");
}
