//! WebSocket connection lifecycle: one connection, one game.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::game::{ControllerHandle, GameController};
use crate::http::routes::AppState;

use super::messages::{ClientToServer, ServerToClient};
use super::presentation::WsPresentation;

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (sv_tx, mut sv_rx) = mpsc::unbounded_channel::<ServerToClient>();

    let presentation = WsPresentation::new(sv_tx.clone(), state.settings.flip_duration);
    let (controller, handle) = GameController::new(presentation, state.settings.clone());
    let room_id = state.rooms.open(controller.subscribe());
    let game = tokio::spawn(controller.run());

    // Forward server messages to the websocket
    let writer = tokio::spawn(async move {
        while let Some(msg) = sv_rx.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!(%err, "dropping unserializable message");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    tracing::debug!(%room_id, "ws opened");
    let _ = sv_tx.send(ServerToClient::Welcome { room_id: room_id.clone() });

    while let Some(Ok(msg)) = ws_rx.next().await {
        match msg {
            Message::Text(text) => {
                if let Some(reply) = on_client_message(&handle, &text).await {
                    let _ = sv_tx.send(reply);
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    handle.shutdown();
    let _ = game.await;
    writer.abort();
    if let Err(err) = state.rooms.close(&room_id) {
        tracing::warn!(%room_id, %err, "room already gone on close");
    }
    tracing::debug!(%room_id, "ws closed");
}

/// Applies one client message and returns the direct reply, if any.
pub async fn on_client_message(handle: &ControllerHandle, text: &str) -> Option<ServerToClient> {
    match serde_json::from_str::<ClientToServer>(text) {
        Ok(ClientToServer::Ping) => Some(ServerToClient::Pong),
        Ok(ClientToServer::StartRound { pairs }) => match handle.start_round(pairs).await {
            Ok(_) => None,
            Err(err) => Some(ServerToClient::Error { message: err.to_string() }),
        },
        Ok(ClientToServer::SelectCard { card_id }) => {
            handle.select(card_id);
            None
        }
        Err(err) => Some(ServerToClient::Error { message: format!("Bad message: {}", err) }),
    }
}
