//! WebSocket upgrade + message loop. Each connection owns one quiz session.
//! Client messages are parsed as JSON and forwarded to core logic; we reply
//! with the new session view (preceded by a loading notice while questions
//! are generated).

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::{apply_action, loading_notice, session_view};
use crate::protocol::{ClientAction, ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "trivia_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  let session_id = state.create_connection_session().await;
  info!(target: "trivia_backend", %session_id, "WebSocket connected");

  // Greet with the language screen.
  let hello = state_message(&state, &session_id).await;
  if send(&mut socket, &hello).await.is_ok() {
    while let Some(Ok(msg)) = socket.recv().await {
      match msg {
        Message::Text(txt) => {
          let reply = match serde_json::from_str::<ClientWsMessage>(&txt) {
            Ok(incoming) => handle_client_ws(incoming, &state, &session_id, &mut socket).await,
            Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
          };
          if send(&mut socket, &reply).await.is_err() {
            break;
          }
        }
        Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
        Message::Close(_) => break,
        _ => {}
      }
    }
  }

  state.remove_session(&session_id).await;
  info!(target: "trivia_backend", %session_id, "WebSocket disconnected");
}

async fn send(socket: &mut WebSocket, msg: &ServerWsMessage) -> Result<(), axum::Error> {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  socket.send(Message::Text(out)).await.map_err(|e| {
    error!(target: "trivia_backend", error = %e, "WS send error");
    e
  })
}

async fn state_message(state: &AppState, session_id: &str) -> ServerWsMessage {
  match session_view(state, session_id).await {
    Ok(view) => ServerWsMessage::State { view },
    Err(e) => ServerWsMessage::Error { message: e.to_string() },
  }
}

#[instrument(level = "info", skip(msg, state, socket))]
async fn handle_client_ws(
  msg: ClientWsMessage,
  state: &AppState,
  session_id: &str,
  socket: &mut WebSocket,
) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::State => state_message(state, session_id).await,

    ClientWsMessage::Action { action } => {
      debug!(target: "trivia_backend", action = action.name(), "WS action received");
      if let ClientAction::SelectDifficulty { difficulty } = &action {
        if let Some((message, sub_message)) = loading_notice(state, session_id, difficulty).await {
          // A failed send surfaces again on the final reply.
          let _ = send(socket, &ServerWsMessage::Loading { message, sub_message }).await;
        }
      }
      match apply_action(state, session_id, action).await {
        Ok(()) => state_message(state, session_id).await,
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }
  }
}
