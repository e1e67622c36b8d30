//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::i18n::Locale;
use crate::logic::*;
use crate::protocol::{
  to_lesson_out, to_lesson_summary_out, to_session_out, ClientWsMessage, ServerWsMessage,
};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "pylingo_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "pylingo_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "pylingo_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "pylingo_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "pylingo_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::StartSession { session_id, locale } => {
      let locale = Locale::match_tag(locale.as_deref().unwrap_or("en-US"));
      let session = state.open_session(session_id, locale).await;
      tracing::info!(target: "pylingo_backend", session = %session.id, "WS session opened");
      ServerWsMessage::Session { session: to_session_out(&session) }
    }

    ClientWsMessage::ListLessons => {
      let lessons: Vec<_> = state.catalog.lessons().iter().map(to_lesson_summary_out).collect();
      let total = lessons.len();
      ServerWsMessage::Lessons { lessons, total }
    }

    ClientWsMessage::GetLesson { lesson_id } => match state.catalog.get(lesson_id) {
      Some(lesson) => ServerWsMessage::Lesson { lesson: to_lesson_out(lesson) },
      None => ServerWsMessage::Error { message: format!("unknown lesson id {}", lesson_id) },
    },

    ClientWsMessage::SubmitCode { session_id, code } => {
      match submit_code(state, &session_id, code).await {
        Ok((verdict, session)) => {
          tracing::info!(target: "lesson", session = %session_id, kind = ?verdict.kind, "WS submit evaluated");
          ServerWsMessage::SubmitResult { verdict, session: to_session_out(&session) }
        }
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::ResetCode { session_id } => match reset_code(state, &session_id).await {
      Ok(session) => ServerWsMessage::Session { session: to_session_out(&session) },
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::SelectLesson { session_id, lesson_id } => {
      match select_lesson(state, &session_id, lesson_id).await {
        Ok(session) => ServerWsMessage::Session { session: to_session_out(&session) },
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::Hint { lesson_id } => match hint_text(state, lesson_id) {
      Some(text) => ServerWsMessage::Hint { text },
      None => ServerWsMessage::Error { message: format!("unknown lesson id {}", lesson_id) },
    },

    ClientWsMessage::GetProgress { session_id } => match state.get_session(&session_id).await {
      Some(session) => ServerWsMessage::Session { session: to_session_out(&session) },
      None => ServerWsMessage::Error { message: format!("unknown session {}", session_id) },
    },
  }
}
