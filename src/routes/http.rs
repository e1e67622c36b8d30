//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::i18n::Locale;
use crate::logic::*;
use crate::protocol::*;
use crate::session::SessionError;
use crate::state::AppState;

/// Map domain errors to HTTP statuses. Busy submissions are a conflict, not a
/// failure; locked lessons are forbidden; unknown ids are not found.
fn reject(e: SessionError) -> (StatusCode, Json<ErrorOut>) {
  let status = match e {
    SessionError::Busy => StatusCode::CONFLICT,
    SessionError::LessonLocked(_) => StatusCode::FORBIDDEN,
    SessionError::UnknownLesson(_) | SessionError::UnknownSession(_) => StatusCode::NOT_FOUND,
  };
  (status, Json(ErrorOut { error: e.to_string() }))
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_lessons(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let lessons: Vec<_> = state.catalog.lessons().iter().map(to_lesson_summary_out).collect();
  let total = lessons.len();
  Json(serde_json::json!({ "lessons": lessons, "total": total }))
}

#[instrument(level = "info", skip(state), fields(id = q.id))]
pub async fn http_get_lesson(
  State(state): State<Arc<AppState>>,
  Query(q): Query<LessonQuery>,
) -> Result<Json<LessonOut>, (StatusCode, Json<ErrorOut>)> {
  match state.catalog.get(q.id) {
    Some(lesson) => Ok(Json(to_lesson_out(lesson))),
    None => Err(reject(SessionError::UnknownLesson(q.id))),
  }
}

#[instrument(level = "info", skip(state), fields(lesson_id = q.lesson_id))]
pub async fn http_get_hint(
  State(state): State<Arc<AppState>>,
  Query(q): Query<HintQuery>,
) -> Result<Json<HintOut>, (StatusCode, Json<ErrorOut>)> {
  match hint_text(&state, q.lesson_id) {
    Some(text) => Ok(Json(HintOut { text })),
    None => Err(reject(SessionError::UnknownLesson(q.lesson_id))),
  }
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_open_session(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SessionIn>,
) -> impl IntoResponse {
  let locale = Locale::match_tag(body.locale.as_deref().unwrap_or("en-US"));
  let session = state.open_session(body.session_id, locale).await;
  info!(target: "pylingo_backend", session = %session.id, "HTTP session opened");
  Json(to_session_out(&session))
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id, code_len = body.code.len()))]
pub async fn http_post_submit(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SubmitIn>,
) -> Result<Json<SubmitOut>, (StatusCode, Json<ErrorOut>)> {
  let (verdict, session) = submit_code(&state, &body.session_id, body.code)
    .await
    .map_err(reject)?;
  Ok(Json(SubmitOut { verdict, session: to_session_out(&session) }))
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id))]
pub async fn http_post_reset(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ResetIn>,
) -> Result<Json<SessionOut>, (StatusCode, Json<ErrorOut>)> {
  let session = reset_code(&state, &body.session_id).await.map_err(reject)?;
  Ok(Json(to_session_out(&session)))
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id, lesson_id = body.lesson_id))]
pub async fn http_post_select_lesson(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SelectLessonIn>,
) -> Result<Json<SessionOut>, (StatusCode, Json<ErrorOut>)> {
  let session = select_lesson(&state, &body.session_id, body.lesson_id)
    .await
    .map_err(reject)?;
  Ok(Json(to_session_out(&session)))
}

#[instrument(level = "info", skip(state), fields(%q.session_id))]
pub async fn http_get_progress(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ProgressQuery>,
) -> Result<Json<SessionOut>, (StatusCode, Json<ErrorOut>)> {
  match state.get_session(&q.session_id).await {
    Some(session) => Ok(Json(to_session_out(&session))),
    None => Err(reject(SessionError::UnknownSession(q.session_id))),
  }
}
