//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - The submit flow: evaluate, update streak/completion, persist, and on a
//!     mismatch fetch remediation (remote advisor, local fallback, or static
//!     hint when no advisor is configured)
//!   - Reset and lesson-change transitions
//!   - Session snapshots for the progress surface
//!
//! The advisor call runs outside the session-map lock; the session phase
//! guard serializes submissions per session in the meantime.

use tracing::{error, info, instrument};

use crate::advisor::{local_feedback, RemediationRequest};
use crate::domain::Verdict;
use crate::evaluator::evaluate;
use crate::session::{Session, SessionError};
use crate::state::AppState;
use crate::util::trunc_for_log;

/// Evaluate submitted code for a session's active lesson and drive the full
/// verdict cycle. Returns the final verdict and a post-transition snapshot.
#[instrument(level = "info", skip(state, code), fields(%session_id, code_len = code.len()))]
pub async fn submit_code(
  state: &AppState,
  session_id: &str,
  code: String,
) -> Result<(Verdict, Session), SessionError> {
  // Phase 1, under the lock: evaluate and apply the synchronous transitions.
  let (result, lesson, locale) = {
    let mut sessions = state.sessions.write().await;
    let session = sessions
      .get_mut(session_id)
      .ok_or_else(|| SessionError::UnknownSession(session_id.to_string()))?;

    session.begin_submit(code.clone())?;
    let lesson = state
      .catalog
      .get(session.active_lesson_id)
      .cloned()
      .ok_or(SessionError::UnknownLesson(session.active_lesson_id))?;

    let result = evaluate(&session.editor_text, &lesson.expected_output);
    info!(target: "lesson", id = lesson.id, correct = result.is_correct,
          simulated = %trunc_for_log(&result.simulated_output, 80), "Submission evaluated");

    if result.is_correct {
      let verdict = session.finish_correct(&result);
      state.store.save(&session.id, &session.to_record());
      return Ok((verdict, session.clone()));
    }

    session.await_remediation();
    state.store.save(&session.id, &session.to_record());
    (result, lesson, session.locale)
  };

  // Phase 2, lock released: remediation. The remote call may take a while;
  // all its failure modes collapse into the deterministic local fallback.
  // With no advisor configured, the static hint explains the mismatch.
  let advisor_fb = match &state.advisor {
    Some(advisor) => {
      let req = RemediationRequest {
        code: &code,
        expected_output: &lesson.expected_output,
        task: &lesson.task,
        hint: &lesson.hint,
        locale,
      };
      match advisor.remediation(&state.prompts, &req).await {
        Ok(fb) => Some(fb),
        Err(e) => {
          error!(target: "lesson", id = lesson.id, error = %e,
                 "Advisor remediation failed; using local fallback feedback");
          Some(local_feedback(&code, &lesson.expected_output))
        }
      }
    }
    None => None,
  };

  // Phase 3, under the lock again: publish the verdict.
  let mut sessions = state.sessions.write().await;
  let session = sessions
    .get_mut(session_id)
    .ok_or_else(|| SessionError::UnknownSession(session_id.to_string()))?;
  let verdict = session.finish_incorrect(&result, &lesson.expected_output, &lesson.hint, advisor_fb);
  state.store.save(&session.id, &session.to_record());
  Ok((verdict, session.clone()))
}

/// Restore the active lesson's starter code and clear the verdict.
#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn reset_code(state: &AppState, session_id: &str) -> Result<Session, SessionError> {
  let mut sessions = state.sessions.write().await;
  let session = sessions
    .get_mut(session_id)
    .ok_or_else(|| SessionError::UnknownSession(session_id.to_string()))?;
  session.reset(&state.catalog)?;
  state.store.save(&session.id, &session.to_record());
  Ok(session.clone())
}

/// Switch to another lesson, subject to the unlock rule.
#[instrument(level = "info", skip(state), fields(%session_id, %lesson_id))]
pub async fn select_lesson(
  state: &AppState,
  session_id: &str,
  lesson_id: u32,
) -> Result<Session, SessionError> {
  let mut sessions = state.sessions.write().await;
  let session = sessions
    .get_mut(session_id)
    .ok_or_else(|| SessionError::UnknownSession(session_id.to_string()))?;
  session.change_lesson(lesson_id, &state.catalog)?;
  state.store.save(&session.id, &session.to_record());
  info!(target: "lesson", id = lesson_id, "Lesson selected");
  Ok(session.clone())
}

/// The static hint for a lesson, if the lesson exists.
pub fn hint_text(state: &AppState, lesson_id: u32) -> Option<String> {
  state.catalog.get(lesson_id).map(|l| l.hint.clone())
}
