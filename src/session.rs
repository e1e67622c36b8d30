//! Session controller: per-user state machine over the lesson catalog.
//!
//! Phases: Idle -> Evaluating -> (ShowingResult | AwaitingRemediation ->
//! ShowingResult) -> Idle. One submission in flight at a time: submit, reset
//! and change-lesson are rejected with `Busy` while a submission is being
//! evaluated or waiting on the advisor. The advisor call itself happens in
//! `logic`, outside any lock; the phase guard is what prevents races on
//! streak/completion updates.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::catalog::Catalog;
use crate::domain::{AdvisorFeedback, EvaluationResult, Verdict, VerdictKind};
use crate::i18n::Locale;
use crate::progress::ProgressRecord;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
  #[error("a submission is already in flight for this session")]
  Busy,
  #[error("unknown lesson id {0}")]
  UnknownLesson(u32),
  #[error("lesson {0} is locked; complete earlier lessons first")]
  LessonLocked(u32),
  #[error("unknown session {0}")]
  UnknownSession(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
  Idle,
  Evaluating,
  AwaitingRemediation,
  ShowingResult,
}

/// Mutable per-user session. Completion only ever grows; the streak resets on
/// any incorrect submission.
#[derive(Clone, Debug)]
pub struct Session {
  pub id: String,
  pub locale: Locale,
  pub active_lesson_id: u32,
  pub editor_text: String,
  pub completed_lesson_ids: BTreeSet<u32>,
  pub streak: u32,
  pub phase: Phase,
  pub feedback: Option<Verdict>,
}

impl Session {
  /// Fresh session: lesson 1, empty completion set, streak 0.
  pub fn new(id: String, locale: Locale, catalog: &Catalog) -> Self {
    let starter = catalog.get(1).map(|l| l.starter_code.clone()).unwrap_or_default();
    Self {
      id,
      locale,
      active_lesson_id: 1,
      editor_text: starter,
      completed_lesson_ids: BTreeSet::new(),
      streak: 0,
      phase: Phase::Idle,
      feedback: None,
    }
  }

  /// Rehydrate from a persisted record. Out-of-range ids in the record are
  /// dropped or clamped rather than trusted; corrupt data must not wedge the
  /// session.
  pub fn from_record(id: String, locale: Locale, record: ProgressRecord, catalog: &Catalog) -> Self {
    let mut s = Self::new(id, locale, catalog);
    s.completed_lesson_ids = record
      .completed_lesson_ids
      .into_iter()
      .filter(|lid| catalog.get(*lid).is_some())
      .collect();
    s.streak = record.streak;
    if catalog.get(record.current_lesson_id).is_some()
      && record.current_lesson_id <= s.max_unlocked_lesson()
    {
      s.active_lesson_id = record.current_lesson_id;
      if let Some(l) = catalog.get(record.current_lesson_id) {
        s.editor_text = l.starter_code.clone();
      }
    }
    s
  }

  pub fn to_record(&self) -> ProgressRecord {
    ProgressRecord {
      completed_lesson_ids: self.completed_lesson_ids.iter().copied().collect(),
      streak: self.streak,
      current_lesson_id: self.active_lesson_id,
    }
  }

  /// Highest selectable lesson: one past the highest completed lesson, or
  /// lesson 1 when nothing is completed yet.
  pub fn max_unlocked_lesson(&self) -> u32 {
    self.completed_lesson_ids.iter().max().map(|m| m + 1).unwrap_or(1).max(1)
  }

  fn busy(&self) -> bool {
    matches!(self.phase, Phase::Evaluating | Phase::AwaitingRemediation)
  }

  /// Idle|ShowingResult --submit--> Evaluating. Captures the submitted text
  /// and shows a loading verdict.
  pub fn begin_submit(&mut self, editor_text: String) -> Result<(), SessionError> {
    if self.busy() {
      return Err(SessionError::Busy);
    }
    self.editor_text = editor_text;
    self.phase = Phase::Evaluating;
    self.feedback = Some(Verdict {
      kind: VerdictKind::Loading,
      message: self.locale.msg_evaluating().to_string(),
      simulated_output: None,
      expected_output: None,
      explanation: None,
      advisor: None,
    });
    Ok(())
  }

  /// Evaluating --correct--> ShowingResult(success): marks the lesson
  /// complete and increments the streak. Returns the verdict now displayed.
  pub fn finish_correct(&mut self, result: &EvaluationResult) -> Verdict {
    self.completed_lesson_ids.insert(self.active_lesson_id);
    self.streak += 1;
    self.phase = Phase::ShowingResult;
    let verdict = Verdict {
      kind: VerdictKind::Success,
      message: self.locale.msg_success().to_string(),
      simulated_output: Some(result.simulated_output.clone()),
      expected_output: None,
      explanation: None,
      advisor: None,
    };
    self.feedback = Some(verdict.clone());
    verdict
  }

  /// Evaluating --incorrect--> AwaitingRemediation: streak resets to 0 while
  /// the advisor request is issued.
  pub fn await_remediation(&mut self) {
    self.streak = 0;
    self.phase = Phase::AwaitingRemediation;
  }

  /// AwaitingRemediation --> ShowingResult. With advisor feedback the verdict
  /// is advisor-error; without it, plain-error explained by the static hint.
  pub fn finish_incorrect(
    &mut self,
    result: &EvaluationResult,
    expected_output: &str,
    hint: &str,
    advisor: Option<AdvisorFeedback>,
  ) -> Verdict {
    self.phase = Phase::ShowingResult;
    let kind = if advisor.is_some() { VerdictKind::AdvisorError } else { VerdictKind::PlainError };
    let verdict = Verdict {
      kind,
      message: self.locale.msg_not_quite().to_string(),
      simulated_output: Some(result.simulated_output.clone()),
      expected_output: Some(expected_output.to_string()),
      explanation: if advisor.is_none() { Some(hint.to_string()) } else { None },
      advisor,
    };
    self.feedback = Some(verdict.clone());
    verdict
  }

  /// ShowingResult|Idle --reset--> Idle: restore starter text, clear feedback.
  pub fn reset(&mut self, catalog: &Catalog) -> Result<(), SessionError> {
    if self.busy() {
      return Err(SessionError::Busy);
    }
    if let Some(l) = catalog.get(self.active_lesson_id) {
      self.editor_text = l.starter_code.clone();
    }
    self.feedback = None;
    self.phase = Phase::Idle;
    Ok(())
  }

  /// ShowingResult|Idle --change-lesson--> Idle, only for unlocked targets.
  /// Rejected transitions leave the session unchanged.
  pub fn change_lesson(&mut self, target_id: u32, catalog: &Catalog) -> Result<(), SessionError> {
    if self.busy() {
      return Err(SessionError::Busy);
    }
    let lesson = catalog.get(target_id).ok_or(SessionError::UnknownLesson(target_id))?;
    if target_id > self.max_unlocked_lesson() {
      return Err(SessionError::LessonLocked(target_id));
    }
    self.active_lesson_id = target_id;
    self.editor_text = lesson.starter_code.clone();
    self.feedback = None;
    self.phase = Phase::Idle;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::Catalog;
  use crate::domain::EvaluationResult;

  fn session() -> (Session, Catalog) {
    let cat = Catalog::builtin();
    (Session::new("test".into(), Locale::EnUs, &cat), cat)
  }

  fn correct() -> EvaluationResult {
    EvaluationResult { simulated_output: "x".into(), is_correct: true }
  }

  fn incorrect() -> EvaluationResult {
    EvaluationResult { simulated_output: "y".into(), is_correct: false }
  }

  #[test]
  fn streak_counts_consecutive_correct_and_resets_on_miss() {
    let (mut s, _cat) = session();
    for k in 1..=3u32 {
      s.begin_submit("code".into()).expect("submit");
      s.finish_correct(&correct());
      assert_eq!(s.streak, k);
    }
    s.begin_submit("bad".into()).expect("submit");
    s.await_remediation();
    assert_eq!(s.streak, 0);
    s.finish_incorrect(&incorrect(), "expected", "hint", None);
    assert_eq!(s.streak, 0);
  }

  #[test]
  fn completion_set_only_grows() {
    let (mut s, _cat) = session();
    s.begin_submit("code".into()).expect("submit");
    s.finish_correct(&correct());
    assert!(s.completed_lesson_ids.contains(&1));
    s.begin_submit("bad".into()).expect("submit");
    s.await_remediation();
    s.finish_incorrect(&incorrect(), "expected", "hint", None);
    assert!(s.completed_lesson_ids.contains(&1));
  }

  #[test]
  fn unlock_rule_allows_at_most_one_lesson_ahead() {
    let (mut s, cat) = session();
    assert_eq!(s.max_unlocked_lesson(), 1);
    assert_eq!(s.change_lesson(2, &cat), Err(SessionError::LessonLocked(2)));
    assert_eq!(s.active_lesson_id, 1);

    s.begin_submit("code".into()).expect("submit");
    s.finish_correct(&correct());
    assert_eq!(s.max_unlocked_lesson(), 2);
    s.change_lesson(2, &cat).expect("unlocked");
    assert_eq!(s.active_lesson_id, 2);
    assert_eq!(s.change_lesson(3, &cat), Err(SessionError::LessonLocked(3)));
    // Invariant from the unlock rule, after any accepted transition.
    assert!(s.active_lesson_id <= s.max_unlocked_lesson());
  }

  #[test]
  fn unknown_lesson_is_not_found_not_locked() {
    let (mut s, cat) = session();
    assert_eq!(s.change_lesson(99, &cat), Err(SessionError::UnknownLesson(99)));
    assert_eq!(s.change_lesson(0, &cat), Err(SessionError::UnknownLesson(0)));
  }

  #[test]
  fn submit_is_serialized_while_in_flight() {
    let (mut s, cat) = session();
    s.begin_submit("code".into()).expect("first");
    assert_eq!(s.begin_submit("again".into()), Err(SessionError::Busy));
    s.await_remediation();
    assert_eq!(s.begin_submit("again".into()), Err(SessionError::Busy));
    assert_eq!(s.reset(&cat), Err(SessionError::Busy));
    assert_eq!(s.change_lesson(1, &cat), Err(SessionError::Busy));
    s.finish_incorrect(&incorrect(), "expected", "hint", None);
    s.begin_submit("again".into()).expect("free after result");
  }

  #[test]
  fn reset_restores_starter_and_clears_feedback() {
    let (mut s, cat) = session();
    s.begin_submit("print('Hi there')".into()).expect("submit");
    s.await_remediation();
    s.finish_incorrect(&incorrect(), "expected", "hint", None);
    assert!(s.feedback.is_some());
    s.reset(&cat).expect("reset");
    assert_eq!(s.editor_text, cat.get(1).expect("lesson 1").starter_code);
    assert!(s.feedback.is_none());
    assert_eq!(s.phase, Phase::Idle);
  }

  #[test]
  fn change_lesson_loads_starter_and_clears_feedback() {
    let (mut s, cat) = session();
    s.begin_submit("code".into()).expect("submit");
    s.finish_correct(&correct());
    s.change_lesson(2, &cat).expect("unlocked");
    assert_eq!(s.editor_text, cat.get(2).expect("lesson 2").starter_code);
    assert!(s.feedback.is_none());
  }

  #[test]
  fn record_round_trip_preserves_progress() {
    let (mut s, cat) = session();
    s.begin_submit("code".into()).expect("submit");
    s.finish_correct(&correct());
    s.change_lesson(2, &cat).expect("unlocked");
    let rec = s.to_record();
    let restored = Session::from_record("test".into(), Locale::EnUs, rec.clone(), &cat);
    assert_eq!(restored.to_record(), rec);
    assert_eq!(restored.active_lesson_id, 2);
    assert_eq!(restored.streak, 1);
  }

  #[test]
  fn corrupt_record_ids_are_dropped_on_rehydrate() {
    let (_, cat) = session();
    let rec = ProgressRecord {
      completed_lesson_ids: vec![1, 99, 0],
      streak: 2,
      current_lesson_id: 42,
    };
    let s = Session::from_record("test".into(), Locale::EnUs, rec, &cat);
    assert_eq!(s.completed_lesson_ids.iter().copied().collect::<Vec<_>>(), vec![1]);
    // Unknown current lesson falls back to lesson 1.
    assert_eq!(s.active_lesson_id, 1);
  }
}
