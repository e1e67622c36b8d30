//! Domain models used by the backend: lessons, evaluation results, verdicts,
//! and advisor feedback.

use serde::{Deserialize, Serialize};

/// One tutorial lesson. Immutable once the catalog is built.
///
/// `id` values are dense starting at 1; catalog order defines progression order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lesson {
  pub id: u32,
  pub title: String,
  pub description: String,
  pub concept: String,
  pub task: String,
  pub hint: String,
  pub starter_code: String,
  /// Exact string the evaluator must match (newline-separated for multi-line).
  pub expected_output: String,
  /// Reference answer. Not consulted by the evaluator; shown as documentation
  /// and used by the advisor fallback.
  pub solution: String,
}

/// Produced per submission by the output evaluator. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
  pub simulated_output: String,
  pub is_correct: bool,
}

/// What kind of verdict is currently displayed for a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictKind {
  /// Submission accepted, remediation request in flight.
  Loading,
  /// Output matched the lesson's expected output.
  Success,
  /// Mismatch, explained with the lesson's static hint.
  PlainError,
  /// Mismatch, explained with advisor-generated feedback.
  AdvisorError,
}

/// Transient verdict record. Replaced wholesale on each action and cleared on
/// lesson change or reset.
#[derive(Clone, Debug, Serialize)]
pub struct Verdict {
  pub kind: VerdictKind,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub simulated_output: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub expected_output: Option<String>,
  /// Static explanation (the lesson hint) for plain-error verdicts.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub explanation: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub advisor: Option<AdvisorFeedback>,
}

/// Tutoring feedback shown when a submission is wrong.
///
/// Always complete: any field missing from a remote response is replaced with
/// a generic fallback string before this struct is built.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdvisorFeedback {
  pub feedback: String,
  #[serde(rename = "correctCode")]
  pub correct_code: String,
  pub explanation: String,
  pub tip: String,
}
