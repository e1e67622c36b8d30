//! Loading app configuration (advisor prompts + optional lesson bank) from TOML.
//!
//! See `AppConfig` and `Prompts` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::Lesson;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub prompts: Prompts,
  /// Optional replacement catalog. Ignored wholesale unless ids are dense 1..N
  /// (the evaluator's pattern tables are tuned to lesson content, so a partial
  /// override makes no sense).
  #[serde(default)]
  pub lessons: Vec<LessonCfg>,
}

/// Lesson entry accepted in TOML configuration. All fields required; the
/// catalog invariant is checked after conversion.
#[derive(Clone, Debug, Deserialize)]
pub struct LessonCfg {
  pub id: u32,
  pub title: String,
  pub description: String,
  #[serde(default)]
  pub concept: String,
  pub task: String,
  pub hint: String,
  #[serde(default)]
  pub starter_code: String,
  pub expected_output: String,
  pub solution: String,
}

impl LessonCfg {
  pub fn into_lesson(self) -> Lesson {
    Lesson {
      id: self.id,
      title: self.title,
      description: self.description,
      concept: self.concept,
      task: self.task,
      hint: self.hint,
      starter_code: self.starter_code,
      expected_output: self.expected_output,
      solution: self.solution,
    }
  }
}

/// Prompts used by the advisor client. Defaults mirror the tutoring prompt the
/// app shipped with; override them in TOML to tune tone/structure.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  pub remediation_system: String,
  pub remediation_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      remediation_system: "You are a helpful Python programming tutor for beginners. \
        A student submitted code whose output does not match the expected output. \
        Be encouraging and supportive (never say \"wrong\" or \"incorrect\"), explain what \
        their code currently does, and guide them step by step. Use simple, \
        beginner-friendly language and be specific to their mistake. \
        Respond ONLY with a strict JSON object: {\"feedback\": string, \
        \"correctCode\": string, \"explanation\": string, \"tip\": string}."
        .into(),
      remediation_user_template: "TASK: {task}\nEXPECTED OUTPUT: {expected_output}\n\
        STUDENT'S CODE:\n{code}\n\nHINT AVAILABLE: {hint}\n\n\
        Write all four JSON fields in {language}."
        .into(),
    }
  }
}

/// Attempt to load `AppConfig` from PYLINGO_CONFIG_PATH. On any parsing/IO
/// error, returns None and the caller keeps defaults.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("PYLINGO_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "pylingo_backend", %path, "Loaded app config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "pylingo_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "pylingo_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
