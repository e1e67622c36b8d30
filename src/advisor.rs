//! Remediation advisor: remote tutoring feedback with a deterministic local
//! fallback.
//!
//! The remote side is a chat.completions call requesting a strict JSON object.
//! Calls are instrumented and log model names, latencies, and response sizes
//! (not contents). We never log the API key.
//!
//! Every failure mode (transport error, non-2xx, unparseable body, service
//! error) is handled identically by the caller: fall back to
//! `local_feedback`, which never fails and never blocks. Missing fields in a
//! successful remote response are filled with fixed generic strings, so the
//! result is always a complete four-field record.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::Prompts;
use crate::domain::AdvisorFeedback;
use crate::i18n::Locale;
use crate::util::fill_template;

/// Context forwarded to the advisor for one failed submission.
#[derive(Debug)]
pub struct RemediationRequest<'a> {
  pub code: &'a str,
  pub expected_output: &'a str,
  pub task: &'a str,
  pub hint: &'a str,
  pub locale: Locale,
}

const GENERIC_FEEDBACK: &str =
  "Keep trying! Your code is on the right track. Check the hint and example for more guidance.";
const GENERIC_EXPLANATION: &str =
  "Compare your code with the expected output and adjust as needed. Use the hint as a guide.";
const GENERIC_TIP: &str =
  "Break the problem into small steps: what do you need to do? How do you do it in Python?";

#[derive(Clone)]
pub struct Advisor {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

/// Remote response shape: all four fields optional by contract.
#[derive(Deserialize)]
struct RemediationRaw {
  #[serde(default)]
  feedback: Option<String>,
  #[serde(default, rename = "correctCode")]
  correct_code: Option<String>,
  #[serde(default)]
  explanation: Option<String>,
  #[serde(default)]
  tip: Option<String>,
}

impl Advisor {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// Request tutoring feedback for a failed submission.
  #[instrument(level = "info", skip(self, prompts, req),
               fields(model = %self.model, code_len = req.code.len(), locale = ?req.locale))]
  pub async fn remediation(
    &self,
    prompts: &Prompts,
    req: &RemediationRequest<'_>,
  ) -> Result<AdvisorFeedback, String> {
    let user = fill_template(
      &prompts.remediation_user_template,
      &[
        ("task", req.task),
        ("expected_output", req.expected_output),
        ("code", req.code),
        ("hint", req.hint),
        ("language", req.locale.language_name()),
      ],
    );

    let start = std::time::Instant::now();
    let raw: RemediationRaw =
      self.chat_json(&prompts.remediation_system, &user, 0.7).await?;
    info!(elapsed = ?start.elapsed(), "Advisor response received");

    Ok(AdvisorFeedback {
      feedback: raw.feedback.unwrap_or_else(|| GENERIC_FEEDBACK.into()),
      correct_code: raw.correct_code.unwrap_or_default(),
      explanation: raw.explanation.unwrap_or_else(|| GENERIC_EXPLANATION.into()),
      tip: raw.tip.unwrap_or_else(|| GENERIC_TIP.into()),
    })
  }

  /// JSON-object chat completion. Generic over the target type T.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat_json<T: for<'a> Deserialize<'a>>(
    &self,
    system: &str,
    user: &str,
    temperature: f32,
  ) -> Result<T, String> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: Some(ResponseFormat { r#type: "json_object".into() }),
    };

    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "pylingo-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req)
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_service_error(&body).unwrap_or(body);
      return Err(format!("Advisor HTTP {}: {}", status, msg));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "Advisor usage");
    }
    let text = body
      .choices
      .first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default();

    serde_json::from_str::<T>(&text).map_err(|e| format!("JSON parse error: {}", e))
  }
}

/// Deterministic local feedback derived from substring checks on the
/// submitted code. Recognizes the canonical near-misses for lessons 1, 2 and
/// 5; otherwise returns a generic encouragement with a correct-code lookup
/// keyed on the expected output.
pub fn local_feedback(code: &str, expected_output: &str) -> AdvisorFeedback {
  // Hello World variations
  if code.contains("print(") && (code.contains("Hi there") || code.contains("hi there")) {
    return AdvisorFeedback {
      feedback: "Excellent! You're using the print() function correctly. You just need to \
                 change the text inside the quotes to match exactly what's asked for."
        .into(),
      correct_code: "print('Hello, World!')".into(),
      explanation: "The print() function displays text on the screen. To get 'Hello, World!', \
                    simply change the text inside the quotes."
        .into(),
      tip: "Always verify that the text matches the expected output exactly, including \
            capitalization and punctuation."
        .into(),
    };
  }

  // Variables - missing print
  if code.contains("age = 25") && !code.contains("print(age)") {
    return AdvisorFeedback {
      feedback: "Great job creating the variable! Now you need to display its value using print()."
        .into(),
      correct_code: "age = 25\nprint(age)".into(),
      explanation: "First you create the variable 'age = 25', then use 'print(age)' to display \
                    its value."
        .into(),
      tip: "Remember that creating a variable doesn't automatically display it. You need to use \
            print() to see it."
        .into(),
    };
  }

  // Math operations
  if code.contains("15 + 27") && !code.contains("print(") {
    return AdvisorFeedback {
      feedback: "Perfect! You have the math operation right. You just need to use print() to \
                 show the result."
        .into(),
      correct_code: "print(15 + 27)".into(),
      explanation: "Python can calculate 15 + 27, but you need print() to see the result on the \
                    screen."
        .into(),
      tip: "Use print() around math operations to see the results.".into(),
    };
  }

  // Generic fallback based on expected output
  let correct_code = match expected_output {
    "Hello, World!" => "print('Hello, World!')",
    "25" => "age = 25\nprint(age)",
    "42" => "print(15 + 27)",
    _ => "",
  };

  AdvisorFeedback {
    feedback: GENERIC_FEEDBACK.into(),
    correct_code: correct_code.into(),
    explanation: GENERIC_EXPLANATION.into(),
    tip: GENERIC_TIP.into(),
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}
#[derive(Serialize)]
struct ChatMessageReq {
  role: String,
  content: String,
}
#[derive(Serialize)]
struct ResponseFormat {
  #[serde(rename = "type")]
  r#type: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)]
  usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice {
  message: ChatMessageResp,
}
#[derive(Deserialize)]
struct ChatMessageResp {
  content: Option<String>,
}
#[derive(Deserialize)]
struct Usage {
  #[serde(default)]
  prompt_tokens: Option<u32>,
  #[serde(default)]
  completion_tokens: Option<u32>,
  #[serde(default)]
  total_tokens: Option<u32>,
}

/// Try to extract a clean error message from the service's error body.
fn extract_service_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hello_world_near_miss_is_recognized() {
    let fb = local_feedback("print('Hi there')", "Hello, World!");
    assert_eq!(fb.correct_code, "print('Hello, World!')");
    assert!(fb.feedback.contains("print()"));
  }

  #[test]
  fn missing_print_after_assignment_is_recognized() {
    let fb = local_feedback("age = 25", "25");
    assert_eq!(fb.correct_code, "age = 25\nprint(age)");
  }

  #[test]
  fn bare_math_expression_is_recognized() {
    let fb = local_feedback("15 + 27", "42");
    assert_eq!(fb.correct_code, "print(15 + 27)");
  }

  #[test]
  fn generic_fallback_is_always_complete() {
    let fb = local_feedback("import antigravity", "banana");
    assert!(!fb.feedback.is_empty());
    assert!(!fb.explanation.is_empty());
    assert!(!fb.tip.is_empty());
    // Outputs outside the lookup get no code sample, only encouragement.
    assert!(fb.correct_code.is_empty());
  }

  #[test]
  fn optional_remote_fields_are_filled_with_generics() {
    let raw: RemediationRaw = serde_json::from_str("{}").expect("parse");
    let fb = AdvisorFeedback {
      feedback: raw.feedback.unwrap_or_else(|| GENERIC_FEEDBACK.into()),
      correct_code: raw.correct_code.unwrap_or_default(),
      explanation: raw.explanation.unwrap_or_else(|| GENERIC_EXPLANATION.into()),
      tip: raw.tip.unwrap_or_else(|| GENERIC_TIP.into()),
    };
    assert_eq!(fb.feedback, GENERIC_FEEDBACK);
    assert_eq!(fb.explanation, GENERIC_EXPLANATION);
    assert_eq!(fb.tip, GENERIC_TIP);
  }
}
