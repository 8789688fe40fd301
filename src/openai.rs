//! Minimal OpenAI client for our use-cases.
//!
//! We only call chat.completions and request either plain text or a strict JSON object.
//! Calls are instrumented and log model names, latencies, and response sizes (not contents).
//!
//! NOTE: We never log the API key.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::Prompts;
use crate::domain::{ApproachVerdict, ExpectedResult, Problem};
use crate::util::{fill_template, format_input, format_opt};

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  async fn chat(&self, system: &str, user: &str, temperature: f32, json: bool) -> Result<String, String> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: json.then(|| ResponseFormat { r#type: "json_object".into() }),
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "algo-trainer/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await.map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or(body);
      return Err(format!("OpenAI HTTP {}: {}", status, msg));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    Ok(body.choices.first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default()
      .trim()
      .to_string())
  }

  /// Plain-text chat completion.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat_plain(&self, system: &str, user: &str, temperature: f32) -> Result<String, String> {
    self.chat(system, user, temperature, false).await
  }

  /// JSON-object chat completion. Generic over the target type T.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat_json<T: for<'a> Deserialize<'a>>(
    &self,
    system: &str,
    user: &str,
    temperature: f32,
  ) -> Result<T, String> {
    let text = self.chat(system, user, temperature, true).await?;
    parse_json_reply(&text)
  }

  // --- High-level helpers (domain-specialized) ---

  /// Qualitative judgment of the student's one-line approach.
  #[instrument(level = "info", skip(self, prompts, problem, approach), fields(problem_id = %problem.id, approach_len = approach.len()))]
  pub async fn evaluate_approach(
    &self,
    prompts: &Prompts,
    problem: &Problem,
    approach: &str,
    answer: Option<i64>,
    expected: ExpectedResult,
  ) -> Result<ApproachVerdict, String> {
    let user = render_approach_prompt(prompts, problem, approach, answer, expected);
    let start = std::time::Instant::now();
    let result = self.chat_json::<VerdictJson>(&prompts.approach_system, &user, 0.2).await;
    let elapsed = start.elapsed();

    match result {
      Ok(v) => {
        info!(?elapsed, approach_ok = v.approach_ok, "Approach judged by model");
        Ok(ApproachVerdict { approach_ok: v.approach_ok, feedback: v.feedback, detailed: v.detailed })
      }
      Err(e) => {
        error!(?elapsed, error = %e, "Model call failed during approach judgment");
        Err(e)
      }
    }
  }

  /// Short explanation of how to reach the expected answer.
  #[instrument(level = "info", skip(self, prompts, problem), fields(problem_id = %problem.id))]
  pub async fn explain(
    &self,
    prompts: &Prompts,
    problem: &Problem,
    expected: ExpectedResult,
  ) -> Result<String, String> {
    let expected = format_opt(expected);
    let input = format_input(&problem.input);
    let target_line = target_line(problem);
    let user = fill_template(
      &prompts.explain_user_template,
      &[
        ("prompt", problem.prompt.as_str()),
        ("input", input.as_str()),
        ("target_line", target_line.as_str()),
        ("expected", expected.as_str()),
      ],
    );
    self.chat_plain(&prompts.explain_system, &user, 0.2).await
  }
}

fn target_line(problem: &Problem) -> String {
  problem.target.map(|t| format!("Target: {}\n", t)).unwrap_or_default()
}

pub fn render_approach_prompt(
  prompts: &Prompts,
  problem: &Problem,
  approach: &str,
  answer: Option<i64>,
  expected: ExpectedResult,
) -> String {
  let input = format_input(&problem.input);
  let target_line = target_line(problem);
  let expected = format_opt(expected);
  let answer = format_opt(answer);
  fill_template(
    &prompts.approach_user_template,
    &[
      ("prompt", problem.prompt.as_str()),
      ("input", input.as_str()),
      ("target_line", target_line.as_str()),
      ("expected", expected.as_str()),
      ("answer", answer.as_str()),
      ("approach", approach),
    ],
  )
}

#[derive(Deserialize)]
struct VerdictJson {
  approach_ok: bool,
  #[serde(default)]
  feedback: String,
  #[serde(default)]
  detailed: Option<String>,
}

/// Parse a model reply as JSON, tolerating a fenced ```json block around it.
fn parse_json_reply<T: for<'a> Deserialize<'a>>(text: &str) -> Result<T, String> {
  let trimmed = text.trim();
  let body = trimmed
    .strip_prefix("```json")
    .or_else(|| trimmed.strip_prefix("```"))
    .and_then(|s| s.strip_suffix("```"))
    .unwrap_or(trimmed);
  serde_json::from_str::<T>(body.trim()).map_err(|e| format!("JSON parse error: {}", e))
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
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Algorithm;

  fn xor_problem() -> Problem {
    Problem {
      id: "xor_1".into(),
      algorithm: Algorithm::SubarrayXorCount,
      prompt: "Count subarrays with XOR == target. target=6".into(),
      input: vec![4, 2, 2, 6, 4],
      target: Some(6),
    }
  }

  #[test]
  fn approach_prompt_includes_target_only_when_present() {
    let prompts = Prompts::default();
    let p = xor_problem();
    let user = render_approach_prompt(&prompts, &p, "prefix xor + map", Some(4), Some(4));
    assert!(user.contains("Input: [4, 2, 2, 6, 4]\nTarget: 6\nExpected: 4"));
    assert!(user.contains("Student answer: 4\nApproach: prefix xor + map"));

    let mut p = p;
    p.target = None;
    let user = render_approach_prompt(&prompts, &p, "", None, None);
    assert!(!user.contains("Target:"));
    assert!(user.contains("Expected: None\nStudent answer: None"));
  }

  #[test]
  fn verdict_json_parses_with_and_without_fence() {
    let v: VerdictJson = parse_json_reply(r#"{"approach_ok": true, "feedback": "Good."}"#).unwrap();
    assert!(v.approach_ok);
    assert_eq!(v.detailed, None);

    let v: VerdictJson =
      parse_json_reply("```json\n{\"approach_ok\": false, \"feedback\": \"No.\", \"detailed\": \"x\"}\n```").unwrap();
    assert!(!v.approach_ok);
    assert_eq!(v.detailed.as_deref(), Some("x"));

    assert!(parse_json_reply::<VerdictJson>("not json").is_err());
  }

  #[test]
  fn error_body_message_is_extracted() {
    let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
    assert_eq!(extract_openai_error(body).as_deref(), Some("Incorrect API key provided"));
    assert_eq!(extract_openai_error("<html>"), None);
  }
}
