//! Minimal OpenAI-compatible client for quiz question generation.
//!
//! We call chat.completions in JSON-object mode and turn the reply into
//! validated `Question`s. Calls are instrumented and log model names,
//! latencies, and response sizes (not contents).
//!
//! NOTE: We never log the API key.

use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::config::Prompts;
use crate::domain::Question;
use crate::error::GenerationError;
use crate::quiz::GenerationRequest;
use crate::util::{decode_html_entities, fill_template, trunc_for_log};

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
      .timeout(Duration::from_secs(60))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// JSON-object chat completion. Returns the raw message content.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat_json(&self, system: &str, user: &str, temperature: f32) -> Result<String, GenerationError> {
    let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: Some(ResponseFormat { r#type: "json_object".into() }),
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "trivia-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or_else(|| trunc_for_log(&body, 200));
      return Err(GenerationError::Http { status, message });
    }

    let body: ChatCompletionResponse = res.json().await?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    Ok(body.choices.into_iter().next()
      .and_then(|c| c.message.content)
      .unwrap_or_default())
  }

  /// Generate `req.count` multiple-choice questions for the request's topics, difficulty and language.
  #[instrument(
    level = "info",
    skip(self, prompts, req),
    fields(difficulty = %req.difficulty, language = req.language.code(), topics = req.topics.len(), count = req.count)
  )]
  pub async fn generate_questions(
    &self,
    prompts: &Prompts,
    req: &GenerationRequest,
  ) -> Result<Vec<Question>, GenerationError> {
    let count = req.count.to_string();
    let topics = req.topics.join(", ");
    let vars = [
      ("count", count.as_str()),
      ("language", req.language.english_name()),
      ("topics", topics.as_str()),
      ("difficulty", req.difficulty.as_str()),
    ];
    let system = fill_template(&prompts.questions_system, &vars);
    let user = fill_template(&prompts.questions_user_template, &vars);

    let start = Instant::now();
    let result = self.chat_json(&system, &user, 0.9).await;
    let elapsed = start.elapsed();
    let text = match result {
      Ok(t) => {
        info!(?elapsed, response_len = t.len(), "Model response received");
        t
      }
      Err(e) => {
        error!(?elapsed, error = %e, "Model call failed during question generation");
        return Err(e);
      }
    };

    let questions = parse_questions(&text, req.count)?;
    info!(
      generated = questions.len(),
      first_preview = %questions.first().map(|q| trunc_for_log(&q.question, 40)).unwrap_or_default(),
      "Quiz questions generated"
    );
    Ok(questions)
  }
}

#[derive(Deserialize)]
struct RawQuestion {
  question: String,
  options: Vec<String>,
  #[serde(alias = "correct_answer", alias = "answer")]
  #[serde(rename = "correctAnswer")]
  correct_answer: String,
}

/// Turn the model's JSON into well-formed questions.
///
/// Accepts `{"questions": [...]}`, any object holding one array, or a bare array.
/// Entities are decoded and whitespace trimmed; malformed entries are dropped
/// and the list is cut to `count`. Nothing usable is an error.
pub fn parse_questions(text: &str, count: usize) -> Result<Vec<Question>, GenerationError> {
  let value: Value = serde_json::from_str(text.trim())
    .map_err(|e| GenerationError::Parse(e.to_string()))?;

  let items = match value {
    Value::Array(items) => items,
    Value::Object(mut map) => match map.remove("questions") {
      Some(Value::Array(items)) => items,
      _ => map
        .into_iter()
        .find_map(|(_, v)| match v {
          Value::Array(items) => Some(items),
          _ => None,
        })
        .ok_or(GenerationError::Empty)?,
    },
    _ => return Err(GenerationError::Parse("expected a JSON array or object".into())),
  };

  let mut out = Vec::with_capacity(items.len().min(count));
  for (i, item) in items.into_iter().enumerate() {
    let Ok(raw) = serde_json::from_value::<RawQuestion>(item) else {
      warn!(index = i, "Dropping question with unexpected shape");
      continue;
    };
    let q = sanitize(raw);
    if !q.is_well_formed() {
      warn!(index = i, question = %trunc_for_log(&q.question, 40), "Dropping malformed question");
      continue;
    }
    if out.iter().any(|o: &Question| o.question == q.question) {
      continue;
    }
    out.push(q);
    if out.len() == count {
      break;
    }
  }

  if out.is_empty() {
    return Err(GenerationError::Empty);
  }
  Ok(out)
}

fn sanitize(raw: RawQuestion) -> Question {
  let clean = |s: &str| decode_html_entities(s).trim().to_string();
  Question {
    question: clean(&raw.question),
    options: raw.options.iter().map(|o| clean(o)).collect(),
    correct_answer: clean(&raw.correct_answer),
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

  const ONE: &str = r#"{"question": "Capital of Oman?", "options": ["Muscat", "Salalah", "Sohar", "Nizwa"], "correctAnswer": "Muscat"}"#;

  #[test]
  fn parses_wrapped_object() {
    let text = format!(r#"{{"questions": [{ONE}]}}"#);
    let qs = parse_questions(&text, 10).unwrap();
    assert_eq!(qs.len(), 1);
    assert_eq!(qs[0].correct_answer, "Muscat");
  }

  #[test]
  fn parses_bare_array_and_other_keys() {
    assert_eq!(parse_questions(&format!("[{ONE}]"), 10).unwrap().len(), 1);
    assert_eq!(parse_questions(&format!(r#"{{"quiz": [{ONE}]}}"#), 10).unwrap().len(), 1);
  }

  #[test]
  fn decodes_entities_before_validating() {
    let text = r#"[{"question": "Who wrote &quot;Season of Migration to the North&quot;?",
      "options": ["Tayeb Salih", "Naguib Mahfouz", "Taha Hussein", "Ghassan Kanafani"],
      "correctAnswer": " Tayeb Salih "}]"#;
    let qs = parse_questions(text, 10).unwrap();
    assert_eq!(qs[0].question, "Who wrote \"Season of Migration to the North\"?");
    assert_eq!(qs[0].correct_answer, "Tayeb Salih");
  }

  #[test]
  fn drops_malformed_and_truncates() {
    let bad_answer = r#"{"question": "Q?", "options": ["a", "b", "c", "d"], "correctAnswer": "e"}"#;
    let three_options = r#"{"question": "R?", "options": ["a", "b", "c"], "correctAnswer": "a"}"#;
    let other = r#"{"question": "S?", "options": ["a", "b", "c", "d"], "correct_answer": "d"}"#;
    let text = format!("[{bad_answer}, {three_options}, {ONE}, {other}, {ONE}]");
    let qs = parse_questions(&text, 10).unwrap();
    assert_eq!(qs.len(), 2, "malformed and duplicate entries dropped");
    assert_eq!(parse_questions(&text, 1).unwrap().len(), 1);
  }

  #[test]
  fn empty_or_invalid_is_an_error() {
    assert!(matches!(parse_questions(r#"{"questions": []}"#, 10), Err(GenerationError::Empty)));
    assert!(matches!(parse_questions("not json", 10), Err(GenerationError::Parse(_))));
    assert!(matches!(parse_questions("42", 10), Err(GenerationError::Parse(_))));
  }

  #[test]
  fn extracts_api_error_message() {
    let body = r#"{"error": {"message": "Rate limit reached", "type": "requests"}}"#;
    assert_eq!(extract_openai_error(body).as_deref(), Some("Rate limit reached"));
    assert_eq!(extract_openai_error("<html>"), None);
  }
}
