//! Minimal OpenAI-compatible chat-completions client.
//!
//! We request a strict JSON object and return the raw message content; parsing
//! into domain shapes happens in the workflow. Calls are instrumented and log the
//! model name, latency and token usage (not contents).
//!
//! NOTE: We never log the API key.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::ModelConfig;
use crate::credentials::ApiKey;
use crate::error::AppError;
use crate::generator::TextGenerator;

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub base_url: String,
  pub model: String,
  pub system: String,
  pub temperature: f32,
}

impl OpenAI {
  pub fn new(cfg: &ModelConfig, system: &str) -> Result<Self, AppError> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(cfg.timeout_secs))
      .build()
      .map_err(|e| AppError::Configuration(format!("HTTP client init failed: {e}")))?;

    Ok(Self {
      client,
      base_url: cfg.base_url.trim_end_matches('/').to_string(),
      model: cfg.model.clone(),
      system: system.to_string(),
      temperature: cfg.temperature,
    })
  }

  /// JSON-object chat completion; returns the message content untouched.
  #[instrument(level = "info", skip(self, api_key, user), fields(model = %self.model, prompt_len = user.len()))]
  async fn chat_json(&self, api_key: &ApiKey, user: &str) -> Result<String, String> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: self.system.clone() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature: self.temperature,
      response_format: Some(ResponseFormat { r#type: "json_object".into() }),
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "mathgen-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", api_key.expose()))
      .json(&req).send().await.map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or(body);
      return Err(format!("Model HTTP {}: {}", status, msg));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "Model usage");
    }
    body.choices.first()
      .and_then(|c| c.message.content.clone())
      .map(|t| t.trim().to_string())
      .filter(|t| !t.is_empty())
      .ok_or_else(|| "Model returned an empty completion".to_string())
  }
}

#[async_trait]
impl TextGenerator for OpenAI {
  async fn generate(&self, api_key: &ApiKey, prompt: &str) -> Result<String, AppError> {
    let start = Instant::now();
    let result = self.chat_json(api_key, prompt).await;
    let elapsed = start.elapsed();
    match result {
      Ok(text) => {
        info!(?elapsed, response_len = text.len(), "Model response received");
        Ok(text)
      }
      Err(e) => {
        error!(?elapsed, error = %e, "Model call failed");
        Err(AppError::Generation(format!("Model generation failed: {e}")))
      }
    }
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

/// Try to extract a clean error message from a provider error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
