//! Service configuration: environment variables plus an optional TOML file.
//!
//! The TOML file (path in MATHGEN_CONFIG_PATH) may override prompts and any of
//! the sections below. Environment variables win over the file.
//!
//! ```toml
//! [server]
//! port = 3000
//!
//! [database]
//! url = "sqlite://mathgen.db"
//!
//! [model]
//! base_url = "https://api.openai.com/v1"
//! model = "gpt-4o-mini"
//! api_key_env = "OPENAI_API_KEY"
//!
//! [prompts]
//! evaluation_template = "... {problem_text} ... {user_answer} ..."
//! ```

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub server: ServerConfig,
  #[serde(default)]
  pub database: DatabaseConfig,
  #[serde(default)]
  pub model: ModelConfig,
  #[serde(default)]
  pub prompts: Prompts,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub port: u16,
}

impl Default for ServerConfig {
  fn default() -> Self { Self { port: 3000 } }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
  /// SQLite URL, or "memory" for the in-process store.
  pub url: String,
  pub max_connections: u32,
}

impl Default for DatabaseConfig {
  fn default() -> Self {
    Self { url: "sqlite://mathgen.db".into(), max_connections: 5 }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
  pub base_url: String,
  pub model: String,
  /// Name of the environment variable holding the credential. Read per request.
  pub api_key_env: String,
  pub timeout_secs: u64,
  pub temperature: f32,
}

impl Default for ModelConfig {
  fn default() -> Self {
    Self {
      base_url: "https://api.openai.com/v1".into(),
      model: "gpt-4o-mini".into(),
      api_key_env: "OPENAI_API_KEY".into(),
      timeout_secs: 60,
      temperature: 0.7,
    }
  }
}

/// Prompts sent to the model. Defaults target Primary 5 (Singapore) maths.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  /// System message attached to every call.
  pub json_system: String,
  /// Used by /generate when the request carries no prompt.
  pub generation_prompt: String,
  /// Grading prompt; `{problem_text}` and `{user_answer}` are substituted.
  pub evaluation_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      json_system: "You are a maths tutor for primary school students. Respond ONLY with strict JSON, no markdown.".into(),
      generation_prompt: DEFAULT_GENERATION_PROMPT.trim().into(),
      evaluation_template: DEFAULT_EVALUATION_TEMPLATE.trim().into(),
    }
  }
}

pub const DEFAULT_GENERATION_PROMPT: &str = r#"
Generate a math question for Primary 5 students in Singapore (always use metric system).
Immediately after the question, provide the correct numerical answer.
Format your output strictly as a JSON object with two keys:

1) problem_text: "[The generated math question goes here]"
2) final_answer: [The correct numerical answer goes here]

Example (for an easy arithmetic question):
{
  "problem_text": "What is 5 plus 3?",
  "final_answer": 8
}

Return only valid JSON, no markdown formatting, no explanations.
"#;

pub const DEFAULT_EVALUATION_TEMPLATE: &str = r#"
You check the correctness of a student's answer to a math problem.
The problem was generated for Primary 5 students in Singapore and may involve basic arithmetic, fractions, percentages, or simple geometry.

Respond with a JSON object containing the following keys:
1) is_correct: [true if the student's answer is correct, false otherwise]
2) correct_answer: [The correct numerical answer to the problem]
3) feedback: [A brief explanation of why the answer is correct or incorrect]

- Math Problem: {problem_text}
- Student's Answer: {user_answer}

Example response:
{
  "is_correct": true,
  "correct_answer": 42,
  "feedback": "Great job! Your answer is correct because ..."
}
"#;

impl AppConfig {
  /// File (if any) first, then environment overrides.
  pub fn load() -> Self {
    let mut cfg = load_config_file_from_env().unwrap_or_default();
    cfg.apply_env(|k| std::env::var(k).ok());
    cfg
  }

  fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
    if let Some(port) = get("PORT").and_then(|p| p.parse::<u16>().ok()) {
      self.server.port = port;
    }
    if let Some(url) = get("DATABASE_URL") {
      self.database.url = url;
    }
    if let Some(base) = get("OPENAI_BASE_URL") {
      self.model.base_url = base;
    }
    if let Some(model) = get("OPENAI_MODEL") {
      self.model.model = model;
    }
  }
}

/// Load `AppConfig` from MATHGEN_CONFIG_PATH. On any IO/parse error, returns None.
pub fn load_config_file_from_env() -> Option<AppConfig> {
  let path = std::env::var("MATHGEN_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "mathgen", %path, "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "mathgen", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "mathgen", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
