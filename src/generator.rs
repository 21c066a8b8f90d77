//! The external text-generation capability, seen as a single async call.

use async_trait::async_trait;

use crate::credentials::ApiKey;
use crate::error::AppError;

/// Given a prompt, return the model's raw text completion.
/// Failures are reported as `AppError::Generation`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
  async fn generate(&self, api_key: &ApiKey, prompt: &str) -> Result<String, AppError>;
}
