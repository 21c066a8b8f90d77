//! Model credential lookup, performed per request rather than at startup.
//!
//! A missing credential is a per-request configuration error, never a boot failure.

use std::fmt;

use crate::error::AppError;

/// API key for the model provider. Debug output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
  pub fn new(key: impl Into<String>) -> Self { Self(key.into()) }
  pub fn expose(&self) -> &str { &self.0 }
}

impl fmt::Debug for ApiKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("ApiKey(***)") }
}

#[derive(Clone, Debug)]
pub enum CredentialSource {
  /// Read the named environment variable on every call.
  Env(String),
  /// Fixed value (or fixed absence); used by tests and embedders.
  Fixed(Option<ApiKey>),
}

impl CredentialSource {
  pub fn resolve(&self) -> Result<ApiKey, AppError> {
    let raw = match self {
      CredentialSource::Env(var) => std::env::var(var).ok(),
      CredentialSource::Fixed(key) => key.as_ref().map(|k| k.expose().to_string()),
    };
    match raw {
      Some(k) if !k.trim().is_empty() => Ok(ApiKey::new(k.trim())),
      _ => Err(AppError::Configuration("API key not set".into())),
    }
  }
}
