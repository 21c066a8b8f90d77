//! HTTP client for the two endpoints, used by the practice controller.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::protocol::{ErrorOut, GenerateIn, GenerateOut, SubmitIn, SubmitOut};

#[derive(Error, Debug)]
pub enum ClientError {
  #[error("{0}")]
  Transport(#[from] reqwest::Error),

  /// Non-2xx response; message is the server's `error` text when present.
  #[error("{message}")]
  Server { status: u16, message: String },
}

/// The only way the controller reaches the network.
#[async_trait]
pub trait PracticeApi: Send + Sync {
  async fn generate(&self, prompt: &str) -> Result<GenerateOut, ClientError>;
  async fn submit(&self, req: &SubmitIn) -> Result<SubmitOut, ClientError>;
}

#[derive(Clone)]
pub struct HttpPracticeClient {
  client: reqwest::Client,
  base_url: String,
}

impl HttpPracticeClient {
  pub fn new(base_url: &str) -> Result<Self, ClientError> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(90))
      .build()?;
    Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
  }

  async fn post<I: serde::Serialize + Sync, O: serde::de::DeserializeOwned>(
    &self,
    path: &str,
    body: &I,
  ) -> Result<O, ClientError> {
    let res = self.client.post(format!("{}{}", self.base_url, path)).json(body).send().await?;
    let status = res.status();
    if !status.is_success() {
      let text = res.text().await.unwrap_or_default();
      let message = serde_json::from_str::<ErrorOut>(&text)
        .map(|e| e.error)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("request failed").to_string());
      return Err(ClientError::Server { status: status.as_u16(), message });
    }
    Ok(res.json::<O>().await?)
  }
}

#[async_trait]
impl PracticeApi for HttpPracticeClient {
  async fn generate(&self, prompt: &str) -> Result<GenerateOut, ClientError> {
    self.post("/generate", &GenerateIn { prompt: Some(prompt.to_string()) }).await
  }

  async fn submit(&self, req: &SubmitIn) -> Result<SubmitOut, ClientError> {
    self.post("/submit", req).await
  }
}
