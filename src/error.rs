//! Error taxonomy shared by the generator, evaluator and HTTP layer.
//!
//! Every failure is converted into a JSON `{ "error": ... }` body at the handler
//! boundary. Only `NotFound` (404) and `Validation` (400) get their own status;
//! everything else collapses to 500.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use thiserror::Error;

use crate::protocol::ErrorOut;

#[derive(Error, Debug)]
pub enum AppError {
  /// No model credential available at request time.
  #[error("{0}")]
  Configuration(String),

  /// Model call failed or returned output that does not match the expected shape.
  #[error("{0}")]
  Generation(String),

  /// Store read/write failed.
  #[error("{0}")]
  Persistence(String),

  /// Referenced session does not exist.
  #[error("{0}")]
  NotFound(String),

  /// Request body could not be understood.
  #[error("{0}")]
  Validation(String),
}

impl AppError {
  pub fn status(&self) -> StatusCode {
    match self {
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Configuration(_) | AppError::Generation(_) | AppError::Persistence(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  /// Short label used in log fields.
  pub fn kind(&self) -> &'static str {
    match self {
      AppError::Configuration(_) => "configuration",
      AppError::Generation(_) => "generation",
      AppError::Persistence(_) => "persistence",
      AppError::NotFound(_) => "not_found",
      AppError::Validation(_) => "validation",
    }
  }
}

impl From<sqlx::Error> for AppError {
  fn from(e: sqlx::Error) -> Self {
    AppError::Persistence(e.to_string())
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    (self.status(), Json(ErrorOut { error: self.to_string() })).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_not_found_and_validation_get_distinct_statuses() {
    assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
    for e in [
      AppError::Configuration("x".into()),
      AppError::Generation("x".into()),
      AppError::Persistence("x".into()),
    ] {
      assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
  }

  #[tokio::test]
  async fn response_body_carries_the_message() {
    let resp = AppError::Persistence("disk full".into()).into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"], "disk full");
  }
}
