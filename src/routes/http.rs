//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; failures are logged here and turned into a
//! JSON error body by `AppError`.

use std::sync::Arc;
use axum::{extract::{rejection::JsonRejection, State}, Json, response::IntoResponse};
use tracing::{error, info, instrument, warn};

use crate::error::AppError;
use crate::logic::{evaluate_answer, generate_problem};
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip_all)]
pub async fn http_post_generate(
  State(state): State<Arc<AppState>>,
  body: Result<Json<GenerateIn>, JsonRejection>,
) -> Result<Json<GenerateOut>, AppError> {
  let Json(body) = body.map_err(reject)?;
  let prompt = match body.prompt.as_deref().map(str::trim) {
    Some(p) if !p.is_empty() => p.to_string(),
    _ => state.prompts.generation_prompt.clone(),
  };

  match generate_problem(&state, &prompt).await {
    Ok(out) => {
      info!(target: "problem", id = %out.id, "HTTP generate served");
      Ok(Json(out))
    }
    Err(e) => {
      error!(target: "problem", kind = e.kind(), error = %e, "HTTP generate failed");
      Err(e)
    }
  }
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_submit(
  State(state): State<Arc<AppState>>,
  body: Result<Json<SubmitIn>, JsonRejection>,
) -> Result<Json<SubmitOut>, AppError> {
  let Json(body) = body.map_err(reject)?;

  match evaluate_answer(&state, &body.session_id, &body.user_answer, &body.problem_text).await {
    Ok(out) => {
      info!(target: "problem", id = %body.session_id, is_correct = out.is_correct, "HTTP submit evaluated");
      Ok(Json(out))
    }
    Err(e) => {
      error!(target: "problem", id = %body.session_id, kind = e.kind(), error = %e, "HTTP submit failed");
      Err(e)
    }
  }
}

fn reject(r: JsonRejection) -> AppError {
  warn!(target: "mathgen", error = %r.body_text(), "Rejected request body");
  AppError::Validation(r.body_text())
}
