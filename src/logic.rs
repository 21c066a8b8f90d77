//! Core behaviors behind the two endpoints.
//!
//!   - `generate_problem`: prompt → model → parse → one session row
//!   - `evaluate_answer`: grading prompt → model → parse → session lookup →
//!     deterministic grading → one submission row
//!
//! Each runs strictly in sequence; any failure ends the request with no write
//! after it. Correctness comes from the stored answer, never from the model.

use serde::Deserialize;
use tracing::{info, instrument};

use crate::answer::{answers_match, AnswerInput};
use crate::domain::NewSubmission;
use crate::error::AppError;
use crate::protocol::{GenerateOut, SubmitOut};
use crate::state::AppState;
use crate::util::{fill_template, trunc_for_log};

/// Shape the model must return for a new problem.
#[derive(Debug, Deserialize)]
struct GeneratedProblem {
  problem_text: String,
  final_answer: f64,
}

/// Shape the model must return when grading. Its own verdict is read but unused.
#[derive(Debug, Deserialize)]
struct Grading {
  #[serde(rename = "is_correct")]
  _is_correct: bool,
  correct_answer: f64,
  feedback: String,
}

fn parse_generated(raw: &str) -> Result<GeneratedProblem, AppError> {
  let p: GeneratedProblem = serde_json::from_str(raw)
    .map_err(|e| AppError::Generation(format!("Model returned malformed problem JSON: {e}")))?;
  if p.problem_text.trim().is_empty() {
    return Err(AppError::Generation("Model returned an empty problem_text".into()));
  }
  Ok(p)
}

fn parse_grading(raw: &str) -> Result<Grading, AppError> {
  serde_json::from_str(raw)
    .map_err(|e| AppError::Generation(format!("Model returned malformed grading JSON: {e}")))
}

/// Generate one problem and persist it. The answer stays server-side.
#[instrument(level = "info", skip(state, prompt), fields(prompt_len = prompt.len()))]
pub async fn generate_problem(state: &AppState, prompt: &str) -> Result<GenerateOut, AppError> {
  let api_key = state.credentials.resolve()?;

  let raw = state.generator.generate(&api_key, prompt).await?;
  let parsed = parse_generated(&raw)?;

  let session = state.store.insert_session(parsed.problem_text.trim(), parsed.final_answer).await?;
  info!(target: "problem", id = %session.id, preview = %trunc_for_log(&session.problem_text, 60), "Problem session created");

  Ok(GenerateOut { id: session.id, problem_text: session.problem_text })
}

/// Grade one answer against the stored session and record the submission.
///
/// `problem_text` is the caller's copy and only feeds the grading prompt; the
/// verdict is computed from the stored `correct_answer`.
#[instrument(level = "info", skip_all, fields(%session_id, answer = %user_answer, problem_len = problem_text.len()))]
pub async fn evaluate_answer(
  state: &AppState,
  session_id: &str,
  user_answer: &AnswerInput,
  problem_text: &str,
) -> Result<SubmitOut, AppError> {
  let api_key = state.credentials.resolve()?;

  let answer_text = user_answer.to_string();
  let prompt = fill_template(
    &state.prompts.evaluation_template,
    &[("problem_text", problem_text), ("user_answer", &answer_text)],
  );
  let raw = state.generator.generate(&api_key, &prompt).await?;
  let grading = parse_grading(&raw)?;

  let session = state
    .store
    .get_session(session_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Problem not found".into()))?;

  let answer = user_answer.coerce();
  let is_correct = answers_match(answer, session.correct_answer);

  let sub = state
    .store
    .insert_submission(NewSubmission {
      session_id: session.id.clone(),
      user_answer: answer,
      is_correct,
      feedback_text: grading.feedback.clone(),
    })
    .await?;
  info!(target: "problem", id = %session.id, submission = %sub.id, %is_correct, "Answer evaluated");

  Ok(SubmitOut {
    is_correct,
    correct_answer: grading.correct_answer,
    feedback: grading.feedback,
  })
}
