//! Domain models: generated problem sessions and graded submissions.

use chrono::{DateTime, Utc};

/// One generated problem plus its ground-truth answer. Immutable once stored.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct ProblemSession {
  pub id: String,
  pub problem_text: String,
  pub correct_answer: f64,
  pub created_at: DateTime<Utc>,
}

/// One graded attempt against a session. Many submissions may point at one session.
#[derive(Clone, Debug)]
pub struct Submission {
  pub id: String,
  pub session_id: String,
  /// Coerced answer; NaN when the input was not numeric.
  pub user_answer: f64,
  pub is_correct: bool,
  pub feedback_text: String,
  pub created_at: DateTime<Utc>,
}

/// Fields supplied by the evaluator; id and timestamp are assigned by the store.
#[derive(Clone, Debug)]
pub struct NewSubmission {
  pub session_id: String,
  pub user_answer: f64,
  pub is_correct: bool,
  pub feedback_text: String,
}
