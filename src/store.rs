//! Persistence for problem sessions and submissions.
//!
//! Two tables, insert and lookup-by-id only:
//!   - math_problem_sessions    (id, problem_text, correct_answer, created_at)
//!   - math_problem_submissions (id, session_id, user_answer, is_correct, feedback_text, created_at)
//!
//! `SqlStore` is the SQLite-backed implementation; `MemoryStore` keeps rows in
//! process memory and is selected with DATABASE_URL=memory.

use std::{collections::HashMap, str::FromStr, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::{NewSubmission, ProblemSession, Submission};
use crate::error::AppError;

#[async_trait]
pub trait ProblemStore: Send + Sync {
  /// Create a session row; the store assigns id and timestamp.
  async fn insert_session(&self, problem_text: &str, correct_answer: f64) -> Result<ProblemSession, AppError>;

  /// `Ok(None)` when no session has this id.
  async fn get_session(&self, id: &str) -> Result<Option<ProblemSession>, AppError>;

  async fn insert_submission(&self, sub: NewSubmission) -> Result<Submission, AppError>;
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct SqlStore {
  pool: SqlitePool,
}

impl SqlStore {
  /// Open (creating if missing) the database at `url` and ensure the schema.
  #[instrument(level = "info", skip_all, fields(%url))]
  pub async fn connect(url: &str, max_connections: u32) -> Result<Self, AppError> {
    let opts = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
      .max_connections(max_connections.max(1))
      .connect_with(opts)
      .await?;
    let store = Self { pool };
    store.migrate().await?;
    info!(target: "mathgen", "SQLite store ready");
    Ok(store)
  }

  /// Private in-memory database. A single connection that never expires, since
  /// each SQLite memory connection is its own database.
  pub async fn in_memory() -> Result<Self, AppError> {
    let pool = SqlitePoolOptions::new()
      .max_connections(1)
      .idle_timeout(None)
      .max_lifetime(None)
      .connect("sqlite::memory:")
      .await?;
    let store = Self { pool };
    store.migrate().await?;
    Ok(store)
  }

  pub fn pool(&self) -> &SqlitePool { &self.pool }

  async fn migrate(&self) -> Result<(), AppError> {
    sqlx::query(
      "CREATE TABLE IF NOT EXISTS math_problem_sessions (
         id             TEXT PRIMARY KEY,
         problem_text   TEXT NOT NULL,
         correct_answer REAL NOT NULL,
         created_at     TEXT NOT NULL
       )",
    )
    .execute(&self.pool)
    .await?;

    // user_answer is NULL when the submitted value was not a number.
    sqlx::query(
      "CREATE TABLE IF NOT EXISTS math_problem_submissions (
         id            TEXT PRIMARY KEY,
         session_id    TEXT NOT NULL,
         user_answer   REAL,
         is_correct    INTEGER NOT NULL,
         feedback_text TEXT NOT NULL,
         created_at    TEXT NOT NULL
       )",
    )
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  pub async fn count_sessions(&self) -> Result<i64, AppError> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM math_problem_sessions")
      .fetch_one(&self.pool)
      .await?;
    Ok(row.0)
  }

  pub async fn count_submissions(&self) -> Result<i64, AppError> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM math_problem_submissions")
      .fetch_one(&self.pool)
      .await?;
    Ok(row.0)
  }
}

#[async_trait]
impl ProblemStore for SqlStore {
  #[instrument(level = "debug", skip(self, problem_text), fields(text_len = problem_text.len()))]
  async fn insert_session(&self, problem_text: &str, correct_answer: f64) -> Result<ProblemSession, AppError> {
    let session = ProblemSession {
      id: Uuid::new_v4().to_string(),
      problem_text: problem_text.to_string(),
      correct_answer,
      created_at: Utc::now(),
    };
    sqlx::query(
      "INSERT INTO math_problem_sessions (id, problem_text, correct_answer, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&session.id)
    .bind(&session.problem_text)
    .bind(session.correct_answer)
    .bind(session.created_at)
    .execute(&self.pool)
    .await?;
    debug!(target: "mathgen", id = %session.id, "Session row inserted");
    Ok(session)
  }

  #[instrument(level = "debug", skip(self))]
  async fn get_session(&self, id: &str) -> Result<Option<ProblemSession>, AppError> {
    let row = sqlx::query_as::<_, ProblemSession>(
      "SELECT id, problem_text, correct_answer, created_at FROM math_problem_sessions WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(row)
  }

  #[instrument(level = "debug", skip(self, sub), fields(session_id = %sub.session_id, is_correct = sub.is_correct))]
  async fn insert_submission(&self, sub: NewSubmission) -> Result<Submission, AppError> {
    let row = Submission {
      id: Uuid::new_v4().to_string(),
      session_id: sub.session_id,
      user_answer: sub.user_answer,
      is_correct: sub.is_correct,
      feedback_text: sub.feedback_text,
      created_at: Utc::now(),
    };
    let stored_answer = if row.user_answer.is_nan() { None } else { Some(row.user_answer) };
    sqlx::query(
      "INSERT INTO math_problem_submissions (id, session_id, user_answer, is_correct, feedback_text, created_at)
       VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&row.id)
    .bind(&row.session_id)
    .bind(stored_answer)
    .bind(row.is_correct)
    .bind(&row.feedback_text)
    .bind(row.created_at)
    .execute(&self.pool)
    .await?;
    debug!(target: "mathgen", id = %row.id, "Submission row inserted");
    Ok(row)
  }
}

// ---------------------------------------------------------------------------
// In-process memory
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MemoryStore {
  sessions: Arc<RwLock<HashMap<String, ProblemSession>>>,
  submissions: Arc<RwLock<Vec<Submission>>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  pub async fn count_sessions(&self) -> usize { self.sessions.read().await.len() }

  pub async fn count_submissions(&self) -> usize { self.submissions.read().await.len() }

  /// Submissions recorded for a session, oldest first.
  pub async fn submissions_for(&self, session_id: &str) -> Vec<Submission> {
    self.submissions.read().await
      .iter()
      .filter(|s| s.session_id == session_id)
      .cloned()
      .collect()
  }
}

#[async_trait]
impl ProblemStore for MemoryStore {
  async fn insert_session(&self, problem_text: &str, correct_answer: f64) -> Result<ProblemSession, AppError> {
    let session = ProblemSession {
      id: Uuid::new_v4().to_string(),
      problem_text: problem_text.to_string(),
      correct_answer,
      created_at: Utc::now(),
    };
    self.sessions.write().await.insert(session.id.clone(), session.clone());
    Ok(session)
  }

  async fn get_session(&self, id: &str) -> Result<Option<ProblemSession>, AppError> {
    Ok(self.sessions.read().await.get(id).cloned())
  }

  async fn insert_submission(&self, sub: NewSubmission) -> Result<Submission, AppError> {
    let row = Submission {
      id: Uuid::new_v4().to_string(),
      session_id: sub.session_id,
      user_answer: sub.user_answer,
      is_correct: sub.is_correct,
      feedback_text: sub.feedback_text,
      created_at: Utc::now(),
    };
    self.submissions.write().await.push(row.clone());
    Ok(row)
  }
}
