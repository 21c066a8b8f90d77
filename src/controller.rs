//! Client-side practice session: one problem at a time, any number of attempts.
//!
//! ```text
//! Idle ──new_problem──▶ Generating ──ok──▶ ProblemShown ──submit──▶ Submitting ──ok──▶ ResultShown
//!                           │ err                  ▲                    │ err              │
//!                           ▼                      └────────────────────┘                  │
//!                          Idle                    ▲                 submit (retry)        │
//!                                                  └───────────────────────────────────────┘
//! ```
//!
//! The true answer is never held here. `loading` is advisory only.

use tracing::{debug, instrument};

use crate::answer::AnswerInput;
use crate::client::PracticeApi;
use crate::protocol::SubmitIn;

const CURRENCY_SYMBOLS: &str = "$€£¥₹₩₽₺₪₫₴₦₱₲₵₡₢₣₤₥₧₨₭₮₯₰₳₸₼₾₿";

/// True if the text contains any currency symbol. Display-only.
pub fn mentions_currency(text: &str) -> bool {
  text.chars().any(|c| CURRENCY_SYMBOLS.contains(c))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
  Idle,
  Generating,
  ProblemShown,
  Submitting,
  ResultShown,
}

pub struct SessionController<A: PracticeApi> {
  api: A,
  prompt: String,
  phase: Phase,
  problem: Option<String>,
  session_id: Option<String>,
  answer: String,
  feedback: Option<String>,
  is_correct: Option<bool>,
  has_currency: bool,
  loading: bool,
}

impl<A: PracticeApi> SessionController<A> {
  pub fn new(api: A, prompt: impl Into<String>) -> Self {
    Self {
      api,
      prompt: prompt.into(),
      phase: Phase::Idle,
      problem: None,
      session_id: None,
      answer: String::new(),
      feedback: None,
      is_correct: None,
      has_currency: false,
      loading: false,
    }
  }

  pub fn phase(&self) -> Phase { self.phase }
  pub fn problem(&self) -> Option<&str> { self.problem.as_deref() }
  pub fn session_id(&self) -> Option<&str> { self.session_id.as_deref() }
  pub fn answer(&self) -> &str { &self.answer }
  pub fn feedback(&self) -> Option<&str> { self.feedback.as_deref() }
  pub fn is_correct(&self) -> Option<bool> { self.is_correct }
  pub fn has_currency(&self) -> bool { self.has_currency }
  pub fn is_loading(&self) -> bool { self.loading }

  pub fn set_answer(&mut self, answer: impl Into<String>) {
    self.answer = answer.into();
  }

  /// Whether `submit` would do anything right now.
  pub fn can_submit(&self) -> bool {
    !self.loading
      && self.session_id.is_some()
      && !self.answer.trim().is_empty()
      && matches!(self.phase, Phase::ProblemShown | Phase::ResultShown)
  }

  /// Request a fresh problem, discarding the current one.
  #[instrument(level = "debug", skip(self))]
  pub async fn new_problem(&mut self) {
    self.answer.clear();
    self.feedback = None;
    self.is_correct = None;
    self.problem = None;
    self.session_id = None;
    self.has_currency = false;
    self.phase = Phase::Generating;
    self.loading = true;

    match self.api.generate(&self.prompt).await {
      Ok(out) => {
        self.has_currency = mentions_currency(&out.problem_text);
        self.problem = Some(out.problem_text);
        self.session_id = Some(out.id);
        self.phase = Phase::ProblemShown;
      }
      Err(e) => {
        debug!(error = %e, "generate failed");
        self.feedback = Some(format!("An error occurred: {e}"));
        self.phase = Phase::Idle;
      }
    }
    self.loading = false;
  }

  /// Submit the current answer. Returns false (and changes nothing) when
  /// there is no active problem or the answer is empty.
  #[instrument(level = "debug", skip(self))]
  pub async fn submit(&mut self) -> bool {
    if !self.can_submit() {
      return false;
    }
    let (Some(session_id), Some(problem)) = (self.session_id.clone(), self.problem.clone()) else {
      return false;
    };

    self.phase = Phase::Submitting;
    self.loading = true;
    self.feedback = None;
    self.is_correct = None;

    // Send a JSON number when the input parses; the server coerces either way.
    let typed = AnswerInput::Text(self.answer.trim().to_string());
    let value = typed.coerce();
    let user_answer = if value.is_nan() { typed } else { AnswerInput::Number(value) };

    let req = SubmitIn {
      session_id,
      user_answer,
      problem_text: problem,
    };
    match self.api.submit(&req).await {
      Ok(out) => {
        self.is_correct = Some(out.is_correct);
        self.feedback = Some(out.feedback);
        self.phase = Phase::ResultShown;
      }
      Err(e) => {
        debug!(error = %e, "submit failed");
        self.feedback = Some(format!("An error occurred: {e}"));
        self.is_correct = None;
        self.phase = Phase::ProblemShown;
      }
    }
    self.loading = false;
    true
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use async_trait::async_trait;

  use super::*;
  use crate::client::ClientError;
  use crate::protocol::{GenerateOut, SubmitOut};

  #[derive(Default)]
  struct FakeApi {
    generated: Mutex<Vec<Result<GenerateOut, String>>>,
    graded: Mutex<Vec<Result<SubmitOut, String>>>,
    submitted: Mutex<Vec<SubmitIn>>,
  }

  fn server_err(msg: String) -> ClientError {
    ClientError::Server { status: 500, message: msg }
  }

  #[async_trait]
  impl PracticeApi for FakeApi {
    async fn generate(&self, _prompt: &str) -> Result<GenerateOut, ClientError> {
      self.generated.lock().unwrap().remove(0).map_err(server_err)
    }
    async fn submit(&self, req: &SubmitIn) -> Result<SubmitOut, ClientError> {
      self.submitted.lock().unwrap().push(req.clone());
      self.graded.lock().unwrap().remove(0).map_err(server_err)
    }
  }

  fn problem(id: &str, text: &str) -> Result<GenerateOut, String> {
    Ok(GenerateOut { id: id.into(), problem_text: text.into() })
  }

  fn graded(ok: bool, feedback: &str) -> Result<SubmitOut, String> {
    Ok(SubmitOut { is_correct: ok, correct_answer: 8.0, feedback: feedback.into() })
  }

  fn controller(api: FakeApi) -> SessionController<FakeApi> {
    SessionController::new(api, "make a problem")
  }

  #[test]
  fn currency_detection() {
    assert!(mentions_currency("A pen costs $3.50."));
    assert!(mentions_currency("It costs €4"));
    assert!(mentions_currency("₹ 100"));
    assert!(!mentions_currency("A rope is 3.5 m long."));
  }

  #[tokio::test]
  async fn generate_then_retry_then_correct() {
    let api = FakeApi::default();
    *api.generated.lock().unwrap() = vec![problem("s1", "What is 5 plus 3?")];
    *api.graded.lock().unwrap() = vec![graded(false, "Not quite."), graded(true, "Yes!")];
    let mut c = controller(api);

    c.new_problem().await;
    assert_eq!(c.phase(), Phase::ProblemShown);
    assert_eq!(c.session_id(), Some("s1"));
    assert!(!c.has_currency());

    c.set_answer("7");
    assert!(c.submit().await);
    assert_eq!(c.phase(), Phase::ResultShown);
    assert_eq!(c.is_correct(), Some(false));
    assert_eq!(c.problem(), Some("What is 5 plus 3?"));

    c.set_answer("8");
    assert!(c.submit().await);
    assert_eq!(c.is_correct(), Some(true));
    assert_eq!(c.feedback(), Some("Yes!"));

    let sent = c.api.submitted.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].session_id, "s1");
    assert_eq!(sent[1].user_answer, AnswerInput::Number(8.0));
    assert_eq!(sent[1].problem_text, "What is 5 plus 3?");
  }

  #[tokio::test]
  async fn submit_without_problem_or_answer_is_a_no_op() {
    let api = FakeApi::default();
    *api.generated.lock().unwrap() = vec![problem("s1", "q")];
    let mut c = controller(api);

    c.set_answer("3");
    assert!(!c.submit().await);
    assert_eq!(c.phase(), Phase::Idle);

    c.new_problem().await;
    c.set_answer("   ");
    assert!(!c.submit().await);
    assert_eq!(c.phase(), Phase::ProblemShown);
    assert!(c.api.submitted.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn generate_failure_returns_to_idle_with_message() {
    let api = FakeApi::default();
    *api.generated.lock().unwrap() = vec![problem("s1", "Costs $5"), Err("API key not set".into())];
    let mut c = controller(api);

    c.new_problem().await;
    assert!(c.has_currency());
    c.new_problem().await;
    assert_eq!(c.phase(), Phase::Idle);
    assert_eq!(c.problem(), None);
    assert_eq!(c.session_id(), None);
    assert!(!c.has_currency());
    assert_eq!(c.feedback(), Some("An error occurred: API key not set"));
    assert!(!c.is_loading());
  }

  #[tokio::test]
  async fn submit_failure_keeps_problem_for_retry() {
    let api = FakeApi::default();
    *api.generated.lock().unwrap() = vec![problem("s1", "q")];
    *api.graded.lock().unwrap() = vec![graded(true, "ok"), Err("Problem not found".into())];
    let mut c = controller(api);

    c.new_problem().await;
    c.set_answer("8");
    c.submit().await;
    assert_eq!(c.is_correct(), Some(true));

    assert!(c.submit().await);
    assert_eq!(c.phase(), Phase::ProblemShown);
    assert_eq!(c.is_correct(), None);
    assert_eq!(c.problem(), Some("q"));
    assert_eq!(c.feedback(), Some("An error occurred: Problem not found"));
    assert!(c.can_submit());
  }

  #[tokio::test]
  async fn new_problem_clears_previous_attempt() {
    let api = FakeApi::default();
    *api.generated.lock().unwrap() = vec![problem("s1", "q1"), problem("s2", "q2")];
    *api.graded.lock().unwrap() = vec![graded(false, "no")];
    let mut c = controller(api);

    c.new_problem().await;
    c.set_answer("1");
    c.submit().await;
    c.new_problem().await;
    assert_eq!(c.session_id(), Some("s2"));
    assert_eq!(c.answer(), "");
    assert_eq!(c.feedback(), None);
    assert_eq!(c.is_correct(), None);
  }
}
