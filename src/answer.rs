//! Loosely-typed student answers and their numeric coercion.
//!
//! Answers may arrive as a JSON number, a numeric string, or anything else.
//! Coercion never fails: input that is not a finite number becomes NaN, which
//! compares unequal to every stored answer. Reading the value never fails
//! either, so a number too large for `f64` still reaches grading.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnswerInput {
  Number(f64),
  Text(String),
  /// Valid JSON that does not fit a JSON value we can hold (e.g. `1e400`); kept verbatim.
  Unrepresentable(String),
  Other(serde_json::Value),
}

impl Default for AnswerInput {
  fn default() -> Self { AnswerInput::Other(serde_json::Value::Null) }
}

impl<'de> Deserialize<'de> for AnswerInput {
  fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
    let raw = Box::<RawValue>::deserialize(d)?;
    Ok(AnswerInput::from_json(raw.get()))
  }
}

impl AnswerInput {
  /// Classify one raw JSON value.
  pub fn from_json(raw: &str) -> Self {
    match serde_json::from_str::<serde_json::Value>(raw) {
      Ok(serde_json::Value::Number(n)) => match n.as_f64() {
        Some(f) => AnswerInput::Number(f),
        None => AnswerInput::Unrepresentable(raw.trim().to_string()),
      },
      Ok(serde_json::Value::String(s)) => AnswerInput::Text(s),
      Ok(other) => AnswerInput::Other(other),
      Err(_) => AnswerInput::Unrepresentable(raw.trim().to_string()),
    }
  }

  /// Numeric value used for comparison and storage.
  pub fn coerce(&self) -> f64 {
    match self {
      AnswerInput::Number(n) => *n,
      AnswerInput::Text(s) => coerce_text(s),
      AnswerInput::Unrepresentable(_) | AnswerInput::Other(_) => f64::NAN,
    }
  }
}

impl fmt::Display for AnswerInput {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AnswerInput::Number(n) => write!(f, "{}", n),
      AnswerInput::Text(s) | AnswerInput::Unrepresentable(s) => f.write_str(s),
      AnswerInput::Other(v) => write!(f, "{}", v),
    }
  }
}

fn coerce_text(s: &str) -> f64 {
  let t = s.trim();
  if t.is_empty() { return f64::NAN; }
  // Rust accepts "inf"/"nan" spellings; a student typing those did not give a number.
  if t.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
    return f64::NAN;
  }
  // Overflowing text like "1e400" parses to infinity.
  match t.parse::<f64>() {
    Ok(n) if n.is_finite() => n,
    _ => f64::NAN,
  }
}

/// Correctness decision: numeric equality against the stored ground truth.
pub fn answers_match(user_answer: f64, correct_answer: f64) -> bool {
  user_answer == correct_answer
}
