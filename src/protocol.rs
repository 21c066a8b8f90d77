//! Public HTTP request/response structs (serde ready).
//! Shared by the server handlers and the practice client, so field names here
//! are the wire contract.

use serde::{Deserialize, Serialize};

use crate::answer::AnswerInput;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct GenerateIn {
    /// Full instruction text; the configured default is used when absent or blank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// Never carries the correct answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateOut {
    pub id: String,
    pub problem_text: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SubmitIn {
    #[serde(rename = "sessionId", default)]
    pub session_id: String,
    #[serde(rename = "userAnswer", default)]
    pub user_answer: AnswerInput,
    #[serde(default)]
    pub problem_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitOut {
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
    pub correct_answer: f64,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn submit_in_uses_camel_case_ids_and_tolerates_missing_fields() {
        let s: SubmitIn = serde_json::from_str(
            r#"{"sessionId":"s1","userAnswer":8,"problem_text":"What is 5 plus 3?"}"#,
        )
        .unwrap();
        assert_eq!(s.session_id, "s1");
        assert_eq!(s.user_answer, AnswerInput::Number(8.0));

        let empty: SubmitIn = serde_json::from_str("{}").unwrap();
        assert!(empty.session_id.is_empty());
        assert!(empty.user_answer.coerce().is_nan());
    }

    #[test]
    fn submit_in_accepts_an_answer_beyond_f64_range() {
        let s: SubmitIn =
            serde_json::from_str(r#"{"sessionId":"s","userAnswer":1e400,"problem_text":"q"}"#).unwrap();
        assert_eq!(s.session_id, "s");
        assert!(s.user_answer.coerce().is_nan());
    }

    #[test]
    fn submit_out_serializes_is_correct_in_camel_case() {
        let v = serde_json::to_value(SubmitOut {
            is_correct: true,
            correct_answer: 8.0,
            feedback: "Well done".into(),
        })
        .unwrap();
        assert_eq!(v, json!({ "isCorrect": true, "correct_answer": 8.0, "feedback": "Well done" }));
    }
}
