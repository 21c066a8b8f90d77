//! Outbound HTTP: the chat-completions client and the practice client, both
//! pointed at a wiremock server.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mathgen_backend::answer::AnswerInput;
use mathgen_backend::client::{ClientError, HttpPracticeClient, PracticeApi};
use mathgen_backend::config::ModelConfig;
use mathgen_backend::controller::{Phase, SessionController};
use mathgen_backend::credentials::ApiKey;
use mathgen_backend::error::AppError;
use mathgen_backend::generator::TextGenerator;
use mathgen_backend::openai::OpenAI;
use mathgen_backend::protocol::SubmitIn;

fn model_client(server: &MockServer) -> OpenAI {
  let cfg = ModelConfig {
    base_url: server.uri(),
    model: "test-model".into(),
    timeout_secs: 5,
    ..ModelConfig::default()
  };
  OpenAI::new(&cfg, "JSON only").expect("client builds")
}

fn completion(content: &str) -> serde_json::Value {
  json!({
    "choices": [{ "message": { "role": "assistant", "content": content } }],
    "usage": { "prompt_tokens": 12, "completion_tokens": 20, "total_tokens": 32 }
  })
}

#[tokio::test]
async fn chat_client_sends_key_model_and_json_mode() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/chat/completions"))
    .and(header("authorization", "Bearer sk-test"))
    .and(body_partial_json(json!({
      "model": "test-model",
      "response_format": { "type": "json_object" },
      "messages": [
        { "role": "system", "content": "JSON only" },
        { "role": "user", "content": "make a problem" }
      ]
    })))
    .respond_with(ResponseTemplate::new(200).set_body_json(completion(
      "  {\"problem_text\":\"What is 5 plus 3?\",\"final_answer\":8}\n",
    )))
    .expect(1)
    .mount(&server)
    .await;

  let text = model_client(&server)
    .generate(&ApiKey::new("sk-test"), "make a problem")
    .await
    .unwrap();
  assert_eq!(text, r#"{"problem_text":"What is 5 plus 3?","final_answer":8}"#);
}

#[tokio::test]
async fn provider_errors_become_generation_errors() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .respond_with(ResponseTemplate::new(401).set_body_json(json!({
      "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
    })))
    .mount(&server)
    .await;

  let err = model_client(&server).generate(&ApiKey::new("bad"), "p").await.unwrap_err();
  match err {
    AppError::Generation(msg) => assert!(msg.contains("Incorrect API key provided"), "{msg}"),
    other => panic!("unexpected error: {other:?}"),
  }
}

#[tokio::test]
async fn empty_completion_is_a_generation_error() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
    .mount(&server)
    .await;

  let err = model_client(&server).generate(&ApiKey::new("k"), "p").await.unwrap_err();
  assert!(matches!(err, AppError::Generation(_)));
}

#[tokio::test]
async fn practice_client_surfaces_server_error_text() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/submit"))
    .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "Problem not found" })))
    .mount(&server)
    .await;

  let client = HttpPracticeClient::new(&server.uri()).unwrap();
  let err = client
    .submit(&SubmitIn {
      session_id: "nope".into(),
      user_answer: AnswerInput::Number(1.0),
      problem_text: "q".into(),
    })
    .await
    .unwrap_err();
  match err {
    ClientError::Server { status, message } => {
      assert_eq!(status, 404);
      assert_eq!(message, "Problem not found");
    }
    other => panic!("unexpected error: {other:?}"),
  }
}

#[tokio::test]
async fn controller_over_http_round_trip() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/generate"))
    .and(body_partial_json(json!({ "prompt": "make a problem" })))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "id": "s1", "problem_text": "A book costs $5 and a pen costs $3. What is the total?"
    })))
    .mount(&server)
    .await;
  Mock::given(method("POST"))
    .and(path("/submit"))
    .and(body_partial_json(json!({ "sessionId": "s1", "userAnswer": 8.0 })))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "isCorrect": true, "correct_answer": 8, "feedback": "5 + 3 = 8"
    })))
    .mount(&server)
    .await;

  let mut ctl = SessionController::new(HttpPracticeClient::new(&server.uri()).unwrap(), "make a problem");
  ctl.new_problem().await;
  assert_eq!(ctl.phase(), Phase::ProblemShown);
  assert!(ctl.has_currency());

  ctl.set_answer("8");
  assert!(ctl.submit().await);
  assert_eq!(ctl.phase(), Phase::ResultShown);
  assert_eq!(ctl.is_correct(), Some(true));
  assert_eq!(ctl.feedback(), Some("5 + 3 = 8"));
}
