//! Terminal practice client.
//!
//! Talks to a running backend (PRACTICE_SERVER_URL, default http://127.0.0.1:3000).
//! Commands: `n` new problem, `q` quit, anything else is submitted as the answer.

use tokio::io::{AsyncBufReadExt, BufReader};

use mathgen_backend::client::HttpPracticeClient;
use mathgen_backend::config::AppConfig;
use mathgen_backend::controller::{Phase, SessionController};
use mathgen_backend::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_client_tracing();

  let base_url = std::env::var("PRACTICE_SERVER_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".into());
  let prompt = AppConfig::load().prompts.generation_prompt;
  let mut ctl = SessionController::new(HttpPracticeClient::new(&base_url)?, prompt);

  println!("Math Problem Generator ({base_url})");
  println!("[n] new problem   [q] quit   otherwise type your answer");

  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  while let Some(line) = lines.next_line().await? {
    match line.trim() {
      "q" => break,
      "n" => {
        println!("Generating...");
        ctl.new_problem().await;
      }
      "" => continue,
      answer => {
        ctl.set_answer(answer);
        if !ctl.submit().await {
          println!("Ask for a problem first with [n].");
          continue;
        }
      }
    }
    render(&ctl);
  }
  Ok(())
}

fn render<A: mathgen_backend::client::PracticeApi>(ctl: &SessionController<A>) {
  if let Some(problem) = ctl.problem() {
    println!("\nProblem:\n  {problem}");
  }
  if let Some(feedback) = ctl.feedback() {
    let heading = match (ctl.phase(), ctl.is_correct()) {
      (Phase::ResultShown, Some(true)) => "✅ Correct!",
      (Phase::ResultShown, _) => "❌ Not quite right",
      _ => "",
    };
    if !heading.is_empty() {
      println!("{heading}");
    }
    println!("  {feedback}");
  }
  if ctl.problem().is_some() {
    let prefix = if ctl.has_currency() { "$" } else { "" };
    print_prompt(prefix);
  }
}

fn print_prompt(prefix: &str) {
  use std::io::Write;
  print!("Your answer: {prefix}");
  let _ = std::io::stdout().flush();
}
