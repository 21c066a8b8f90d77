//! Maths practice backend
//!
//! - Axum HTTP API: POST /generate, POST /submit, GET /health
//! - OpenAI-compatible model client (credential read per request)
//! - SQLite persistence (or in-memory with DATABASE_URL=memory)
//! - Static form fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   DATABASE_URL        : default "sqlite://mathgen.db"; "memory" for no file
//!   OPENAI_API_KEY      : model credential, read on every request
//!   OPENAI_BASE_URL     : default "https://api.openai.com/v1"
//!   OPENAI_MODEL        : default "gpt-4o-mini"
//!   MATHGEN_CONFIG_PATH : optional TOML config (prompts + settings)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use mathgen_backend::config::AppConfig;
use mathgen_backend::routes::build_router;
use mathgen_backend::state::AppState;
use mathgen_backend::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let cfg = AppConfig::load();

  // Store + model client; the API key is looked up per request, not here.
  let state = Arc::new(AppState::from_config(&cfg).await?);

  let app = build_router(state);

  let addr = SocketAddr::from(([0, 0, 0, 0], cfg.server.port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "mathgen", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      let _ = tokio::signal::ctrl_c().await;
      info!(target: "mathgen", "Shutting down");
    })
    .await?;
  Ok(())
}
