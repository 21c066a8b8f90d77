//! Application state: model client, store, credential source and prompts.
//!
//! Handlers keep no mutable state of their own; everything a request needs is
//! reached through `AppState`, and the credential is resolved per request.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::config::{AppConfig, Prompts};
use crate::credentials::CredentialSource;
use crate::error::AppError;
use crate::generator::TextGenerator;
use crate::openai::OpenAI;
use crate::store::{MemoryStore, ProblemStore, SqlStore};

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn TextGenerator>,
    pub store: Arc<dyn ProblemStore>,
    pub credentials: CredentialSource,
    pub prompts: Prompts,
}

impl AppState {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        store: Arc<dyn ProblemStore>,
        credentials: CredentialSource,
        prompts: Prompts,
    ) -> Self {
        Self { generator, store, credentials, prompts }
    }

    /// Build state from configuration: open the store and set up the model client.
    /// The API key is not read here.
    #[instrument(level = "info", skip_all)]
    pub async fn from_config(cfg: &AppConfig) -> Result<Self, AppError> {
        let store: Arc<dyn ProblemStore> = if cfg.database.url == "memory" {
            info!(target: "mathgen", "Using in-memory store (rows are lost on restart)");
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(SqlStore::connect(&cfg.database.url, cfg.database.max_connections).await?)
        };

        let openai = OpenAI::new(&cfg.model, &cfg.prompts.json_system)?;
        info!(target: "mathgen", base_url = %openai.base_url, model = %openai.model, key_env = %cfg.model.api_key_env, "Model client configured");

        Ok(Self::new(
            Arc::new(openai),
            store,
            CredentialSource::Env(cfg.model.api_key_env.clone()),
            cfg.prompts.clone(),
        ))
    }
}
