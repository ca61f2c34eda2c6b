use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::debug;

use crate::auth::AuthSession;
use crate::config::AppConfig;
use crate::importer::{HttpExtractor, Importer, LlmRecipeInference};
use crate::llm::{OpenAiClient, OpenAiClientConfig};
use crate::store::{JsonFileStore, PgRemoteStore, RecipeStore, RemoteStore};

/// Everything a command needs, built once in `main`.
pub struct App {
    pub config: AppConfig,
    pub session: AuthSession,
    pub store: RecipeStore,
    pub pool: Option<PgPool>,
}

impl App {
    pub async fn build(config: AppConfig) -> Result<Self> {
        let session = AuthSession::open(&config.data_dir).await?;
        let pool = config.remote_pool()?;
        let remote = pool.clone().map(|p| Arc::new(PgRemoteStore::new(p)) as Arc<dyn RemoteStore>);
        let local = JsonFileStore::in_dir(&config.data_dir);
        debug!(path = %local.path().display(), remote = remote.is_some(), "recipe store");
        let store = RecipeStore::new(remote, Arc::new(local));
        Ok(App { config, session, store, pool })
    }

    /// URL and manual importer over the shared store. The inference client is only
    /// contacted by URL imports.
    pub fn importer(&self) -> Result<Importer> {
        let extractor = HttpExtractor::new(self.config.fetch_timeout, self.config.max_content_chars)
            .context("build HTTP client")?;
        let client = OpenAiClient::new(OpenAiClientConfig::from_env()).context("build inference client")?;
        let inference = LlmRecipeInference::new(Arc::new(client));
        Ok(Importer::new(self.store.clone(), Arc::new(extractor), Arc::new(inference)))
    }
}
