use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

pub const DEFAULT_DATA_DIR: &str = ".recipes";
const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 3;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;
const DEFAULT_MAX_CONTENT_CHARS: usize = 12_000;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Postgres DSN for the remote tier; `None` runs on the local tier only.
    pub dsn: Option<String>,
    pub data_dir: PathBuf,
    pub remote_timeout: Duration,
    pub fetch_timeout: Duration,
    pub max_content_chars: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            remote_timeout: Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
        }
    }
}

impl AppConfig {
    /// Reads DATABASE_URL, RECIPES_DATA_DIR, RECIPES_REMOTE_TIMEOUT_SECS,
    /// RECIPES_FETCH_TIMEOUT_SECS and RECIPES_MAX_CONTENT_CHARS.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let parse = |key: &str| get(key).and_then(|v| v.trim().parse::<u64>().ok());
        let mut cfg = Self::default();
        cfg.dsn = get("DATABASE_URL").filter(|v| !v.trim().is_empty());
        if let Some(dir) = get("RECIPES_DATA_DIR").filter(|v| !v.trim().is_empty()) { cfg.data_dir = PathBuf::from(dir); }
        if let Some(secs) = parse("RECIPES_REMOTE_TIMEOUT_SECS") { cfg.remote_timeout = Duration::from_secs(secs.max(1)); }
        if let Some(secs) = parse("RECIPES_FETCH_TIMEOUT_SECS") { cfg.fetch_timeout = Duration::from_secs(secs.max(1)); }
        if let Some(n) = parse("RECIPES_MAX_CONTENT_CHARS") { cfg.max_content_chars = n as usize; }
        cfg
    }

    /// Command-line flags win over the environment.
    pub fn with_overrides(mut self, dsn: Option<String>, data_dir: Option<PathBuf>) -> Self {
        if dsn.is_some() { self.dsn = dsn; }
        if let Some(dir) = data_dir { self.data_dir = dir; }
        self
    }

    /// Pool for the remote tier. Connections are opened on first use and give up
    /// after `remote_timeout`, so an unreachable database degrades to the local tier.
    pub fn remote_pool(&self) -> Result<Option<PgPool>> {
        let Some(dsn) = self.dsn.as_deref() else { return Ok(None) };
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(self.remote_timeout)
            .connect_lazy(dsn)
            .context("invalid DATABASE_URL")?;
        Ok(Some(pool))
    }
}
