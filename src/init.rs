use anyhow::{Context, Result};
use clap::Args;
use tracing::Instrument;

use crate::app::App;
use crate::telemetry::{self};
use crate::telemetry::ops::init::Phase as InitPhase;
use crate::views::InitSummary;

#[derive(Args, Debug)]
pub struct InitCmd {}

/// Create the local data dir and apply the remote schema migrations (idempotent).
pub async fn run(app: &App, _args: InitCmd) -> Result<()> {
    let log = telemetry::init();
    let _g = log
        .root_span_kv([
            ("data_dir", app.config.data_dir.display().to_string()),
            ("remote", app.pool.is_some().to_string()),
        ])
        .entered();

    tokio::fs::create_dir_all(&app.config.data_dir)
        .await
        .with_context(|| format!("create {}", app.config.data_dir.display()))?;

    let Some(pool) = app.pool.as_ref() else {
        anyhow::bail!("init needs a database: pass --dsn or set DATABASE_URL");
    };

    async { pool.acquire().await.map(drop) }
        .instrument(log.span(&InitPhase::Connect))
        .await
        .context("connect to database")?;

    let migrator = sqlx::migrate!();
    migrator
        .run(pool)
        .instrument(log.span(&InitPhase::Migrate))
        .await
        .context("apply migrations")?;

    log.info("✅ Database initialized");
    log.result(&InitSummary {
        schema: "recipes",
        migrations: migrator.iter().count(),
        data_dir: app.config.data_dir.display().to_string(),
    })
}
