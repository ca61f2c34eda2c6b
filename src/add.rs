use anyhow::Result;
use clap::Args;

use crate::app::App;
use crate::telemetry::{self};
use crate::views::SavedRecipe;

#[derive(Args, Debug)]
pub struct AddCmd {
    /// Recipe page to import
    url: String,
}

pub async fn run(app: &App, args: AddCmd) -> Result<()> {
    let log = telemetry::add();
    let _g = log.root_span_kv([("url", args.url.clone())]).entered();
    let user = app.session.require_user()?;
    let importer = app.importer()?;

    match importer.import_from_url(&args.url, &user, Some(&log)).await {
        Ok(served) => log.result(&SavedRecipe::from(served)),
        Err(e) => {
            log.error_kv("import_failed", [("url", args.url.clone()), ("error", e.to_string())]);
            Err(e.into())
        }
    }
}
