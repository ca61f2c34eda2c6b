use anyhow::{bail, Result};
use clap::Args;
use tracing::Instrument;

use crate::app::App;
use crate::scale::ViewSession;
use crate::telemetry::{self};
use crate::telemetry::ops::notes::Phase as NotesPhase;
use crate::views::NotesUpdate;

#[derive(Args, Debug)]
pub struct NotesCmd {
    id: String,
    /// New notes, replacing the old ones
    #[arg(required_unless_present = "clear")]
    text: Option<String>,
    /// Remove the notes
    #[arg(long, conflicts_with = "text")]
    clear: bool,
}

pub async fn run(app: &App, args: NotesCmd) -> Result<()> {
    let log = telemetry::notes();
    let _g = log.root_span_kv([("id", args.id.clone()), ("clear", args.clear.to_string())]).entered();
    let user = app.session.require_user()?;

    let served = app.store.load(&user).instrument(log.span(&NotesPhase::Load)).await;
    log.served(&served);
    let Some(recipe) = served.value.into_iter().find(|r| r.id == args.id) else {
        bail!("recipe {} not found", args.id);
    };

    let mut session = ViewSession::new();
    session.open(&recipe);
    session.edit_notes(args.text.unwrap_or_default());
    if !session.notes_changed(&recipe) {
        log.info("notes unchanged");
        return log.result(&NotesUpdate { changed: false, tier: served.tier, remote_error: served.remote_error, recipe });
    }

    let updated = app
        .store
        .update_notes(&user, &recipe.id, session.notes_draft())
        .instrument(log.span(&NotesPhase::Persist))
        .await;
    match updated {
        Ok(saved) => {
            log.served(&saved);
            log.result(&NotesUpdate { changed: true, tier: saved.tier, remote_error: saved.remote_error, recipe: saved.value })
        }
        Err(e) => {
            log.error_kv("notes_failed", [("id", args.id.clone()), ("error", e.to_string())]);
            Err(e.into())
        }
    }
}
