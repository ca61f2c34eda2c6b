use anyhow::{bail, Result};
use clap::{ArgAction, Args};
use tracing::Instrument;

use crate::app::App;
use crate::scale::ViewSession;
use crate::telemetry::{self};
use crate::telemetry::ops::show::Phase as ShowPhase;
use crate::views::RecipeDetail;

#[derive(Args, Debug)]
pub struct ShowCmd {
    id: String,
    /// Change the servings multiplier by this much (repeatable, e.g. --adjust 0.5 --adjust -1)
    #[arg(long, allow_negative_numbers = true)]
    adjust: Vec<f64>,
    /// Step the multiplier up by 0.5, once per flag (-mm for two steps)
    #[arg(short = 'm', long, action = ArgAction::Count)]
    more: u8,
    /// Step the multiplier down by 0.5, once per flag
    #[arg(short = 'f', long, action = ArgAction::Count)]
    fewer: u8,
    /// Toggle an ingredient on the checklist by id (repeatable)
    #[arg(long)]
    check: Vec<String>,
}

pub async fn run(app: &App, args: ShowCmd) -> Result<()> {
    let log = telemetry::show();
    let _g = log.root_span_kv([("id", args.id.clone())]).entered();
    let user = app.session.require_user()?;

    let served = app.store.load(&user).instrument(log.span(&ShowPhase::Load)).await;
    log.served(&served);
    let Some(recipe) = served.value.iter().find(|r| r.id == args.id) else {
        bail!("recipe {} not found", args.id);
    };

    let mut session = ViewSession::new();
    {
        let _s = log.span(&ShowPhase::Scale).entered();
        session.open(recipe);
        for _ in 0..args.more { session.increase(); }
        for _ in 0..args.fewer { session.decrease(); }
        for delta in &args.adjust { session.adjust(*delta); }
        for id in &args.check {
            if session.check(recipe, id).is_none() {
                log.warn_kv("unknown_ingredient", [("ingredient", id.clone())]);
            }
        }
    }

    let _s = log.span(&ShowPhase::Render).entered();
    log.result(&RecipeDetail::new(recipe, &session, &served))
}
