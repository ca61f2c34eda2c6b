use anyhow::Result;
use clap::Args;
use tracing::Instrument;

use crate::app::App;
use crate::search;
use crate::telemetry::{self};
use crate::telemetry::ops::list::Phase as ListPhase;
use crate::views::RecipeList;

#[derive(Args, Debug)]
pub struct LsCmd {
    /// Case-insensitive match on title, description, ingredient names and tags
    query: Option<String>,
}

pub async fn run(app: &App, args: LsCmd) -> Result<()> {
    let log = telemetry::list();
    let _g = log.root_span_kv([("query", format!("{:?}", args.query))]).entered();
    let user = app.session.require_user()?;

    let served = app.store.load(&user).instrument(log.span(&ListPhase::Load)).await;
    log.served(&served);

    let matches = {
        let _s = log.span_kv(&ListPhase::Filter, [("recipes", served.value.len().to_string())]).entered();
        search::filter(&served.value, args.query.as_deref().unwrap_or_default())
    };
    log.info_kv("filtered", [("total", served.value.len().to_string()), ("matches", matches.len().to_string())]);

    let _s = log.span(&ListPhase::Render).entered();
    log.result(&RecipeList::new(args.query.clone(), &served, &matches))
}
