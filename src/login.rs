use anyhow::Result;
use clap::Args;

use crate::app::App;
use crate::telemetry::{self};
use crate::telemetry::ops::auth::Phase as AuthPhase;
use crate::views::Account;

#[derive(Args, Debug)]
pub struct LoginCmd {
    /// Email to sign in with; the same email always maps to the same recipes
    email: String,
}

pub async fn login(app: &App, args: LoginCmd) -> Result<()> {
    let log = telemetry::auth();
    let _g = log.root_span_kv([("action", "login".to_string())]).entered();
    let user = {
        let _s = log.span(&AuthPhase::Login).entered();
        app.session.login(&args.email).await?
    };
    log.info_kv("signed_in", [("user_id", user.id().to_string())]);
    log.result(&Account::from(Some(&user)))
}

pub async fn logout(app: &App) -> Result<()> {
    let log = telemetry::auth();
    let _g = log.root_span_kv([("action", "logout".to_string())]).entered();
    {
        let _s = log.span(&AuthPhase::Logout).entered();
        app.session.logout().await?;
    }
    log.result(&Account::from(None))
}

pub async fn whoami(app: &App) -> Result<()> {
    let log = telemetry::auth();
    let _g = log.root_span_kv([("action", "whoami".to_string())]).entered();
    let state = {
        let _s = log.span(&AuthPhase::Open).entered();
        app.session.subscribe().borrow().clone()
    };
    log.info_kv("session", [("loading", state.is_loading.to_string()), ("signed_in", state.user.is_some().to_string())]);
    log.result(&Account::from(state.user.as_ref()))
}
