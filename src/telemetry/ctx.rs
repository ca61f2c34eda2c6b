use anyhow::Result;
use serde::Serialize;
use std::marker::PhantomData;
use std::time::Instant;
use tracing::{info, debug, warn, error, Span};

use super::emit;
use crate::output::types::{Meta, TextView};
use crate::recipe::Recipe;
use crate::store::{Served, Tier};

pub trait PhaseSpan {
    fn name(&self) -> &'static str;
    fn span(&self) -> Span;
}

pub trait OpMarker {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

pub struct LogCtx<O: OpMarker> {
    pub(crate) json: bool,
    pub(crate) started: Instant,
    pub(crate) _marker: PhantomData<O>,
}

impl<O: OpMarker> LogCtx<O> {
    pub(crate) fn new(json: bool) -> Self {
        LogCtx { json, started: Instant::now(), _marker: PhantomData }
    }

    fn op_name(&self) -> &'static str { O::NAME }

    pub fn root_span(&self) -> Span { O::root_span() }

    pub fn root_span_kv<'a, T>(&self, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.root_span();
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), "start");
        } else {
            info!(op = %self.op_name(), details = %details, "start");
        }
        span
    }

    pub fn span(&self, ph: &O::Phase) -> Span { ph.span() }

    pub fn span_kv<'a, T>(&self, ph: &O::Phase, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.span(ph);
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), phase = ph.name(), "span_start");
        } else {
            info!(op = %self.op_name(), phase = ph.name(), details = %details, "span_start");
        }
        span
    }

    pub fn info(&self, msg: impl AsRef<str>) { if self.json { info!(op = %self.op_name(), "{}", msg.as_ref()); } else { info!("{}", msg.as_ref()); } }

    pub fn info_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        if self.json { let details = kv_to_string(kv); info!(op = %self.op_name(), details = %details, "{}", msg); }
        else { info!("{}", msg); }
    }

    pub fn warn_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        if self.json { let details = kv_to_string(kv); warn!(op = %self.op_name(), details = %details, "{}", msg); }
        else { warn!("{}", msg); }
    }

    pub fn error_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        if self.json { let details = kv_to_string(kv); error!(op = %self.op_name(), details = %details, "{}", msg); }
        else { error!("{}", msg); }
    }

    /// Log which tier answered; anything but the remote tier is a warning.
    pub fn served<T>(&self, served: &Served<T>) {
        let reason = served.remote_error.clone().unwrap_or_default();
        match served.tier {
            Tier::Remote => debug!(op = %self.op_name(), tier = "remote", "served"),
            Tier::Local => {
                if self.json { warn!(op = %self.op_name(), tier = "local", reason = %reason, "served_from_fallback"); }
                else { warn!("⚠️ Remote store unavailable, using local copy ({})", reason); }
            }
            Tier::Empty => {
                if self.json { error!(op = %self.op_name(), tier = "empty", reason = %reason, "no_tier_available"); }
                else { error!("❌ No store reachable, showing nothing ({})", reason); }
            }
        }
    }

    pub fn result<T: Serialize + TextView>(&self, result: &T) -> Result<()> {
        let meta = Meta { duration_ms: Some(self.started.elapsed().as_millis()) };
        emit::print_result(self.op_name(), result, Some(meta))
    }
}

impl LogCtx<crate::telemetry::ops::add::Add> {
    pub fn extracted(&self, chars: usize) {
        if self.json { info!(op = %self.op_name(), chars, "content_extracted"); }
        else { info!("📄 Extracted {} chars of page content", chars); }
    }

    pub fn imported(&self, recipe: &Recipe, tier: Tier) {
        if self.json {
            info!(op = %self.op_name(), id = %recipe.id, ingredients = recipe.ingredients.len(), steps = recipe.instructions.len(), tier = tier.as_str(), "recipe_imported");
        } else {
            info!("✅ Imported \"{}\": ingredients={} steps={} tier={}", recipe.title, recipe.ingredients.len(), recipe.instructions.len(), tier.as_str());
        }
    }
}

fn kv_to_string<'a, T>(kv: T) -> String
where
    T: IntoIterator<Item = (&'a str, String)>,
{
    let mut parts: Vec<String> = Vec::new();
    for (k, v) in kv { parts.push(format!("{}={}", k, v)); }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_pairs_join_with_spaces() {
        let s = kv_to_string([("url", "https://x.test".to_string()), ("tier", "local".to_string())]);
        assert_eq!(s, "url=https://x.test tier=local");
        assert_eq!(kv_to_string(Vec::<(&str, String)>::new()), "");
    }
}
