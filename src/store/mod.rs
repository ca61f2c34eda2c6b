//! Two-tier recipe persistence.
//!
//! Every call tries the remote store first and falls back to the local
//! [`FallbackStore`] on any remote failure. The local tier is a degraded-mode
//! mirror: nothing is reconciled when the remote store comes back, so a
//! recipe written during an outage stays local-only until it is rewritten.
//! [`Served::tier`] tells the caller which tier answered.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::auth::User;
use crate::error::{PersistenceError, RemoteError};
use crate::recipe::Recipe;

pub mod codec;
pub mod local;
pub mod remote;

pub use local::{FallbackStore, JsonFileStore};
pub use remote::{PgRemoteStore, RemoteStore};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Remote,
    Local,
    /// Neither tier could answer a read.
    Empty,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self { Tier::Remote => "remote", Tier::Local => "local", Tier::Empty => "empty" }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Served<T> {
    pub value: T,
    pub tier: Tier,
    /// Why the remote tier was skipped, when it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_error: Option<String>,
}

impl<T> Served<T> {
    fn remote(value: T) -> Self { Served { value, tier: Tier::Remote, remote_error: None } }

    fn local(value: T, err: &RemoteError) -> Self {
        Served { value, tier: Tier::Local, remote_error: Some(err.to_string()) }
    }
}

#[derive(Clone)]
pub struct RecipeStore {
    remote: Option<Arc<dyn RemoteStore>>,
    local: Arc<dyn FallbackStore>,
}

impl RecipeStore {
    pub fn new(remote: Option<Arc<dyn RemoteStore>>, local: Arc<dyn FallbackStore>) -> Self {
        Self { remote, local }
    }

    fn remote(&self) -> Result<&dyn RemoteStore, RemoteError> {
        self.remote.as_deref().ok_or(RemoteError::NotConfigured)
    }

    /// The user's recipes, newest first. Never fails: if both tiers are down the list is empty.
    pub async fn load(&self, user: &User) -> Served<Vec<Recipe>> {
        let remote_err = match async { self.remote()?.list_by_user(user.id()).await }.await {
            Ok(recipes) => return Served::remote(recipes),
            Err(e) => e,
        };
        match self.local.get_all().await {
            Ok(all) => {
                let mut mine: Vec<Recipe> = all.into_iter().filter(|r| r.user_id == user.id()).collect();
                mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                Served::local(mine, &remote_err)
            }
            Err(local_err) => Served {
                value: Vec::new(),
                tier: Tier::Empty,
                remote_error: Some(format!("{remote_err}; local: {local_err}")),
            },
        }
    }

    pub async fn save(&self, recipe: Recipe) -> Result<Served<Recipe>, PersistenceError> {
        let remote_err = match async { self.remote()?.insert(&recipe).await }.await {
            Ok(stored) => return Ok(Served::remote(stored)),
            Err(e) => e,
        };
        let write = async {
            let mut all = self.local.get_all().await?;
            match all.iter_mut().find(|r| r.id == recipe.id) {
                Some(existing) => *existing = recipe.clone(),
                None => all.push(recipe.clone()),
            }
            self.local.put_all(&all).await
        };
        match write.await {
            Ok(()) => Ok(Served::local(recipe, &remote_err)),
            Err(local) => Err(PersistenceError::Unavailable { remote: remote_err, local }),
        }
    }

    /// Replace the notes of one of `user`'s recipes. Empty notes are stored as absent.
    pub async fn update_notes(&self, user: &User, id: &str, notes: &str) -> Result<Served<Recipe>, PersistenceError> {
        let now = Utc::now();
        let notes = if notes.is_empty() { None } else { Some(notes) };

        let remote_err = match async { self.remote()?.update_notes(user.id(), id, notes, now).await }.await {
            Ok(stored) => return Ok(Served::remote(stored)),
            Err(e) => e,
        };

        let mut all = match self.local.get_all().await {
            Ok(all) => all,
            Err(local) => return Err(PersistenceError::Unavailable { remote: remote_err, local }),
        };
        let Some(idx) = all.iter().position(|r| r.id == id && r.user_id == user.id()) else {
            return Err(PersistenceError::NotFound(id.to_string()));
        };
        let updated = all[idx].with_notes(notes.map(str::to_string), now);
        all[idx] = updated.clone();
        match self.local.put_all(&all).await {
            Ok(()) => Ok(Served::local(updated, &remote_err)),
            Err(local) => Err(PersistenceError::Unavailable { remote: remote_err, local }),
        }
    }
}
