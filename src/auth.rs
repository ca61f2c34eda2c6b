use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

pub const SESSION_FILE: &str = "session.json";

/// Signed-in identity. Only the session hands these out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: String,
    email: String,
}

impl User {
    pub fn id(&self) -> &str { &self.id }
    pub fn email(&self) -> &str { &self.email }

    fn from_email(email: &str) -> Self {
        let email = email.trim().to_lowercase();
        let id = Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("mailto:{email}").as_bytes()).to_string();
        User { id, email }
    }

    #[cfg(test)]
    pub fn for_tests(id: &str, email: &str) -> Self { User { id: id.to_string(), email: email.to_string() } }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_loading: bool,
}

/// Local sign-in session persisted under the data dir; changes are broadcast to subscribers.
pub struct AuthSession {
    path: PathBuf,
    tx: watch::Sender<AuthState>,
}

impl AuthSession {
    pub async fn open(data_dir: &Path) -> Result<Self> {
        let (tx, _rx) = watch::channel(AuthState { user: None, is_loading: true });
        let session = AuthSession { path: data_dir.join(SESSION_FILE), tx };
        let user = session.read_user().await?;
        session.tx.send_replace(AuthState { user, is_loading: false });
        Ok(session)
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> { self.tx.subscribe() }

    pub fn current(&self) -> Option<User> { self.tx.borrow().user.clone() }

    pub fn require_user(&self) -> Result<User> {
        match self.current() {
            Some(u) => Ok(u),
            None => bail!("not signed in; run `recipes login <email>` first"),
        }
    }

    pub async fn login(&self, email: &str) -> Result<User> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') { bail!("invalid email: {:?}", email); }
        let user = User::from_email(email);
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| format!("create {}", parent.display()))?;
        }
        let body = serde_json::to_vec_pretty(&user)?;
        tokio::fs::write(&self.path, body).await.with_context(|| format!("write {}", self.path.display()))?;
        self.tx.send_replace(AuthState { user: Some(user.clone()), is_loading: false });
        Ok(user)
    }

    pub async fn logout(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e).with_context(|| format!("remove {}", self.path.display())),
        }
        self.tx.send_replace(AuthState { user: None, is_loading: false });
        Ok(())
    }

    async fn read_user(&self) -> Result<Option<User>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let user: User = serde_json::from_slice(&bytes).with_context(|| format!("parse {}", self.path.display()))?;
                Ok(Some(user))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read {}", self.path.display())),
        }
    }
}
