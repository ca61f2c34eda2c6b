use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::LocalError;
use crate::recipe::Recipe;

pub const FALLBACK_FILE: &str = "recipes.json";

/// Durable key-value area holding one array of every user's recipes.
#[async_trait]
pub trait FallbackStore: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Recipe>, LocalError>;
    async fn put_all(&self, recipes: &[Recipe]) -> Result<(), LocalError>;
}

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    pub fn in_dir(dir: &Path) -> Self { Self::new(dir.join(FALLBACK_FILE)) }

    pub fn path(&self) -> &Path { &self.path }
}

impl JsonFileStore {
    /// Raw entries of the array; a missing or blank file is empty.
    async fn read_entries(&self) -> Result<Vec<Value>, LocalError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) { return Ok(Vec::new()); }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl FallbackStore for JsonFileStore {
    async fn get_all(&self) -> Result<Vec<Recipe>, LocalError> {
        let mut out = Vec::new();
        for (idx, entry) in self.read_entries().await?.into_iter().enumerate() {
            match decode_entry(entry) {
                Ok(recipe) => out.push(recipe),
                Err(e) => warn!(index = idx, error = %e, path = %self.path.display(), "skipping unreadable local recipe"),
            }
        }
        Ok(out)
    }

    /// Entries `get_all` could not read are written back untouched.
    async fn put_all(&self, recipes: &[Recipe]) -> Result<(), LocalError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() { tokio::fs::create_dir_all(parent).await?; }
        }
        let unreadable: Vec<Value> = match self.read_entries().await {
            Ok(entries) => entries.into_iter().filter(|v| decode_entry(v.clone()).is_err()).collect(),
            Err(_) => Vec::new(),
        };
        let mut entries = recipes.iter().map(serde_json::to_value).collect::<Result<Vec<_>, _>>()?;
        entries.extend(unreadable);
        let body = serde_json::to_vec(&entries)?;
        // write-then-rename so a crash never leaves a half-written array
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Decodes one stored recipe, coercing numbers the way the remote codec does:
/// minutes are rounded and dropped when negative, servings fall back below 1.
fn decode_entry(mut entry: Value) -> Result<Recipe, serde_json::Error> {
    if let Value::Object(fields) = &mut entry {
        coerce_whole(fields, "prepTime", 0.0);
        coerce_whole(fields, "cookTime", 0.0);
        coerce_whole(fields, "servings", 1.0);
    }
    serde_json::from_value(entry)
}

fn coerce_whole(fields: &mut Map<String, Value>, key: &str, min: f64) {
    let Some(v) = fields.get(key) else { return };
    match v.as_f64().filter(|n| n.is_finite() && n.round() >= min && n.round() <= f64::from(u32::MAX)) {
        Some(n) => { fields.insert(key.to_string(), Value::from(n.round() as u32)); }
        None => { fields.remove(key); }
    }
}
