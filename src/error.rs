use std::fmt;

use reqwest::StatusCode;

use crate::llm::OpenAiError;

/// Failure to turn a URL into a recipe. Nothing is persisted when this is returned.
#[derive(Debug)]
pub enum ExtractionError {
    InvalidUrl(String),
    Fetch(reqwest::Error),
    Status(StatusCode),
    EmptyContent,
    Inference(OpenAiError),
    Decode(serde_json::Error),
    NotARecipe,
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionError::InvalidUrl(url) => write!(f, "invalid URL: {url}"),
            ExtractionError::Fetch(err) => write!(f, "failed to fetch page: {err}"),
            ExtractionError::Status(status) => write!(f, "page returned {status}"),
            ExtractionError::EmptyContent => write!(f, "no readable content on page"),
            ExtractionError::Inference(err) => write!(f, "recipe inference failed: {err}"),
            ExtractionError::Decode(err) => write!(f, "could not decode inferred recipe: {err}"),
            ExtractionError::NotARecipe => write!(f, "no recipe found at this URL"),
        }
    }
}

impl std::error::Error for ExtractionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractionError::Fetch(err) => Some(err),
            ExtractionError::Inference(err) => Some(err),
            ExtractionError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<OpenAiError> for ExtractionError {
    fn from(err: OpenAiError) -> Self { ExtractionError::Inference(err) }
}

/// Remote tier failure. Always recoverable through the local tier.
#[derive(Debug)]
pub enum RemoteError {
    NotConfigured,
    Db(sqlx::Error),
    Decode(serde_json::Error),
    NotFound(String),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::NotConfigured => write!(f, "remote store not configured"),
            RemoteError::Db(err) => write!(f, "database error: {err}"),
            RemoteError::Decode(err) => write!(f, "stored record is malformed: {err}"),
            RemoteError::NotFound(id) => write!(f, "recipe {id} not found in remote store"),
        }
    }
}

impl std::error::Error for RemoteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RemoteError::Db(err) => Some(err),
            RemoteError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for RemoteError {
    fn from(err: sqlx::Error) -> Self { RemoteError::Db(err) }
}

/// Local fallback tier failure.
#[derive(Debug)]
pub enum LocalError {
    Io(std::io::Error),
    Decode(serde_json::Error),
}

impl fmt::Display for LocalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalError::Io(err) => write!(f, "local store io error: {err}"),
            LocalError::Decode(err) => write!(f, "local store is malformed: {err}"),
        }
    }
}

impl std::error::Error for LocalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LocalError::Io(err) => Some(err),
            LocalError::Decode(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for LocalError {
    fn from(err: std::io::Error) -> Self { LocalError::Io(err) }
}

impl From<serde_json::Error> for LocalError {
    fn from(err: serde_json::Error) -> Self { LocalError::Decode(err) }
}

/// Both tiers failed a write, or the recipe exists in neither.
#[derive(Debug)]
pub enum PersistenceError {
    NotFound(String),
    Unavailable { remote: RemoteError, local: LocalError },
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::NotFound(id) => write!(f, "recipe {id} not found"),
            PersistenceError::Unavailable { remote, local } => {
                write!(f, "failed to save recipe (remote: {remote}; local: {local})")
            }
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistenceError::Unavailable { local, .. } => Some(local),
            PersistenceError::NotFound(_) => None,
        }
    }
}

#[derive(Debug)]
pub enum ValidationError {
    MissingTitle,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingTitle => write!(f, "recipe title is required"),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug)]
pub enum ImportError {
    Extraction(ExtractionError),
    Persistence(PersistenceError),
    Validation(ValidationError),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Extraction(err) => write!(f, "{err}"),
            ImportError::Persistence(err) => write!(f, "{err}"),
            ImportError::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Extraction(err) => Some(err),
            ImportError::Persistence(err) => Some(err),
            ImportError::Validation(err) => Some(err),
        }
    }
}

impl From<ExtractionError> for ImportError {
    fn from(err: ExtractionError) -> Self { ImportError::Extraction(err) }
}

impl From<PersistenceError> for ImportError {
    fn from(err: PersistenceError) -> Self { ImportError::Persistence(err) }
}

impl From<ValidationError> for ImportError {
    fn from(err: ValidationError) -> Self { ImportError::Validation(err) }
}
