use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::ExtractionError;

mod page;

const USER_AGENT: &str = concat!("recipe-saver/", env!("CARGO_PKG_VERSION"));

/// Turns a recipe URL into plain text for inference.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract(&self, url: &Url) -> Result<String, ExtractionError>;
}

pub struct HttpExtractor {
    client: Client,
    max_chars: usize,
}

impl HttpExtractor {
    pub fn new(timeout: Duration, max_chars: usize) -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(ExtractionError::Fetch)?;
        Ok(Self { client, max_chars })
    }
}

#[async_trait]
impl ContentExtractor for HttpExtractor {
    async fn extract(&self, url: &Url) -> Result<String, ExtractionError> {
        let html = fetch_page(&self.client, url).await?;
        let host = url.host_str().unwrap_or_default();
        reduce(host, &html, self.max_chars).ok_or(ExtractionError::EmptyContent)
    }
}

pub async fn fetch_page(client: &Client, url: &Url) -> Result<String, ExtractionError> {
    let resp = client.get(url.clone()).send().await.map_err(ExtractionError::Fetch)?;
    let status = resp.status();
    if !status.is_success() { return Err(ExtractionError::Status(status)); }
    resp.text().await.map_err(ExtractionError::Fetch)
}

/// Per-host reduction with a generic fallback.
pub fn reduce(host: &str, html: &str, max_chars: usize) -> Option<String> {
    match host {
        // site-specific reducers go here, e.g. "example.com" => sites::example::reduce(html)
        _ => page::page_text(html, max_chars),
    }
}
