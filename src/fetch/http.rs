use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::TextSource;

/// Fetches locators over HTTP(S) with a shared client.
/// No retries and no timeout beyond whatever the client was built with.
#[derive(Debug, Clone, Default)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// GET `url` and return the body as text. Non-success statuses are errors.
    pub async fn fetch_url(&self, url: Url) -> Result<String> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {}", url))?
            .error_for_status()
            .with_context(|| format!("GET {}", url))?;
        let text = resp
            .text()
            .await
            .with_context(|| format!("reading body from {}", url))?;
        debug!(url = %url, bytes = text.len(), "fetched");
        Ok(text)
    }
}

impl TextSource for HttpSource {
    async fn fetch_text(&self, location: &str) -> Result<String> {
        let url = Url::parse(location).with_context(|| format!("parsing URL {}", location))?;
        self.fetch_url(url).await
    }
}
