//! Fetch-and-extract for a single page URL.

use webtext_core::{AppConfig, Error};

use crate::extract::{ExtractConfig, Extractor, StructuredExtractor};
use crate::fetch::{FetchClient, FetchConfig};

/// Extracted text of a fetched page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PageText {
    /// The URL as requested
    pub url: String,
    /// The URL after redirects
    pub final_url: String,
    /// Normalized page text
    pub text: String,
    /// SHA-256 of `text`
    pub content_hash: String,
    /// Number of blocks the walker emitted
    pub blocks: usize,
    /// Fetch time in milliseconds
    pub fetch_ms: u64,
}

/// Fetches pages and runs them through an [`Extractor`].
pub struct PageExtractor<E = StructuredExtractor> {
    client: FetchClient,
    extractor: E,
}

impl PageExtractor<StructuredExtractor> {
    /// Build a page extractor from application configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let client = FetchClient::new(FetchConfig::from(config))?;
        Ok(Self { client, extractor: StructuredExtractor::new(ExtractConfig::from(config)) })
    }
}

impl<E: Extractor> PageExtractor<E> {
    pub fn new(client: FetchClient, extractor: E) -> Self {
        Self { client, extractor }
    }

    /// Fetch `url` and extract its text, reporting why it failed if it did.
    pub async fn fetch_and_extract(&self, url: &str) -> Result<PageText, Error> {
        let response = self.client.fetch(url).await?;
        let result = self.extractor.extract(&response.body_text())?;

        Ok(PageText {
            url: response.url.to_string(),
            final_url: response.final_url.to_string(),
            text: result.text,
            content_hash: result.content_hash,
            blocks: result.blocks,
            fetch_ms: response.fetch_ms,
        })
    }

    /// Fetch `url` and extract its text, or `None` on any failure.
    ///
    /// Failures are logged; fetch failures are expected and left to the
    /// caller to retry.
    pub async fn extract_from_url(&self, url: &str) -> Option<String> {
        match self.fetch_and_extract(url).await {
            Ok(page) => Some(page.text),
            Err(e) if e.is_fetch_failure() => {
                tracing::warn!(url, code = e.code(), "failed to fetch page: {}", e);
                None
            }
            Err(e) => {
                tracing::warn!(url, code = e.code(), "failed to extract page: {}", e);
                None
            }
        }
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }
}
