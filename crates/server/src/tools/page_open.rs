//! page_open tool implementation.
//!
//! Fetches a page URL and extracts its structured text.

use chrono::Utc;
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use webtext_client::PageExtractor;
use webtext_core::Error;

/// Input parameters for page_open tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PageOpenParams {
    /// The URL to fetch. A missing scheme defaults to https.
    pub url: String,
}

/// Output structure for page_open tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageOpenOutput {
    /// The original URL requested.
    pub url: String,
    /// The final URL after redirects.
    pub final_url: String,
    /// ISO8601 timestamp of when the content was fetched.
    pub fetched_at: String,
    /// Extracted, normalized text.
    pub text: String,
    /// SHA-256 of the text, for change detection.
    pub content_hash: String,
    /// Number of structural blocks emitted.
    pub blocks: usize,
    /// Fetch time in milliseconds.
    pub fetch_ms: u64,
}

/// Implementation of the page_open tool.
pub async fn open_impl(pages: &PageExtractor, params: PageOpenParams) -> Result<CallToolResult, McpError> {
    let output = open_page(pages, &params.url).await?;

    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&output).unwrap_or_default(),
    )]))
}

/// Fetch and extract one page into the tool output shape.
pub async fn open_page(pages: &PageExtractor, url: &str) -> Result<PageOpenOutput, Error> {
    if url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()));
    }

    let page = pages.fetch_and_extract(url).await?;
    let fetched_at = Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    tracing::info!(url = %page.final_url, blocks = page.blocks, "extracted {} chars", page.text.len());

    Ok(PageOpenOutput {
        url: page.url,
        final_url: page.final_url,
        fetched_at,
        text: page.text,
        content_hash: page.content_hash,
        blocks: page.blocks,
        fetch_ms: page.fetch_ms,
    })
}
