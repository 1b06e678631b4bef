//! page_extract tool implementation.
//!
//! Extracts structured plain text from HTML supplied by the client.
//! No network I/O is performed.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use webtext_client::{ExtractConfig, Extractor, StructuredExtractor};
use webtext_core::{AppConfig, Error};

/// Input parameters for page_extract tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PageExtractParams {
    /// The raw HTML content to extract from.
    pub html: String,

    /// Override the begin-of-content marker (default: TYPO3SEARCH_begin).
    #[serde(default)]
    pub begin_marker: Option<String>,

    /// Override the end-of-content marker (default: TYPO3SEARCH_end).
    #[serde(default)]
    pub end_marker: Option<String>,
}

/// Output structure for page_extract tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageExtractOutput {
    /// Extracted, normalized text.
    pub text: String,
    /// SHA-256 of the text, for change detection.
    pub content_hash: String,
    /// Number of structural blocks emitted.
    pub blocks: usize,
    /// Whether the begin marker was present in the HTML.
    pub begin_marker_found: bool,
    /// Word count of extracted text.
    pub word_count: usize,
}

/// Implementation of the page_extract tool.
pub async fn extract_impl(config: &AppConfig, params: PageExtractParams) -> Result<CallToolResult, McpError> {
    let output = extract_page(config, params)?;

    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&output).unwrap_or_default(),
    )]))
}

fn extract_page(config: &AppConfig, params: PageExtractParams) -> Result<PageExtractOutput, Error> {
    if params.html.trim().is_empty() {
        return Err(Error::InvalidInput("html cannot be empty".into()));
    }

    let mut extract_config = ExtractConfig::from(config);
    if let Some(marker) = params.begin_marker.filter(|m| !m.is_empty()) {
        extract_config.begin_marker = marker;
    }
    if let Some(marker) = params.end_marker.filter(|m| !m.is_empty()) {
        extract_config.end_marker = marker;
    }

    let result = StructuredExtractor::new(extract_config).extract(&params.html)?;

    Ok(PageExtractOutput {
        word_count: result.text.split_whitespace().count(),
        text: result.text,
        content_hash: result.content_hash,
        blocks: result.blocks,
        begin_marker_found: result.begin_marker_found,
    })
}
