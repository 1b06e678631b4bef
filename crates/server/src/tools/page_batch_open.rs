//! page_batch_open tool implementation.
//!
//! Fetches and extracts multiple URLs in parallel with bounded concurrency.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use webtext_client::PageExtractor;
use webtext_core::Error;

use crate::tools::page_open::{PageOpenOutput, open_page};

const MAX_CONCURRENCY: u8 = 16;

/// Input parameters for page_batch_open tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PageBatchOpenParams {
    /// URLs to fetch and extract.
    pub urls: Vec<String>,

    /// Maximum number of concurrent requests (default: 4, max: 16).
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: Option<u8>,

    /// Fail fast: stop on first error (default: false).
    #[serde(default)]
    pub fail_fast: bool,
}

fn default_max_concurrency() -> Option<u8> {
    Some(4)
}

/// Batch item status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum BatchItemStatus {
    /// Successfully fetched and extracted.
    Success,
    /// Failed to fetch or extract.
    Failed,
    /// Started, then aborted because another item failed in fail-fast mode.
    Cancelled,
    /// Not attempted because an earlier item failed in fail-fast mode.
    Skipped,
}

/// Individual batch result item.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BatchItem {
    /// The original URL.
    pub url: String,
    /// Status of this item.
    pub status: BatchItemStatus,
    /// The extracted page (if status is Success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<PageOpenOutput>,
    /// Error message (if status is Failed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItem {
    fn unfinished(url: String, started: bool) -> Self {
        let status = if started { BatchItemStatus::Cancelled } else { BatchItemStatus::Skipped };
        Self { url, status, result: None, error: None }
    }
}

/// Batch summary statistics.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BatchSummary {
    /// Total number of URLs in the request.
    pub total: u32,
    /// Number of successful extractions.
    pub succeeded: u32,
    /// Number of failed extractions.
    pub failed: u32,
    /// Number of URLs aborted while in flight.
    pub cancelled: u32,
    /// Number of URLs not attempted.
    pub skipped: u32,
}

/// Output structure for page_batch_open tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageBatchOpenOutput {
    /// Individual results for each URL (in input order).
    pub results: Vec<BatchItem>,
    /// Summary statistics.
    pub summary: BatchSummary,
}

/// Implementation of the page_batch_open tool.
pub async fn batch_open_impl(
    pages: Arc<PageExtractor>, params: PageBatchOpenParams,
) -> Result<CallToolResult, McpError> {
    let output = batch_open(pages, params).await?;

    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&output).unwrap_or_default(),
    )]))
}

async fn batch_open(pages: Arc<PageExtractor>, params: PageBatchOpenParams) -> Result<PageBatchOpenOutput, McpError> {
    if params.urls.is_empty() {
        return Err(Error::InvalidInput("urls cannot be empty".into()).into());
    }

    let max_concurrency = params.max_concurrency.unwrap_or(4).min(MAX_CONCURRENCY) as usize;
    if max_concurrency == 0 {
        return Err(Error::InvalidInput("max_concurrency must be at least 1".into()).into());
    }

    let semaphore = Arc::new(Semaphore::new(max_concurrency));
    let mut join_set = JoinSet::new();
    let mut tally = Tally::new(params.urls.len());

    let mut queue = params.urls.iter().cloned().enumerate();
    let mut pending = queue.next();

    // Completions are drained while spawning so a fail-fast failure stops
    // new work as soon as it is seen.
    while let Some((index, url)) = pending.take() {
        if tally.halted(params.fail_fast) {
            break;
        }

        tokio::select! {
            biased;
            Some(joined) = join_set.join_next() => {
                tally.record(joined)?;
                pending = Some((index, url));
            }
            permit = semaphore.clone().acquire_owned() => {
                let permit = permit.map_err(|e| McpError::internal_error(e.to_string(), None))?;
                let pages = Arc::clone(&pages);
                tally.started[index] = true;

                join_set.spawn(async move {
                    let _permit = permit;
                    let result = open_page(&pages, &url).await;
                    (index, url, result)
                });
                pending = queue.next();
            }
        }
    }

    while !tally.halted(params.fail_fast)
        && let Some(joined) = join_set.join_next().await
    {
        tally.record(joined)?;
    }
    if !join_set.is_empty() {
        join_set.shutdown().await;
    }

    Ok(tally.finish(params.urls))
}

type Joined = Result<(usize, String, Result<PageOpenOutput, Error>), tokio::task::JoinError>;

struct Tally {
    slots: Vec<Option<BatchItem>>,
    started: Vec<bool>,
    succeeded: u32,
    failed: u32,
}

impl Tally {
    fn new(len: usize) -> Self {
        Self { slots: vec![None; len], started: vec![false; len], succeeded: 0, failed: 0 }
    }

    fn halted(&self, fail_fast: bool) -> bool {
        fail_fast && self.failed > 0
    }

    fn record(&mut self, joined: Joined) -> Result<(), McpError> {
        let (index, url, result) = joined.map_err(|e| McpError::internal_error(e.to_string(), None))?;

        let item = match result {
            Ok(output) => {
                self.succeeded += 1;
                BatchItem { url, status: BatchItemStatus::Success, result: Some(output), error: None }
            }
            Err(e) => {
                self.failed += 1;
                tracing::debug!(url = %url, code = e.code(), "batch item failed");
                BatchItem { url, status: BatchItemStatus::Failed, result: None, error: Some(e.to_string()) }
            }
        };
        self.slots[index] = Some(item);
        Ok(())
    }

    fn finish(self, urls: Vec<String>) -> PageBatchOpenOutput {
        let results: Vec<BatchItem> = self
            .slots
            .into_iter()
            .zip(self.started)
            .zip(urls)
            .map(|((slot, started), url)| slot.unwrap_or_else(|| BatchItem::unfinished(url, started)))
            .collect();
        let count = |status| results.iter().filter(|item| item.status == status).count() as u32;

        PageBatchOpenOutput {
            summary: BatchSummary {
                total: results.len() as u32,
                succeeded: self.succeeded,
                failed: self.failed,
                cancelled: count(BatchItemStatus::Cancelled),
                skipped: count(BatchItemStatus::Skipped),
            },
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webtext_core::AppConfig;

    fn pages() -> Arc<PageExtractor> {
        Arc::new(PageExtractor::from_config(&AppConfig::default()).unwrap())
    }

    #[tokio::test]
    async fn test_batch_open_empty_urls() {
        let params = PageBatchOpenParams { urls: vec![], ..Default::default() };
        let result = batch_open_impl(pages(), params).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_batch_open_invalid_concurrency() {
        let params = PageBatchOpenParams {
            urls: vec!["https://example.com".to_string()],
            max_concurrency: Some(0),
            ..Default::default()
        };

        let result = batch_open_impl(pages(), params).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_batch_open_reports_failures_in_input_order() {
        let params = PageBatchOpenParams {
            urls: vec!["ftp://a.example".into(), "   ".into(), "mailto:info@tum.de".into()],
            max_concurrency: Some(2),
            fail_fast: false,
        };

        let output = batch_open(pages(), params).await.unwrap();
        let urls: Vec<&str> = output.results.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["ftp://a.example", "   ", "mailto:info@tum.de"]);
        assert!(output.results.iter().all(|i| i.status == BatchItemStatus::Failed));
        assert_eq!(output.summary.total, 3);
        assert_eq!(output.summary.failed, 3);
        assert_eq!(output.summary.skipped, 0);
    }

    #[tokio::test]
    async fn test_batch_open_fail_fast_stops_spawning() {
        let params = PageBatchOpenParams {
            urls: vec!["ftp://a.example".into(), "ftp://b.example".into(), "ftp://c.example".into()],
            max_concurrency: Some(1),
            fail_fast: true,
        };

        let output = batch_open(pages(), params).await.unwrap();
        let statuses: Vec<BatchItemStatus> = output.results.iter().map(|i| i.status).collect();
        assert_eq!(statuses, vec![BatchItemStatus::Failed, BatchItemStatus::Skipped, BatchItemStatus::Skipped]);
        assert_eq!(output.summary.failed, 1);
        assert_eq!(output.summary.skipped, 2);
        assert_eq!(output.summary.cancelled, 0);
    }

    #[tokio::test]
    async fn test_batch_open_fail_fast_never_skips_attempted_urls() {
        let params = PageBatchOpenParams {
            urls: vec!["ftp://a.example".into(), "ftp://b.example".into(), "ftp://c.example".into()],
            max_concurrency: Some(3),
            fail_fast: true,
        };

        let output = batch_open(pages(), params).await.unwrap();
        let summary = &output.summary;
        assert!(summary.failed >= 1);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.failed + summary.cancelled, 3);
        assert!(output.results.iter().all(|i| i.status != BatchItemStatus::Skipped));
    }

    #[test]
    fn test_unfinished_items_distinguish_started() {
        assert_eq!(BatchItem::unfinished("a".into(), true).status, BatchItemStatus::Cancelled);
        assert_eq!(BatchItem::unfinished("b".into(), false).status, BatchItemStatus::Skipped);
    }

    #[test]
    fn test_default_max_concurrency() {
        assert_eq!(default_max_concurrency(), Some(4));
    }

    #[test]
    fn test_batch_item_status_serialization() {
        let json = serde_json::to_string(&BatchItemStatus::Skipped).unwrap();
        assert!(json.contains("Skipped"));
    }
}
