//! Checks run on a loaded `AppConfig` before anything is built from it.

use crate::config::AppConfig;
use thiserror::Error;

const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;
const TIMEOUT_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=300_000;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.to_string(), reason: reason.into() }
}

fn is_tag_name(tag: &str) -> bool {
    !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl AppConfig {
    /// Reject values the fetcher or extractor cannot work with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field:
    /// - `max_bytes` outside 1 byte..=50MB
    /// - `timeout_ms` outside 100ms..=5 minutes
    /// - empty `user_agent`
    /// - empty or identical content markers
    /// - `max_depth` of 0
    /// - a skip tag that is not a bare tag name
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_BODY_BYTES).contains(&self.max_bytes) {
            return Err(invalid("max_bytes", "must be between 1 byte and 50MB"));
        }
        if !TIMEOUT_RANGE_MS.contains(&self.timeout_ms) {
            return Err(invalid("timeout_ms", "must be between 100ms and 300000ms"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        for (field, marker) in [("begin_marker", &self.begin_marker), ("end_marker", &self.end_marker)] {
            if marker.is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
        }
        if self.begin_marker == self.end_marker {
            return Err(invalid("end_marker", "must differ from begin_marker"));
        }

        if self.max_depth == 0 {
            return Err(invalid("max_depth", "must be at least 1"));
        }

        if let Some(tag) = self.skip_tags.iter().find(|t| !is_tag_name(t)) {
            return Err(invalid("skip_tags", format!("{tag:?} is not a tag name")));
        }
        if self.skip_tags.iter().any(|t| matches!(t.as_str(), "p" | "ul" | "ol" | "li")) {
            tracing::warn!(
                skip_tags = ?self.skip_tags,
                "skip_tags contains a structural tag; its text will be dropped entirely"
            );
        }

        Ok(())
    }
}
