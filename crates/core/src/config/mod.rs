//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (WEBTEXT_*)
//! 2. TOML config file (if WEBTEXT_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Marker that opens the indexable region of a TYPO3 page.
pub const DEFAULT_BEGIN_MARKER: &str = "TYPO3SEARCH_begin";

/// Marker that closes the indexable region of a TYPO3 page.
pub const DEFAULT_END_MARKER: &str = "TYPO3SEARCH_end";

/// Default traversal depth limit for the structural walker.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (WEBTEXT_*)
/// 2. TOML config file (if WEBTEXT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// User-Agent string for HTTP requests.
    ///
    /// Set via WEBTEXT_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via WEBTEXT_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via WEBTEXT_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Literal that marks the start of in-scope content in raw HTML.
    ///
    /// Set via WEBTEXT_BEGIN_MARKER environment variable.
    #[serde(default = "default_begin_marker")]
    pub begin_marker: String,

    /// Literal that marks the end of in-scope content in extracted text.
    ///
    /// Set via WEBTEXT_END_MARKER environment variable.
    #[serde(default = "default_end_marker")]
    pub end_marker: String,

    /// Maximum element nesting depth visited by the walker.
    ///
    /// Set via WEBTEXT_MAX_DEPTH environment variable.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Tags whose subtrees never contribute text.
    ///
    /// Set via WEBTEXT_SKIP_TAGS environment variable (e.g. `[script,style]`).
    #[serde(default = "default_skip_tags")]
    pub skip_tags: Vec<String>,
}

fn default_user_agent() -> String {
    "Mozilla/5.0".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_begin_marker() -> String {
    DEFAULT_BEGIN_MARKER.into()
}

fn default_end_marker() -> String {
    DEFAULT_END_MARKER.into()
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Tags skipped by default: their bodies are code or fallbacks, not page text.
pub fn default_skip_tags() -> Vec<String> {
    ["script", "style", "noscript", "template"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            begin_marker: default_begin_marker(),
            end_marker: default_end_marker(),
            max_depth: default_max_depth(),
            skip_tags: default_skip_tags(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `WEBTEXT_`
    /// 2. TOML file from `WEBTEXT_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("WEBTEXT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("WEBTEXT_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let mut config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        config.skip_tags = normalize_tags(&config.skip_tags);

        config.validate()?;

        Ok(config)
    }
}

/// Split comma-joined entries and lower-case tag names.
fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .flat_map(|t| t.split(','))
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.user_agent, "Mozilla/5.0");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.begin_marker, "TYPO3SEARCH_begin");
        assert_eq!(config.end_marker, "TYPO3SEARCH_end");
        assert_eq!(config.max_depth, 1000);
        assert_eq!(config.skip_tags, vec!["script", "style", "noscript", "template"]);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_normalize_tags_splits_and_lowercases() {
        let tags = vec!["SCRIPT, style".to_string(), " ".to_string(), "Nav".to_string()];
        assert_eq!(normalize_tags(&tags), vec!["script", "style", "nav"]);
    }
}
