//! Structured text extraction from CMS-rendered HTML.
//!
//! ### Stages
//! 1. Bound the raw HTML after the begin marker ([`marker`]).
//! 2. Parse leniently with `scraper` (html5ever never fails).
//! 3. Walk the tree into content blocks ([`walker`]).
//! 4. Join blocks and collapse blank lines ([`normalize`]).
//! 5. Run the text pipeline: whitespace, addresses, tail ([`pipeline`]).
//!
//! Every stage is a total function. The only failure is an empty result.
//!
//! ### Stable Abstraction
//! - Uses the `Extractor` trait so callers don't depend on the concrete engine.

pub mod address;
pub mod marker;
pub mod normalize;
pub mod pipeline;
pub mod walker;

pub use address::deobfuscate_addresses;
pub use marker::{bound_after_marker, truncate_tail};
pub use normalize::{collapse_blank_lines, normalize_whitespace};
pub use pipeline::{TextPipeline, TextStage};
pub use walker::{BlockKind, ContentBlock, StructuralWalker};

use scraper::Html;
use webtext_core::config::{DEFAULT_BEGIN_MARKER, DEFAULT_END_MARKER, DEFAULT_MAX_DEPTH, default_skip_tags};
use webtext_core::{AppConfig, Error, content_hash};

/// Closing sequence of the HTML comment the begin marker usually sits in.
const COMMENT_CLOSE: &str = "-->";

/// Configuration for content extraction.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Literal after which in-scope HTML starts (default: `TYPO3SEARCH_begin`)
    pub begin_marker: String,

    /// Literal before whose last occurrence in-scope text ends (default: `TYPO3SEARCH_end`)
    pub end_marker: String,

    /// Maximum element nesting depth visited (default: 1000)
    pub max_depth: usize,

    /// Tags whose subtrees contribute no text (default: script, style, noscript, template)
    pub skip_tags: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            begin_marker: DEFAULT_BEGIN_MARKER.to_string(),
            end_marker: DEFAULT_END_MARKER.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            skip_tags: default_skip_tags(),
        }
    }
}

impl From<&AppConfig> for ExtractConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            begin_marker: config.begin_marker.clone(),
            end_marker: config.end_marker.clone(),
            max_depth: config.max_depth,
            skip_tags: config.skip_tags.clone(),
        }
    }
}

/// Result of content extraction.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExtractionResult {
    /// Normalized page text
    pub text: String,
    /// Number of blocks the walker emitted
    pub blocks: usize,
    /// Whether the begin marker was found in the raw HTML
    pub begin_marker_found: bool,
    /// SHA-256 of `text`, for change detection
    pub content_hash: String,
}

/// Stable extractor trait for content extraction.
pub trait Extractor: Send + Sync {
    /// Extract structured plain text from raw HTML.
    fn extract(&self, html: &str) -> Result<ExtractionResult, Error>;
}

/// Hierarchy-aware extractor for TYPO3-style pages.
#[derive(Debug)]
pub struct StructuredExtractor {
    config: ExtractConfig,
    walker: StructuralWalker,
    pipeline: TextPipeline,
}

impl StructuredExtractor {
    pub fn new(config: ExtractConfig) -> Self {
        let walker = StructuralWalker::new(config.max_depth, &config.skip_tags);
        let pipeline = TextPipeline::standard(config.end_marker.clone());
        Self { config, walker, pipeline }
    }

    /// Replace the post-walk text pipeline.
    pub fn with_pipeline(mut self, pipeline: TextPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }
}

impl Default for StructuredExtractor {
    fn default() -> Self {
        Self::new(ExtractConfig::default())
    }
}

impl Extractor for StructuredExtractor {
    fn extract(&self, html: &str) -> Result<ExtractionResult, Error> {
        let bounded = bound_after_marker(html, &self.config.begin_marker);
        let begin_marker_found = bounded.len() != html.len();
        let bounded = if begin_marker_found { bounded.strip_prefix(COMMENT_CLOSE).unwrap_or(bounded) } else { bounded };

        let document = Html::parse_document(bounded);
        let blocks = self.walker.walk(&document);
        let joined = collapse_blank_lines(&blocks);
        let text = self.pipeline.run(&joined);

        tracing::debug!(
            html_bytes = html.len(),
            bounded_bytes = bounded.len(),
            blocks = blocks.len(),
            text_bytes = text.len(),
            begin_marker_found,
            "extracted structured text"
        );

        if text.is_empty() {
            return Err(Error::ExtractFailed("no text content found".into()));
        }

        let content_hash = content_hash(&text);
        Ok(ExtractionResult { text, blocks: blocks.len(), begin_marker_found, content_hash })
    }
}

/// Extract structured text from raw HTML with the default configuration.
///
/// Returns `None` when the page yields no text.
pub fn extract(html: &str) -> Option<String> {
    match StructuredExtractor::default().extract(html) {
        Ok(result) => Some(result.text),
        Err(e) => {
            tracing::debug!("extraction produced nothing: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPO3_PAGE: &str = r#"
        <!DOCTYPE html>
        <html>
        <head><title>Fakultät</title><script>var tracking = 1;</script></head>
        <body>
            <nav><ul><li>Home</li><li>Studium</li></ul></nav>
            <!--TYPO3SEARCH_begin-->
            <h1>Studienberatung</h1>
            <p>Schreiben Sie an beratung (at) tum (dot) de.</p>
            <h2>Sprechzeiten</h2>
            <ul>
                <li>Montag&nbsp;&nbsp;10-12 Uhr</li>
                <li>Mittwoch 14-16 Uhr</li>
            </ul>
            <!--TYPO3SEARCH_end-->
            <footer><p>Impressum</p></footer>
        </body>
        </html>
    "#;

    #[test]
    fn test_extract_config_default() {
        let config = ExtractConfig::default();
        assert_eq!(config.begin_marker, "TYPO3SEARCH_begin");
        assert_eq!(config.end_marker, "TYPO3SEARCH_end");
        assert_eq!(config.max_depth, 1000);
        assert!(config.skip_tags.contains(&"script".to_string()));
    }

    #[test]
    fn test_extract_config_from_app_config() {
        let app = AppConfig { max_depth: 50, end_marker: "END".into(), ..Default::default() };
        let config = ExtractConfig::from(&app);
        assert_eq!(config.max_depth, 50);
        assert_eq!(config.end_marker, "END");
        assert_eq!(config.begin_marker, "TYPO3SEARCH_begin");
    }

    #[test]
    fn test_end_to_end_scenario() {
        let html = "<h1>Welcome</h1><p>Contact us at info (at) school (dot) edu.</p><ul><li>Item A</li><li>Item B</li></ul>";
        let text = extract(html).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Welcome", "Contact us at info@school.edu.", "  - Item A", "  - Item B"]);
    }

    #[test]
    fn test_typo3_page_is_bounded() {
        let result = StructuredExtractor::default().extract(TYPO3_PAGE).unwrap();
        assert!(result.begin_marker_found);
        assert!(!result.text.contains("Home"));
        assert!(!result.text.contains("-->"));
        assert!(result.text.starts_with("Studienberatung"));
        assert!(result.text.contains("Schreiben Sie an beratung@tum.de."));
        assert!(result.text.contains("\n    Sprechzeiten"));
        assert!(result.text.contains("  - Montag 10-12 Uhr"));
        assert!(result.text.contains("  - Mittwoch 14-16 Uhr"));
        assert_eq!(result.content_hash, content_hash(&result.text));
    }

    #[test]
    fn test_without_begin_marker_whole_page_is_used() {
        let html = "<nav>Menu</nav><p>Body</p>";
        let result = StructuredExtractor::default().extract(html).unwrap();
        assert!(!result.begin_marker_found);
        assert_eq!(result.text, "Menu\nBody");
    }

    #[test]
    fn test_begin_marker_bounds_parsing() {
        let html = "<p>before</p>TYPO3SEARCH_begin<p>after</p>";
        assert_eq!(extract(html).unwrap(), "after");
    }

    #[test]
    fn test_end_marker_in_text_truncates_at_last_occurrence() {
        let html = "<p>keep TYPO3SEARCH_end keep too</p><p>TYPO3SEARCH_end</p><p>footer</p>";
        assert_eq!(extract(html).unwrap(), "keep TYPO3SEARCH_end keep too");
    }

    #[test]
    fn test_window_flow_lines_removed() {
        let html = "<p>Text</p><div>window.flowRuntime = {}</div>";
        assert_eq!(extract(html).unwrap(), "Text");
    }

    #[test]
    fn test_zero_width_space_removed_end_to_end() {
        let html = "<p>Hello \u{200B} World</p>";
        assert_eq!(extract(html).unwrap(), "Hello World");
    }

    #[test]
    fn test_empty_headings_leave_single_blank_line() {
        let text = extract("<p>a</p><h2></h2><h3> </h3><h2></h2><p>b</p>").unwrap();
        assert_eq!(text, "a\n\nb");
        assert!(!text.contains("\n\n\n"));
    }

    #[test]
    fn test_extract_empty_html() {
        assert!(extract("").is_none());
        assert!(StructuredExtractor::default().extract("<html><body></body></html>").is_err());
    }

    #[test]
    fn test_extract_malformed_html() {
        let text = extract("<div><p>unclosed <b>bold<li>stray</div></span>").unwrap();
        assert!(text.contains("unclosed"));
        assert!(text.contains("stray"));
    }

    #[test]
    fn test_custom_pipeline() {
        let extractor = StructuredExtractor::default().with_pipeline(TextPipeline::standard("END").without("addresses"));
        let result = extractor.extract("<p>a (at) b (dot) c</p>").unwrap();
        assert_eq!(result.text, "a (at) b (dot) c");
    }

    #[test]
    fn test_blocks_counted() {
        let result = StructuredExtractor::default().extract("<h1>T</h1><p>P</p><ul><li>1</li><li>2</li></ul>").unwrap();
        assert_eq!(result.blocks, 4);
    }
}
