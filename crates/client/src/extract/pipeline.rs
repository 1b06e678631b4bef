//! Ordered text transforms applied after the structural walk.
//!
//! Each stage is a named `&str -> String` function. Stages run in order and
//! can be dropped by name, which keeps them independently testable.

use std::fmt;

use super::address::deobfuscate_addresses;
use super::marker::truncate_tail;
use super::normalize::normalize_whitespace;

type StageFn = Box<dyn Fn(&str) -> String + Send + Sync>;

/// One named transform.
pub struct TextStage {
    name: &'static str,
    apply: StageFn,
}

impl TextStage {
    pub fn new(name: &'static str, apply: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self { name, apply: Box::new(apply) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn apply(&self, text: &str) -> String {
        (self.apply)(text)
    }
}

impl fmt::Debug for TextStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextStage").field("name", &self.name).finish()
    }
}

/// Ordered list of text stages.
#[derive(Debug, Default)]
pub struct TextPipeline {
    stages: Vec<TextStage>,
}

impl TextPipeline {
    /// Whitespace normalization, address de-obfuscation, tail truncation.
    pub fn standard(end_marker: impl Into<String>) -> Self {
        let end_marker = end_marker.into();
        Self::default()
            .with_stage(TextStage::new("whitespace", normalize_whitespace))
            .with_stage(TextStage::new("addresses", deobfuscate_addresses))
            .with_stage(TextStage::new("tail", move |text| truncate_tail(text, &end_marker)))
    }

    pub fn with_stage(mut self, stage: TextStage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Remove the stage called `name`, if present.
    pub fn without(mut self, name: &str) -> Self {
        self.stages.retain(|s| s.name != name);
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(TextStage::name).collect()
    }

    pub fn run(&self, text: &str) -> String {
        let mut current = text.to_string();
        for stage in &self.stages {
            current = stage.apply(&current);
            tracing::trace!(stage = stage.name, len = current.len(), "applied text stage");
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_stage_order() {
        let pipeline = TextPipeline::standard("TYPO3SEARCH_end");
        assert_eq!(pipeline.stage_names(), vec!["whitespace", "addresses", "tail"]);
    }

    #[test]
    fn test_standard_pipeline_runs_all_stages() {
        let pipeline = TextPipeline::standard("TYPO3SEARCH_end");
        let out = pipeline.run("  mail\u{00A0}info (at) tum (dot) de  TYPO3SEARCH_end footer");
        assert_eq!(out, "mail info@tum.de");
    }

    #[test]
    fn test_without_removes_stage() {
        let pipeline = TextPipeline::standard("END").without("addresses");
        assert_eq!(pipeline.stage_names(), vec!["whitespace", "tail"]);
        assert_eq!(pipeline.run("a (at) b (dot) c END x"), "a (at) b (dot) c");
    }

    #[test]
    fn test_custom_stage() {
        let pipeline = TextPipeline::default().with_stage(TextStage::new("upper", |t| t.to_uppercase()));
        assert_eq!(pipeline.run("abc"), "ABC");
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        assert_eq!(TextPipeline::default().run("same"), "same");
    }
}
