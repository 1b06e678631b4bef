//! Client code for webtext.
//!
//! This crate provides the structured text extraction engine, the HTTP fetch
//! pipeline, and the fetch-and-extract wrapper shared by the server.

pub mod extract;
pub mod fetch;
pub mod page;

pub use extract::{
    BlockKind, ContentBlock, ExtractConfig, ExtractionResult, Extractor, StructuredExtractor, TextPipeline, TextStage,
    extract,
};

pub use fetch::{FetchClient, FetchConfig, FetchResponse};
pub use page::{PageExtractor, PageText};
