//! MCP tool implementations.
//!
//! This module contains all tools exposed by the mcp-webtext server.

pub mod page_batch_open;
pub mod page_extract;
pub mod page_open;

pub use page_batch_open::PageBatchOpenParams;
pub use page_extract::PageExtractParams;
pub use page_open::PageOpenParams;
