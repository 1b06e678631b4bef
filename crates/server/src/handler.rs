//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{
    PageBatchOpenParams, PageExtractParams, PageOpenParams, page_batch_open::batch_open_impl,
    page_extract::extract_impl, page_open::open_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use webtext_client::PageExtractor;
use webtext_core::{AppConfig, Error};

/// The main MCP server handler for mcp-webtext.
#[derive(Clone)]
pub struct WebTextServer {
    tool_router: ToolRouter<Self>,
    config: Arc<AppConfig>,
    pages: Arc<PageExtractor>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl WebTextServer {
    /// Create a new server handler sharing one HTTP client across tool calls.
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        let pages = PageExtractor::from_config(&config)?;
        Ok(Self { tool_router: Self::tool_router(), config: Arc::new(config), pages: Arc::new(pages) })
    }

    /// Extract structured text from HTML.
    ///
    /// No network requests are made.
    #[tool(
        description = "Extract structured plain text from TYPO3 page HTML. Content before the begin marker and after the end marker is dropped, headings and list items are indented, and obfuscated e-mail addresses are restored."
    )]
    async fn page_extract(&self, params: Parameters<PageExtractParams>) -> Result<CallToolResult, McpError> {
        extract_impl(&self.config, params.0).await
    }

    /// Fetch a page and extract structured text from it.
    #[tool(description = "Fetch a URL and extract structured plain text from the page. Only 200 OK responses are extracted.")]
    async fn page_open(&self, params: Parameters<PageOpenParams>) -> Result<CallToolResult, McpError> {
        open_impl(&self.pages, params.0).await
    }

    /// Fetch and extract multiple pages concurrently.
    #[tool(
        description = "Fetch and extract multiple URLs in parallel (default 4, max 16 concurrent). Results are returned in input order with a summary."
    )]
    async fn page_batch_open(&self, params: Parameters<PageBatchOpenParams>) -> Result<CallToolResult, McpError> {
        batch_open_impl(Arc::clone(&self.pages), params.0).await
    }
}

impl ServerHandler for WebTextServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "mcp-webtext".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lists_all_tools() {
        let server = WebTextServer::new(AppConfig::default()).unwrap();
        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(names, vec!["page_batch_open", "page_extract", "page_open"]);
    }

    #[tokio::test]
    async fn test_server_info() {
        let server = WebTextServer::new(AppConfig::default()).unwrap();
        let info = server.get_info();
        assert_eq!(info.server_info.name, "mcp-webtext");
        assert!(info.capabilities.tools.is_some());
    }
}
