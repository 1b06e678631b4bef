//! Unified error types for webtext.
//!
//! Every variant renders with a stable code prefix so callers and logs can
//! classify failures without matching on message text.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the webtext engine and server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty HTML).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Extraction produced no usable text.
    #[error("EXTRACT_FAILED: {0}")]
    ExtractFailed(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// The server answered with something other than 200 OK.
    #[error("HTTP_STATUS: {0}")]
    HttpStatus(u16),

    /// Network or protocol error while fetching.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),
}

impl Error {
    /// Whether this error came from the fetch step rather than extraction.
    ///
    /// Fetch failures are expected and recoverable; callers decide whether to
    /// retry.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Error::HttpStatus(_) | Error::HttpError(_) | Error::FetchTimeout(_) | Error::FetchTooLarge(_)
        )
    }

    /// Stable short code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::ExtractFailed(_) => "EXTRACT_FAILED",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::HttpStatus(_) => "HTTP_STATUS",
            Error::HttpError(_) => "HTTP_ERROR",
            Error::FetchTimeout(_) => "FETCH_TIMEOUT",
            Error::FetchTooLarge(_) => "FETCH_TOO_LARGE",
        }
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::ExtractFailed(msg) => (-32000, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::HttpStatus(status) => (-32008, format!("status {status}")),
            Error::HttpError(msg) => (-32008, msg.clone()),
            Error::FetchTimeout(msg) => (-32006, msg.clone()),
            Error::FetchTooLarge(msg) => (-32007, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::HttpStatus(404);
        assert_eq!(err.to_string(), "HTTP_STATUS: 404");
    }

    #[test]
    fn test_error_code_matches_display_prefix() {
        let err = Error::ExtractFailed("no text".to_string());
        assert!(err.to_string().starts_with(err.code()));
    }

    #[test]
    fn test_fetch_failure_classification() {
        assert!(Error::HttpStatus(500).is_fetch_failure());
        assert!(Error::FetchTimeout("10s".into()).is_fetch_failure());
        assert!(Error::HttpError("reset".into()).is_fetch_failure());
        assert!(!Error::ExtractFailed("empty".into()).is_fetch_failure());
        assert!(!Error::InvalidUrl("nope".into()).is_fetch_failure());
    }

    #[test]
    fn test_error_to_mcp_error() {
        let mcp_err: McpError = Error::InvalidInput("html cannot be empty".to_string()).into();
        assert_eq!(mcp_err.code.0, -32602);

        let mcp_err: McpError = Error::HttpStatus(503).into();
        assert_eq!(mcp_err.code.0, -32008);
        assert_eq!(mcp_err.message, "status 503");
    }
}
