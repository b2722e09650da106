//! Unified error types for quiz-assets.
//!
//! Every variant renders with a stable upper-case code prefix so callers and
//! logs can match on it without parsing free text.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the asset cache.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty text).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// No asset found for the given digest.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A record with this digest already exists.
    #[error("DUPLICATE_ASSET: {0}")]
    DuplicateAsset(String),

    /// Record failed structural validation before persistence.
    #[error("INVALID_ASSET: {0}")]
    InvalidAsset(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// SSRF blocked - private/internal address not allowed.
    #[error("SSRF_BLOCKED: {0}")]
    SsrfBlocked(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Network failure or non-success HTTP status.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Declared content type is not on the allow-list.
    #[error("UNACCEPTED_CONTENT_TYPE: {0}")]
    UnacceptedContentType(String),
}

impl Error {
    /// Whether this error comes from retrieving a remote resource.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidUrl(_)
                | Error::SsrfBlocked(_)
                | Error::FetchTimeout(_)
                | Error::FetchTooLarge(_)
                | Error::HttpError(_)
        )
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::CacheMiss(_) => -32001,
            Error::Database(_) | Error::MigrationFailed(_) | Error::DuplicateAsset(_) => -32002,
            Error::InvalidAsset(_) => -32013,
            Error::InvalidUrl(_) => -32003,
            Error::SsrfBlocked(_) => -32004,
            Error::FetchTimeout(_) => -32006,
            Error::FetchTooLarge(_) => -32007,
            Error::HttpError(_) => -32008,
            Error::UnacceptedContentType(_) => -32014,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::CacheMiss("abc123".to_string());
        assert!(err.to_string().contains("CACHE_MISS"));
        assert!(err.to_string().contains("abc123"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::CacheMiss("abc123".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32001);
    }

    #[test]
    fn test_invalid_input_maps_to_invalid_params() {
        let mcp_err: McpError = Error::InvalidInput("text".into()).into();
        assert_eq!(mcp_err.code.0, -32602);
        assert!(mcp_err.message.contains("INVALID_INPUT"));
    }

    #[test]
    fn test_is_fetch_error() {
        assert!(Error::HttpError("status 404".into()).is_fetch_error());
        assert!(Error::FetchTimeout("slow".into()).is_fetch_error());
        assert!(!Error::DuplicateAsset("d".into()).is_fetch_error());
        assert!(!Error::UnacceptedContentType("text/html".into()).is_fetch_error());
    }
}
