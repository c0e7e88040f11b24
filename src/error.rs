//! Error types for the refreshing cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Boxed error used as the underlying cause of a fetch failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// == Fetch Error Kind ==
/// Distinguishes a plain source failure from the request to fall back to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The underlying source failed
    Source,
    /// The fetcher asks the cache to use its default value instead
    UseDefault,
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchErrorKind::Source => f.write_str("source failure"),
            FetchErrorKind::UseDefault => f.write_str("use default value"),
        }
    }
}

// == Fetch Error ==
/// Error returned by a fetcher. The `kind` field carries the use-default signal.
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl FetchError {
    /// Creates a plain source failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Source,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a source failure wrapping an underlying error.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self {
            kind: FetchErrorKind::Source,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates the use-default signal.
    pub fn use_default(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::UseDefault,
            message: message.into(),
            source: None,
        }
    }

    pub fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn is_use_default(&self) -> bool {
        self.kind == FetchErrorKind::UseDefault
    }
}

// == Cache Error Enum ==
/// Unified error type for the refreshing cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The fetch failed and no fallback applied
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The fetcher asked for a default value but provides none
    #[error("Default value unimplemented for key: {0}")]
    DefaultUnimplemented(String),

    /// Rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::Fetch(_) => StatusCode::BAD_GATEWAY,
            CacheError::DefaultUnimplemented(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidConfiguration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the refreshing cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_use_default_is_tagged() {
        let err = FetchError::use_default("missing");
        assert!(err.is_use_default());
        assert_eq!(err.kind(), FetchErrorKind::UseDefault);
        assert!(!FetchError::new("boom").is_use_default());
    }

    #[test]
    fn test_fetch_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
        let err = FetchError::with_source("upstream unreachable", io);

        assert_eq!(err.to_string(), "source failure: upstream unreachable");
        let source = err.source().expect("source should be kept");
        assert_eq!(source.to_string(), "connection reset");
    }

    #[test]
    fn test_cache_error_display() {
        let err = CacheError::from(FetchError::new("boom"));
        assert_eq!(err.to_string(), "Fetch failed: source failure: boom");

        let err = CacheError::DefaultUnimplemented("k".to_string());
        assert!(err.to_string().contains("k"));
    }

    #[test]
    fn test_error_status_codes() {
        let resp = CacheError::from(FetchError::new("boom")).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let resp = CacheError::DefaultUnimplemented("k".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = CacheError::InvalidConfiguration("ttl".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
