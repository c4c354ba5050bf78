//! Error taxonomy for the aggregation pipeline
//!
//! The HTTP layer classifies provider failures into tagged `ApiError`
//! variants before any retry logic sees them, so nothing downstream has to
//! match on provider error strings. `EngineError` is the request-level
//! taxonomy surfaced at the boundary; `RequestError` couples it with the
//! per-request log trail so partial failures stay explainable.

use thiserror::Error;

/// Classified outcome of a single provider API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP 429. Retryable; carries `Retry-After` seconds when the provider
    /// supplied one.
    #[error("rate limited by provider (retry after {0:?}s)")]
    RateLimited(Option<u64>),

    /// Bounded retries exhausted on a rate-limited endpoint.
    #[error("rate limit exceeded after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    /// HTTP 403/404 on a specific resource. Recovered locally by skipping
    /// the room, never retried.
    #[error("access denied (HTTP {status})")]
    AccessDenied { status: u16 },

    /// HTTP 401: the access token is no longer accepted.
    #[error("provider rejected the access token")]
    Unauthorized,

    /// Any other non-success HTTP status.
    #[error("HTTP {status} for {url}: {body}")]
    Http {
        status: u16,
        url: String,
        body: String,
    },

    /// Transport or body-decoding failure.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// Whether a bounded-backoff retry is worthwhile.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::RateLimited(_))
    }

    /// Whether the caller should skip this resource and continue with
    /// siblings instead of treating the error as terminal.
    pub fn is_skippable(&self) -> bool {
        matches!(self, ApiError::AccessDenied { .. })
    }
}

/// Request-level failures surfaced at the engine boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No usable credentials for the session. Normal and recoverable: the
    /// caller resolves it by re-authenticating, distinct from server errors.
    #[error("session is not authenticated")]
    Unauthenticated,

    /// The request itself is malformed (unparseable dates, empty ranges).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Listing candidate rooms failed, which prevents any per-room work.
    #[error("failed to list rooms: {0}")]
    RoomListing(#[source] ApiError),

    /// Anything unexpected anywhere in the pipeline.
    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

/// An engine failure together with the log lines accumulated before it, so
/// the boundary can report both.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RequestError {
    pub error: EngineError,
    pub logs: Vec<String>,
}

impl RequestError {
    pub fn new(error: EngineError, logs: Vec<String>) -> Self {
        Self { error, logs }
    }

    /// True when the failure is the recoverable re-auth case.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self.error, EngineError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_is_retryable() {
        assert!(ApiError::RateLimited(Some(5)).is_retryable());
        assert!(!ApiError::RateLimitExceeded { attempts: 4 }.is_retryable());
        assert!(!ApiError::AccessDenied { status: 403 }.is_retryable());
    }

    #[test]
    fn test_access_denied_is_skippable() {
        assert!(ApiError::AccessDenied { status: 404 }.is_skippable());
        assert!(!ApiError::Unauthorized.is_skippable());
        assert!(!ApiError::RateLimited(None).is_skippable());
    }

    #[test]
    fn test_request_error_classification() {
        let err = RequestError::new(EngineError::Unauthenticated, vec!["a".into()]);
        assert!(err.is_unauthenticated());
        let err = RequestError::new(
            EngineError::InvalidRequest("bad date".into()),
            Vec::new(),
        );
        assert!(!err.is_unauthenticated());
    }
}
