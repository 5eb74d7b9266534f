//! Core trait for the request executor
//!
//! The trait is defined in core so the worker loop stays independent of any
//! HTTP stack. The reqwest implementation lives in `http-bench-client`.

use crate::request::RequestSpec;
use async_trait::async_trait;
use std::time::Duration;

// ============================================================================
// HTTP Client Trait
// ============================================================================

/// Executes a single request attempt
///
/// Implementations must be safe to call repeatedly with the same
/// [`RequestSpec`] and must read the full response body before returning so
/// connections can be reused.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Client identifier used in logs
    fn name(&self) -> &str;

    /// Perform one attempt and return the response status code
    ///
    /// Any status, including 4xx and 5xx, is `Ok`. `Err` is reserved for
    /// attempts that produced no status at all.
    async fn execute(&self, request: &RequestSpec) -> Result<u16, RequestError>;
}

/// Failure of a single request attempt
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// Could not establish a connection
    #[error("connection failed: {0}")]
    Connect(String),

    /// Attempt exceeded the client timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Response body could not be read to the end
    #[error("failed to read response body: {0}")]
    Body(String),

    /// Request could not be constructed; repeating it cannot succeed
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Any other transport failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The executor panicked mid-attempt
    #[error("request executor panicked: {0}")]
    Panicked(String),
}

impl RequestError {
    /// Whether the worker that hit this error should stop issuing requests
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RequestError::InvalidRequest(_) | RequestError::Panicked(_)
        )
    }

    /// Short label for logs and summaries
    pub fn label(&self) -> &'static str {
        match self {
            RequestError::Connect(_) => "connect",
            RequestError::Timeout(_) => "timeout",
            RequestError::Body(_) => "body",
            RequestError::InvalidRequest(_) => "invalid_request",
            RequestError::Transport(_) => "transport",
            RequestError::Panicked(_) => "panic",
        }
    }
}
