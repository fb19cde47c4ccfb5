use std::time::Duration;

use thiserror::Error;

/// Errors that can arise when calling an OpenAI-compatible API.
#[derive(Debug, Error)]
pub enum OpenAIError {
    /// The API key was rejected (HTTP 401/403).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Rate limited by the upstream service (HTTP 429).
    #[error("rate limited by the API{}", retry_after.map(|d| format!(", retry after {}s", d.as_secs())).unwrap_or_default())]
    RateLimit {
        /// Wait suggested by the `Retry-After` header, if present.
        retry_after: Option<Duration>,
    },

    /// Upstream server failure (HTTP 5xx).
    #[error("server error (HTTP {status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// HTTP transport errors.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API contract violations (bad request, missing fields in responses).
    #[error("{0}")]
    Api(String),
}
