use thiserror::Error;

/// Errors from [`crate::semantic::SemanticSimilarity::compare`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    /// No semantic backend is configured.
    #[error("semantic similarity is not configured")]
    Unavailable,
    /// The backend did not answer in time.
    #[error("semantic similarity request timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },
    /// The request never reached the backend or the connection failed.
    #[error("network error talking to semantic backend: {message}")]
    Network {
        /// Transport error description.
        message: String,
    },
    /// The backend answered with a non-success HTTP status.
    #[error("semantic backend returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },
    /// The backend answered but the payload could not be understood.
    #[error("malformed semantic response: {message}")]
    MalformedResponse {
        /// What was wrong with the payload.
        message: String,
    },
    /// The comparison was requested outside a Tokio runtime, so it could not
    /// be bounded by a timeout.
    #[error("semantic similarity needs a Tokio runtime")]
    NoRuntime,
    /// The backend produced a confidence that is NaN or infinite.
    #[error("semantic confidence is not a finite number")]
    NonFiniteConfidence,
}
