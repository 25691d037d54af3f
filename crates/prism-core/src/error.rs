//! Error types for Prism
//!
//! One tagged variant per failure class, so callers branch with pattern
//! matching instead of inspecting message text.

use thiserror::Error;

/// The main error type for Prism operations
#[derive(Debug, Error)]
pub enum PrismError {
    /// Bad local input: missing file, non-file path, malformed request,
    /// or a 400 from the remote service.
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Permission denied: {0}")]
    PermissionError(String),

    #[error("Rate limited: {0}")]
    RateLimitError(String),

    /// Unclassified non-2xx response from the remote service.
    #[error("Server error: {0}")]
    ServerError(String),

    /// Transport succeeded but the payload was malformed.
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Request timeout or connection failure.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The job exceeded its overall wall-clock budget.
    #[error("Job timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for Prism operations
pub type Result<T> = std::result::Result<T, PrismError>;

impl PrismError {
    /// Whether a status-read failure of this kind may be retried.
    ///
    /// Only server hiccups and network failures qualify; everything else
    /// denotes a local precondition failure or a definitive remote answer.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PrismError::ServerError(_) | PrismError::TransportError(_)
        )
    }
}
