//! Error types for the support gateway.

use concierge_core::error::ConciergeError;

/// Errors from a support backend call.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Whether a fresh attempt could plausibly succeed.
    ///
    /// Network failures, timeouts, and 5xx responses are retryable; 4xx
    /// responses and malformed bodies are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Network(_) | GatewayError::Timeout => true,
            GatewayError::Backend { status, .. } => *status >= 500,
            GatewayError::InvalidResponse(_) => false,
        }
    }
}

impl From<GatewayError> for ConciergeError {
    fn from(err: GatewayError) -> Self {
        ConciergeError::Gateway(err.to_string())
    }
}
