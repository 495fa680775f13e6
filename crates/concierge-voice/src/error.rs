//! Error types for the voice session.

use concierge_core::error::ConciergeError;

/// Errors from the voice session lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("missing voice credentials: {0}")]
    MissingCredentials(String),
    #[error("voice sessions are not available on this build")]
    Unavailable,
    #[error("voice provider error: {0}")]
    Provider(String),
}

impl From<VoiceError> for ConciergeError {
    fn from(err: VoiceError) -> Self {
        ConciergeError::Voice(err.to_string())
    }
}
