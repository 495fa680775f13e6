//! Voice session state machine over an embedded provider bridge.

use serde::{Deserialize, Serialize};

use concierge_core::config::VoiceConfig;

use crate::error::VoiceError;

/// Coarse status of the voice session, driven entirely by provider events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Connecting,
    Ready,
    Active,
    Error,
}

/// Who produced an utterance in the voice conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    User,
    Assistant,
}

/// Lifecycle notifications reported by the embedded voice provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoiceEvent {
    CallStarted,
    CallEnded,
    Message { speaker: Speaker, content: String },
    Failed { message: String },
}

/// Seam to the embedded third-party voice SDK.
///
/// The real provider lives outside this repository; the session only needs
/// start and stop. `stop` must be safe to call at most once per started
/// session, which [`VoiceSession`] guarantees.
pub trait VoiceBridge {
    fn start(&mut self, assistant_id: &str) -> Result<(), VoiceError>;
    fn stop(&mut self);
}

/// Bridge used when no voice provider is compiled in. Starting always fails.
#[derive(Debug, Default)]
pub struct UnsupportedBridge;

impl VoiceBridge for UnsupportedBridge {
    fn start(&mut self, _assistant_id: &str) -> Result<(), VoiceError> {
        Err(VoiceError::Unavailable)
    }

    fn stop(&mut self) {}
}

/// One continuous voice interaction.
///
/// Holds the provider bridge for the duration of the session and guarantees
/// the underlying session is stopped on every exit path: `stop` is
/// idempotent, and `Drop` stops a still-running session so the microphone is
/// always released.
pub struct VoiceSession<B: VoiceBridge> {
    bridge: B,
    public_key: String,
    assistant_id: String,
    status: SessionStatus,
    user_speech: Option<String>,
    assistant_reply: Option<String>,
    diagnostic: Option<String>,
    started: bool,
}

impl<B: VoiceBridge> VoiceSession<B> {
    pub fn new(bridge: B, config: &VoiceConfig) -> Self {
        Self {
            bridge,
            public_key: config.public_key.clone(),
            assistant_id: config.assistant_id.clone(),
            status: SessionStatus::Connecting,
            user_speech: None,
            assistant_reply: None,
            diagnostic: None,
            started: false,
        }
    }

    /// Start the embedded session.
    ///
    /// Both credential identifiers must be configured; otherwise the session
    /// enters the `Error` state with a diagnostic and the bridge is never
    /// started.
    pub fn start(&mut self) -> Result<(), VoiceError> {
        let mut missing = Vec::new();
        if self.public_key.trim().is_empty() {
            missing.push("public_key");
        }
        if self.assistant_id.trim().is_empty() {
            missing.push("assistant_id");
        }
        if !missing.is_empty() {
            let err = VoiceError::MissingCredentials(missing.join(", "));
            self.status = SessionStatus::Error;
            self.diagnostic = Some(err.to_string());
            return Err(err);
        }

        match self.bridge.start(&self.assistant_id) {
            Ok(()) => {
                self.started = true;
                self.status = SessionStatus::Ready;
                tracing::info!("Voice session started");
                Ok(())
            }
            Err(e) => {
                self.status = SessionStatus::Error;
                self.diagnostic = Some(e.to_string());
                tracing::warn!(error = %e, "Voice session failed to start");
                Err(e)
            }
        }
    }

    /// Apply a provider lifecycle notification.
    pub fn handle_event(&mut self, event: VoiceEvent) {
        match event {
            VoiceEvent::CallStarted => {
                self.user_speech = None;
                self.assistant_reply = None;
                self.status = SessionStatus::Active;
            }
            VoiceEvent::CallEnded => {
                self.status = SessionStatus::Ready;
            }
            VoiceEvent::Message { speaker, content } => {
                // Most-recent utterance only, not a running log.
                match speaker {
                    Speaker::User => self.user_speech = Some(content),
                    Speaker::Assistant => self.assistant_reply = Some(content),
                }
            }
            VoiceEvent::Failed { message } => {
                tracing::warn!(message = %message, "Voice provider reported an error");
                self.status = SessionStatus::Error;
                self.diagnostic = Some(message);
            }
        }
    }

    /// Stop the underlying session, releasing the audio resource.
    ///
    /// Idempotent: only the first call after a successful start reaches the
    /// bridge.
    pub fn stop(&mut self) {
        if self.started {
            self.bridge.stop();
            self.started = false;
            self.status = SessionStatus::Ready;
            tracing::info!("Voice session stopped");
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// The most recent user utterance, if any.
    pub fn user_speech(&self) -> Option<&str> {
        self.user_speech.as_deref()
    }

    /// The most recent assistant utterance, if any.
    pub fn assistant_reply(&self) -> Option<&str> {
        self.assistant_reply.as_deref()
    }

    /// Diagnostic text for the `Error` state.
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl<B: VoiceBridge> Drop for VoiceSession<B> {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// Tests
// =============================================================================
