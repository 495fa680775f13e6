//! Voice session lifecycle for the Concierge client.
//!
//! The audio conversation itself is delegated to an embedded third-party
//! provider behind the [`VoiceBridge`] trait; this crate only starts and
//! stops the session and reflects coarse status from provider events.

pub mod error;
pub mod session;

pub use error::VoiceError;
pub use session::{
    SessionStatus, Speaker, UnsupportedBridge, VoiceBridge, VoiceEvent, VoiceSession,
};
