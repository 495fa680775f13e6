//! Shared foundation for the Concierge support client.
//!
//! Holds the configuration model, the top-level error type, and the session
//! events that surface controllers emit for the view layer.

pub mod config;
pub mod error;
pub mod events;

pub use config::{BackendConfig, ChatConfig, ConciergeConfig, GeneralConfig, VoiceConfig};
pub use error::{ConciergeError, Result};
pub use events::{SessionEvent, Surface};
