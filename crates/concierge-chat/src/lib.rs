//! Conversational session for the Concierge support client.
//!
//! Owns the ordered transcript of turns and the controller that drives the
//! user input -> gateway call -> transcript update cycle. Errors from the
//! gateway never escape this crate: every failure becomes a visible
//! failure-marked turn.

pub mod controller;
pub mod store;
pub mod types;

pub use controller::{ControllerState, ConversationController, SubmitOutcome};
pub use store::MessageStore;
pub use types::{Role, Turn, TurnKind};
