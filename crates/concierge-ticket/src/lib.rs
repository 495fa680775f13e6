//! Support-ticket submission form for the Concierge client.
//!
//! An independent request/response flow: local validation, one submission in
//! flight at a time, clear-on-success and preserve-on-failure semantics.

pub mod form;

pub use form::{TicketForm, TicketStatus};
