//! Ticket form state machine.

use std::collections::VecDeque;

use concierge_core::events::{SessionEvent, Surface};
use concierge_gateway::SupportGateway;

/// Validation notice shown when a required field is empty.
const VALIDATION_NOTICE: &str = "Please fill in all fields.";

/// Failure notice shown when the submission could not be delivered.
const FAILURE_NOTICE: &str = "Failed to submit ticket. Please try again.";

/// Lifecycle of a ticket submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketStatus {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl TicketStatus {
    fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Idle => "idle",
            TicketStatus::Submitting => "submitting",
            TicketStatus::Succeeded => "succeeded",
            TicketStatus::Failed => "failed",
        }
    }
}

/// Support-ticket form.
///
/// Created empty, mutated by input setters, and driven through
/// Idle -> Submitting -> Succeeded/Failed by `submit`. Success clears both
/// fields; failure preserves them so the user can retry. Exactly one
/// submission can be in flight.
pub struct TicketForm<G> {
    gateway: G,
    email: String,
    issue_description: String,
    status: TicketStatus,
    notice: Option<String>,
    events: VecDeque<SessionEvent>,
}

impl<G: SupportGateway> TicketForm<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            email: String::new(),
            issue_description: String::new(),
            status: TicketStatus::Idle,
            notice: None,
            events: VecDeque::new(),
        }
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_issue_description(&mut self, description: impl Into<String>) {
        self.issue_description = description.into();
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn issue_description(&self) -> &str {
        &self.issue_description
    }

    pub fn status(&self) -> TicketStatus {
        self.status
    }

    /// The message currently displayed under the form, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Submit the form.
    ///
    /// Returns `false` without touching the network when a submission is
    /// already in flight or a required field is empty; in the latter case a
    /// validation notice is set. Otherwise performs the gateway call and
    /// resolves to `Succeeded` or `Failed`.
    pub async fn submit(&mut self) -> bool {
        if self.status == TicketStatus::Submitting {
            return false;
        }
        if self.email.trim().is_empty() || self.issue_description.trim().is_empty() {
            self.notice = Some(VALIDATION_NOTICE.to_string());
            return false;
        }

        self.set_status(TicketStatus::Submitting);
        self.notice = None;

        match self
            .gateway
            .submit_ticket(&self.email, &self.issue_description)
            .await
        {
            Ok(message) => {
                self.set_status(TicketStatus::Succeeded);
                self.notice = Some(message);
                self.email.clear();
                self.issue_description.clear();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ticket submission failed");
                self.set_status(TicketStatus::Failed);
                self.notice = Some(FAILURE_NOTICE.to_string());
            }
        }
        true
    }

    /// Return a resolved form to `Idle`, clearing the notice.
    ///
    /// No-op while a submission is in flight.
    pub fn reset(&mut self) {
        if self.status != TicketStatus::Submitting {
            self.set_status(TicketStatus::Idle);
            self.notice = None;
        }
    }

    /// Take all queued view side effects, in emission order.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }

    fn set_status(&mut self, status: TicketStatus) {
        self.status = status;
        self.events.push_back(SessionEvent::StatusChanged {
            surface: Surface::Ticket,
            status: status.as_str().to_string(),
        });
    }
}

// =============================================================================
// Tests
// =============================================================================
