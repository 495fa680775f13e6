//! Turn types for the conversation transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// How a turn should be rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnKind {
    /// A normal message.
    Text,
    /// A failure notice standing in for an answer that never arrived.
    Failure,
}

/// One message in the conversation.
///
/// Turns are immutable once appended to the store. `suggestions` is either
/// absent or non-empty: the constructors normalize an empty list to `None`,
/// so the view never has to special-case an empty suggestion row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub kind: TurnKind,
    pub timestamp: Option<DateTime<Utc>>,
    pub suggestions: Option<Vec<String>>,
}

impl Turn {
    /// A user-authored turn, stamped at creation.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            kind: TurnKind::Text,
            timestamp: Some(Utc::now()),
            suggestions: None,
        }
    }

    /// An assistant answer, optionally carrying quick replies.
    pub fn assistant(content: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            kind: TurnKind::Text,
            timestamp: Some(Utc::now()),
            suggestions: normalize(suggestions),
        }
    }

    /// A failure notice shown in place of an assistant answer.
    pub fn failure(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            kind: TurnKind::Failure,
            timestamp: Some(Utc::now()),
            suggestions: None,
        }
    }

    /// Whether this turn is a failure notice rather than a real answer.
    pub fn is_failure(&self) -> bool {
        self.kind == TurnKind::Failure
    }

    /// Quick replies offered by this turn, if any.
    pub fn suggestions(&self) -> &[String] {
        self.suggestions.as_deref().unwrap_or(&[])
    }
}

fn normalize(suggestions: Vec<String>) -> Option<Vec<String>> {
    if suggestions.is_empty() {
        None
    } else {
        Some(suggestions)
    }
}
