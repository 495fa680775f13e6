//! Append-only message store for a conversation session.

use crate::types::Turn;

/// In-memory ordered list of conversation turns.
///
/// Insertion order is display order. Turns cannot be modified or removed once
/// appended; the store hands out shared references only. The store is owned
/// and mutated exclusively by the conversation controller.
#[derive(Debug, Default)]
pub struct MessageStore {
    turns: Vec<Turn>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn at the end of the transcript.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// All turns in display order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The most recently appended turn.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
