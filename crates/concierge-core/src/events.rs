use serde::{Deserialize, Serialize};

/// The interactive surface an event belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Surface {
    Chat,
    Ticket,
    Voice,
}

/// Side effects emitted by surface controllers and consumed by the view.
///
/// Controllers queue these after state changes; the view drains the queue
/// once the interaction completes. All processing is single-threaded with
/// run-to-completion semantics, so no synchronization is involved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SessionEvent {
    /// A turn was appended to the message store.
    TurnAppended { surface: Surface },

    /// The view should scroll the transcript to the latest turn.
    ScrollToLatest,

    /// The draft input was replaced, e.g. by selecting a quick reply.
    InputPopulated { text: String },

    /// A surface changed its coarse status (submitting, ready, error, ...).
    StatusChanged { surface: Surface, status: String },
}
