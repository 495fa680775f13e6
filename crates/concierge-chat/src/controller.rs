//! Conversation controller: user input -> gateway call -> transcript update.
//!
//! A two-state machine (Idle / AwaitingReply) with optimistic append: the
//! user turn lands in the store before the network call starts, and every
//! gateway failure becomes a visible failure turn instead of an error.

use std::collections::VecDeque;

use concierge_core::config::ChatConfig;
use concierge_core::events::{SessionEvent, Surface};
use concierge_gateway::SupportGateway;

use crate::store::MessageStore;
use crate::types::Turn;

/// Failure notice appended when the backend cannot be reached.
const FAILURE_NOTICE: &str = "Failed to reach support. Please try again.";

/// Controller states. At most one gateway call is in flight per session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    AwaitingReply,
}

/// What a `submit` call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A user turn was sent and a reply (or failure notice) was appended.
    Completed,
    /// The trimmed draft was empty; nothing happened.
    IgnoredEmpty,
    /// A reply was already pending; nothing happened.
    IgnoredBusy,
    /// The draft exceeded the configured maximum length; nothing happened.
    IgnoredTooLong,
}

/// Drives one conversation session against the support gateway.
///
/// Owns the message store exclusively; the view reads the transcript through
/// `store()` and reacts to drained [`SessionEvent`]s.
pub struct ConversationController<G> {
    gateway: G,
    store: MessageStore,
    input: String,
    state: ControllerState,
    config: ChatConfig,
    events: VecDeque<SessionEvent>,
}

impl<G: SupportGateway> ConversationController<G> {
    pub fn new(gateway: G, config: ChatConfig) -> Self {
        Self {
            gateway,
            store: MessageStore::new(),
            input: String::new(),
            state: ControllerState::Idle,
            config,
            events: VecDeque::new(),
        }
    }

    /// Submit the current draft input.
    ///
    /// No-op when the trimmed draft is empty or a reply is already pending.
    /// Otherwise the user turn is appended immediately, the draft is cleared,
    /// and the gateway is asked for an answer. Success appends an assistant
    /// turn carrying the configured quick replies; failure appends a
    /// failure-marked turn. Either way the controller returns to `Idle` and
    /// queues a scroll-to-latest event.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.state == ControllerState::AwaitingReply {
            return SubmitOutcome::IgnoredBusy;
        }
        let trimmed = self.input.trim().to_string();
        if trimmed.is_empty() {
            return SubmitOutcome::IgnoredEmpty;
        }
        if trimmed.chars().count() > self.config.max_message_length {
            tracing::debug!(
                max = self.config.max_message_length,
                "Draft over maximum length, ignoring submit"
            );
            return SubmitOutcome::IgnoredTooLong;
        }

        // Optimistic append: the user sees their turn before the reply lands.
        self.store.push(Turn::user(trimmed.clone()));
        self.events.push_back(SessionEvent::TurnAppended {
            surface: Surface::Chat,
        });
        self.input.clear();
        self.state = ControllerState::AwaitingReply;

        match self.gateway.ask(&trimmed).await {
            Ok(answer) => {
                self.store
                    .push(Turn::assistant(answer, self.config.quick_replies.clone()));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Support query failed");
                self.store.push(Turn::failure(FAILURE_NOTICE));
            }
        }
        self.events.push_back(SessionEvent::TurnAppended {
            surface: Surface::Chat,
        });
        self.state = ControllerState::Idle;
        self.events.push_back(SessionEvent::ScrollToLatest);
        SubmitOutcome::Completed
    }

    /// Re-populate the draft input with a suggestion's text.
    ///
    /// Does not append a turn and does not submit.
    pub fn select_suggestion(&mut self, text: &str) {
        self.input = text.to_string();
        self.events.push_back(SessionEvent::InputPopulated {
            text: text.to_string(),
        });
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.state == ControllerState::AwaitingReply
    }

    /// The transcript, in display order.
    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    /// Take all queued view side effects, in emission order.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use concierge_gateway::GatewayError;

    use crate::types::{Role, TurnKind};

    /// Gateway double that replays scripted results and records calls.
    struct ScriptedGateway {
        replies: Mutex<VecDeque<Result<String, GatewayError>>>,
        asked: Mutex<Vec<String>>,
    }

    impl ScriptedGateway {
        fn answering(answers: Vec<Result<String, GatewayError>>) -> Self {
            Self {
                replies: Mutex::new(answers.into()),
                asked: Mutex::new(Vec::new()),
            }
        }

        fn ask_count(&self) -> usize {
            self.asked.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SupportGateway for &ScriptedGateway {
        async fn ask(&self, question: &str) -> Result<String, GatewayError> {
            self.asked.lock().unwrap().push(question.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GatewayError::Network("unscripted call".to_string())))
        }

        async fn submit_ticket(
            &self,
            _email: &str,
            _description: &str,
        ) -> Result<String, GatewayError> {
            Err(GatewayError::Network("not a ticket test".to_string()))
        }
    }

    fn controller(gateway: &ScriptedGateway) -> ConversationController<&ScriptedGateway> {
        ConversationController::new(gateway, ChatConfig::default())
    }

    // ---- Empty and whitespace input ----

    #[tokio::test]
    async fn test_submit_empty_input_is_noop() {
        let gateway = ScriptedGateway::answering(vec![]);
        let mut ctrl = controller(&gateway);

        assert_eq!(ctrl.submit().await, SubmitOutcome::IgnoredEmpty);
        assert!(ctrl.store().is_empty());
        assert_eq!(gateway.ask_count(), 0);
        assert_eq!(ctrl.state(), ControllerState::Idle);
    }

    #[tokio::test]
    async fn test_submit_whitespace_only_is_noop() {
        let gateway = ScriptedGateway::answering(vec![]);
        let mut ctrl = controller(&gateway);
        ctrl.set_input("   \t  ");

        assert_eq!(ctrl.submit().await, SubmitOutcome::IgnoredEmpty);
        assert!(ctrl.store().is_empty());
        assert_eq!(gateway.ask_count(), 0);
    }

    // ---- Busy guard ----

    #[tokio::test]
    async fn test_submit_while_awaiting_reply_is_noop() {
        let gateway = ScriptedGateway::answering(vec![]);
        let mut ctrl = controller(&gateway);
        ctrl.set_input("hello");
        ctrl.state = ControllerState::AwaitingReply;

        assert_eq!(ctrl.submit().await, SubmitOutcome::IgnoredBusy);
        assert!(ctrl.store().is_empty());
        assert_eq!(gateway.ask_count(), 0);
        // Draft is preserved for when the pending reply resolves.
        assert_eq!(ctrl.input(), "hello");
    }

    // ---- Over-length guard ----

    #[tokio::test]
    async fn test_submit_over_max_length_is_noop() {
        let gateway = ScriptedGateway::answering(vec![]);
        let config = ChatConfig {
            max_message_length: 10,
            ..ChatConfig::default()
        };
        let mut ctrl = ConversationController::new(&gateway, config);
        ctrl.set_input("a".repeat(11));

        assert_eq!(ctrl.submit().await, SubmitOutcome::IgnoredTooLong);
        assert!(ctrl.store().is_empty());
        assert_eq!(gateway.ask_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_at_max_length_is_sent() {
        let gateway = ScriptedGateway::answering(vec![Ok("fine".to_string())]);
        let config = ChatConfig {
            max_message_length: 10,
            ..ChatConfig::default()
        };
        let mut ctrl = ConversationController::new(&gateway, config);
        ctrl.set_input("a".repeat(10));

        assert_eq!(ctrl.submit().await, SubmitOutcome::Completed);
        assert_eq!(gateway.ask_count(), 1);
    }

    // ---- Successful exchange ----

    #[tokio::test]
    async fn test_successful_submit_appends_user_then_assistant() {
        let gateway = ScriptedGateway::answering(vec![Ok("X".to_string())]);
        let mut ctrl = controller(&gateway);
        ctrl.set_input("  what is my limit?  ");

        assert_eq!(ctrl.submit().await, SubmitOutcome::Completed);

        let turns = ctrl.store().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "what is my limit?");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content, "X");
        assert_eq!(turns[1].kind, TurnKind::Text);
        assert_eq!(ctrl.state(), ControllerState::Idle);
    }

    #[tokio::test]
    async fn test_gateway_receives_trimmed_question() {
        let gateway = ScriptedGateway::answering(vec![Ok("answer".to_string())]);
        let mut ctrl = controller(&gateway);
        ctrl.set_input("  spaced out  ");
        ctrl.submit().await;

        assert_eq!(*gateway.asked.lock().unwrap(), vec!["spaced out"]);
    }

    #[tokio::test]
    async fn test_input_cleared_after_submit() {
        let gateway = ScriptedGateway::answering(vec![Ok("answer".to_string())]);
        let mut ctrl = controller(&gateway);
        ctrl.set_input("question");
        ctrl.submit().await;

        assert!(ctrl.input().is_empty());
    }

    #[tokio::test]
    async fn test_assistant_turn_carries_configured_quick_replies() {
        let gateway = ScriptedGateway::answering(vec![Ok("answer".to_string())]);
        let mut ctrl = controller(&gateway);
        ctrl.set_input("question");
        ctrl.submit().await;

        let last = ctrl.store().last().unwrap();
        assert_eq!(last.suggestions(), ["Raise a ticket", "Talk to support"]);
    }

    #[tokio::test]
    async fn test_empty_quick_replies_config_yields_no_suggestions() {
        let gateway = ScriptedGateway::answering(vec![Ok("answer".to_string())]);
        let config = ChatConfig {
            quick_replies: vec![],
            ..ChatConfig::default()
        };
        let mut ctrl = ConversationController::new(&gateway, config);
        ctrl.set_input("question");
        ctrl.submit().await;

        assert!(ctrl.store().last().unwrap().suggestions.is_none());
    }

    // ---- Failure handling ----

    #[tokio::test]
    async fn test_gateway_failure_appends_failure_turn() {
        let gateway = ScriptedGateway::answering(vec![Err(GatewayError::Network(
            "connection refused".to_string(),
        ))]);
        let mut ctrl = controller(&gateway);
        ctrl.set_input("question");

        // The error must not escape the controller.
        assert_eq!(ctrl.submit().await, SubmitOutcome::Completed);

        let turns = ctrl.store().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert!(turns[1].is_failure());
        assert_eq!(turns[1].content, FAILURE_NOTICE);
        assert_eq!(ctrl.state(), ControllerState::Idle);
    }

    #[tokio::test]
    async fn test_backend_error_also_becomes_failure_turn() {
        let gateway = ScriptedGateway::answering(vec![Err(GatewayError::Backend {
            status: 500,
            message: "internal".to_string(),
        })]);
        let mut ctrl = controller(&gateway);
        ctrl.set_input("question");
        ctrl.submit().await;

        assert!(ctrl.store().last().unwrap().is_failure());
    }

    #[tokio::test]
    async fn test_user_turn_persists_even_when_gateway_fails() {
        let gateway = ScriptedGateway::answering(vec![Err(GatewayError::Timeout)]);
        let mut ctrl = controller(&gateway);
        ctrl.set_input("still here");
        ctrl.submit().await;

        assert_eq!(ctrl.store().turns()[0].content, "still here");
    }

    #[tokio::test]
    async fn test_session_recovers_after_failure() {
        let gateway = ScriptedGateway::answering(vec![
            Err(GatewayError::Timeout),
            Ok("back online".to_string()),
        ]);
        let mut ctrl = controller(&gateway);

        ctrl.set_input("first");
        ctrl.submit().await;
        ctrl.set_input("second");
        ctrl.submit().await;

        let turns = ctrl.store().turns();
        assert_eq!(turns.len(), 4);
        assert!(turns[1].is_failure());
        assert_eq!(turns[3].content, "back online");
        assert!(!turns[3].is_failure());
    }

    // ---- Events ----

    #[tokio::test]
    async fn test_submit_queues_turn_and_scroll_events() {
        let gateway = ScriptedGateway::answering(vec![Ok("answer".to_string())]);
        let mut ctrl = controller(&gateway);
        ctrl.set_input("question");
        ctrl.submit().await;

        let events = ctrl.drain_events();
        assert_eq!(
            events,
            vec![
                SessionEvent::TurnAppended {
                    surface: Surface::Chat
                },
                SessionEvent::TurnAppended {
                    surface: Surface::Chat
                },
                SessionEvent::ScrollToLatest,
            ]
        );
    }

    #[tokio::test]
    async fn test_scroll_scheduled_after_failure_too() {
        let gateway = ScriptedGateway::answering(vec![Err(GatewayError::Timeout)]);
        let mut ctrl = controller(&gateway);
        ctrl.set_input("question");
        ctrl.submit().await;

        let events = ctrl.drain_events();
        assert_eq!(events.last(), Some(&SessionEvent::ScrollToLatest));
    }

    #[tokio::test]
    async fn test_noop_submit_queues_no_events() {
        let gateway = ScriptedGateway::answering(vec![]);
        let mut ctrl = controller(&gateway);
        ctrl.submit().await;

        assert!(ctrl.drain_events().is_empty());
    }

    #[tokio::test]
    async fn test_drain_events_empties_queue() {
        let gateway = ScriptedGateway::answering(vec![Ok("answer".to_string())]);
        let mut ctrl = controller(&gateway);
        ctrl.set_input("question");
        ctrl.submit().await;

        assert!(!ctrl.drain_events().is_empty());
        assert!(ctrl.drain_events().is_empty());
    }

    // ---- Suggestions ----

    #[tokio::test]
    async fn test_select_suggestion_populates_input_only() {
        let gateway = ScriptedGateway::answering(vec![]);
        let mut ctrl = controller(&gateway);

        ctrl.select_suggestion("Raise a ticket");

        assert_eq!(ctrl.input(), "Raise a ticket");
        assert!(ctrl.store().is_empty());
        assert_eq!(gateway.ask_count(), 0);
        assert_eq!(
            ctrl.drain_events(),
            vec![SessionEvent::InputPopulated {
                text: "Raise a ticket".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_selected_suggestion_can_then_be_submitted() {
        let gateway = ScriptedGateway::answering(vec![Ok("on it".to_string())]);
        let mut ctrl = controller(&gateway);

        ctrl.select_suggestion("Talk to support");
        ctrl.submit().await;

        assert_eq!(*gateway.asked.lock().unwrap(), vec!["Talk to support"]);
    }

    #[tokio::test]
    async fn test_select_suggestion_overwrites_draft() {
        let gateway = ScriptedGateway::answering(vec![]);
        let mut ctrl = controller(&gateway);
        ctrl.set_input("half-typed messa");
        ctrl.select_suggestion("Raise a ticket");

        assert_eq!(ctrl.input(), "Raise a ticket");
    }

    // ---- Multiple exchanges ----

    #[tokio::test]
    async fn test_transcript_order_over_multiple_exchanges() {
        let gateway = ScriptedGateway::answering(vec![
            Ok("answer one".to_string()),
            Ok("answer two".to_string()),
        ]);
        let mut ctrl = controller(&gateway);

        ctrl.set_input("question one");
        ctrl.submit().await;
        ctrl.set_input("question two");
        ctrl.submit().await;

        let contents: Vec<&str> = ctrl
            .store()
            .turns()
            .iter()
            .map(|t| t.content.as_str())
            .collect();
        assert_eq!(
            contents,
            vec!["question one", "answer one", "question two", "answer two"]
        );
    }
}
