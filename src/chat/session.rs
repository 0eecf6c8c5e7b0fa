//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns conversation
//! state and mediates every relay interaction for the presentation layer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::backend::{Backend, DeleteReport};
use crate::chat::config::ChatConfig;
use crate::error::{Error, Result};
use crate::observability;
use crate::types::{
    ChatReply, ChatRequest, ConversationId, ConversationSummary, Message, ModelDirectory,
};

/// How often an in-flight request checks the interrupt flag.
const INTERRUPT_POLL: Duration = Duration::from_millis(50);

/// Disposition of one call to [ChatSession::begin_turn].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The turn was accepted and a request should be issued.
    Accepted,

    /// The input was empty or whitespace-only; nothing changed.
    Empty,

    /// A turn is already in flight; nothing changed.
    Rejected,
}

/// A chat session that owns conversation state and relay interactions.
///
/// The session keeps the local transcript, the active conversation id, the
/// cached conversation list, and the model directory. Network failures never
/// escape it: each operation folds errors into the error banner or an
/// error-flagged transcript message, and the presentation layer renders
/// whatever state remains.
pub struct ChatSession<B: Backend> {
    backend: B,
    config: ChatConfig,
    models: ModelDirectory,
    conversations: Vec<ConversationSummary>,
    active_conversation: Option<ConversationId>,
    messages: Vec<Message>,
    pending: bool,
    last_error: Option<String>,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// The model requested for new turns.
    pub model: String,
    /// Display label for the model when the directory knows it.
    pub model_label: String,
    /// The active conversation, if any.
    pub active_conversation: Option<ConversationId>,
    /// The number of messages in the local transcript.
    pub message_count: usize,
    /// The number of conversations in the cached list.
    pub conversation_count: usize,
    /// The number of models in the directory.
    pub model_count: usize,
    /// Whether a turn is in flight.
    pub pending: bool,
    /// The visible error banner, if set.
    pub last_error: Option<String>,
}

impl<B: Backend> ChatSession<B> {
    /// Creates a new chat session over the given backend.
    ///
    /// The model directory starts empty; call
    /// [refresh_models](ChatSession::refresh_models) to populate it.
    pub fn new(backend: B, config: ChatConfig) -> Self {
        Self {
            backend,
            config,
            models: ModelDirectory::new(),
            conversations: Vec::new(),
            active_conversation: None,
            messages: Vec::new(),
            pending: false,
            last_error: None,
        }
    }

    /// Record the user's side of a turn if the session can accept one.
    ///
    /// The user message is appended optimistically; it stays in the
    /// transcript even if the request later fails.
    pub fn begin_turn(&mut self, input: &str) -> Submission {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Submission::Empty;
        }
        if self.pending {
            return Submission::Rejected;
        }
        self.messages.push(Message::user(trimmed));
        self.pending = true;
        self.last_error = None;
        Submission::Accepted
    }

    /// Fold the outcome of the in-flight request back into the session.
    ///
    /// Returns true when the session adopted a conversation id minted by
    /// the relay for this turn. With an active conversation already set,
    /// the active id never changes here, whatever the reply carries.
    /// `pending` is cleared on every path.
    pub fn complete_turn(&mut self, outcome: Result<ChatReply>) -> bool {
        self.pending = false;
        match outcome {
            Ok(reply) => {
                self.messages.push(Message::bot(reply.response));
                if self.active_conversation.is_none()
                    && let Some(id) = reply.conversation_id
                {
                    self.active_conversation = Some(id);
                    return true;
                }
                false
            }
            Err(err) => {
                observability::CHAT_TURN_ERRORS.click();
                if err.is_abort() {
                    observability::CHAT_INTERRUPTS.click();
                }
                let text = err.to_string();
                self.messages.push(Message::bot_error(&text));
                self.last_error = Some(format!("chat failed: {}", text));
                false
            }
        }
    }

    /// Send one user message and fold the reply into the transcript.
    ///
    /// The in-flight request races the interrupt flag; an interrupt folds
    /// in as an ordinary failed turn. When the relay mints a conversation
    /// id for this turn, the conversation list is refreshed to pick up the
    /// server-side title.
    pub async fn send(&mut self, input: &str, interrupted: Arc<AtomicBool>) -> Submission {
        let submission = self.begin_turn(input);
        if submission != Submission::Accepted {
            return submission;
        }
        observability::CHAT_TURNS.click();

        let mut request = ChatRequest::new(input.trim(), &self.config.model);
        if let Some(id) = &self.active_conversation {
            request = request.with_conversation(id.clone());
        }

        let outcome = tokio::select! {
            outcome = self.backend.chat(request) => outcome,
            _ = watch_interrupt(interrupted) => Err(Error::abort("request interrupted")),
        };

        if self.complete_turn(outcome) {
            self.refresh_conversations().await;
        }
        submission
    }

    /// Refresh the model directory from the relay.
    ///
    /// Never fails: on any error the static fallback directory is
    /// installed and the failure surfaces only through the banner.
    pub async fn refresh_models(&mut self) {
        match self.backend.fetch_models().await {
            Ok(models) => {
                self.models = models;
                self.last_error = None;
            }
            Err(err) => {
                self.models = ModelDirectory::fallback();
                self.last_error = Some(format!("model fetch failed: {}", err));
            }
        }
    }

    /// Refresh the cached conversation list from the relay.
    ///
    /// On failure the previous list is kept and the banner reports the
    /// failure.
    pub async fn refresh_conversations(&mut self) {
        match self.backend.list_conversations().await {
            Ok(conversations) => {
                self.conversations = conversations;
                self.last_error = None;
            }
            Err(err) => {
                self.last_error = Some(format!("conversation list failed: {}", err));
            }
        }
    }

    /// Open a stored conversation, replacing the local transcript.
    ///
    /// Returns true on success. On failure the prior transcript and active
    /// conversation stay intact and the banner reports the failure.
    pub async fn open_conversation(&mut self, id: ConversationId) -> bool {
        match self.backend.get_conversation(&id).await {
            Ok(conversation) => {
                self.messages = conversation.flatten();
                self.active_conversation = Some(id);
                self.last_error = None;
                true
            }
            Err(err) => {
                self.last_error = Some(format!("open failed: {}", err));
                false
            }
        }
    }

    /// Start a fresh conversation on the relay and switch to it.
    ///
    /// Returns true on success. On failure the current conversation stays
    /// active and the banner reports the failure.
    pub async fn new_conversation(&mut self) -> bool {
        match self.backend.create_conversation().await {
            Ok(id) => {
                self.active_conversation = Some(id);
                self.messages.clear();
                self.refresh_conversations().await;
                true
            }
            Err(err) => {
                self.last_error = Some(format!("new conversation failed: {}", err));
                false
            }
        }
    }

    /// Delete the given conversations and reconcile local state.
    ///
    /// Deletions are issued concurrently and all of them settle; partial
    /// failure is reported through the banner. If the active conversation
    /// was among the requested set it is closed locally whether or not its
    /// delete succeeded, because its history can no longer be trusted. The
    /// conversation list is always refreshed afterwards.
    pub async fn delete_conversations(&mut self, ids: Vec<ConversationId>) -> DeleteReport {
        let report = self.backend.delete_conversations(&ids).await;

        if let Some(active) = &self.active_conversation
            && ids.contains(active)
        {
            self.active_conversation = None;
            self.messages.clear();
        }

        self.refresh_conversations().await;

        if let Some(summary) = report.error_summary() {
            self.last_error = Some(summary);
        }
        report
    }

    /// Changes the model requested on subsequent turns.
    ///
    /// Local only; no relay round trip and no validation against the
    /// directory. An id the relay does not serve fails on the next send
    /// with the relay's own error.
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.config.model = model.into();
    }

    /// Returns the current model id.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Returns the model directory.
    pub fn models(&self) -> &ModelDirectory {
        &self.models
    }

    /// Returns the cached conversation list, in relay order.
    pub fn conversations(&self) -> &[ConversationSummary] {
        &self.conversations
    }

    /// Returns the local transcript, oldest message first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages in the local transcript.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Returns the active conversation id, if any.
    pub fn active_conversation(&self) -> Option<&ConversationId> {
        self.active_conversation.as_ref()
    }

    /// Returns true while a turn is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Returns the visible error banner, if set.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.config.model.clone(),
            model_label: self.models.label_or_id(&self.config.model).to_string(),
            active_conversation: self.active_conversation.clone(),
            message_count: self.messages.len(),
            conversation_count: self.conversations.len(),
            model_count: self.models.len(),
            pending: self.pending,
            last_error: self.last_error.clone(),
        }
    }
}

async fn watch_interrupt(interrupted: Arc<AtomicBool>) {
    loop {
        if interrupted.load(Ordering::Relaxed) {
            return;
        }
        tokio::time::sleep(INTERRUPT_POLL).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::types::{Conversation, MessagePair, Role};

    struct FakeBackend {
        models: Result<ModelDirectory>,
        list: Result<Vec<ConversationSummary>>,
        conversation: Result<Conversation>,
        created: Result<ConversationId>,
        delete_failures: Vec<ConversationId>,
        chat: Result<ChatReply>,
        hang_chat: bool,
        chat_calls: AtomicUsize,
        list_calls: AtomicUsize,
    }

    impl FakeBackend {
        fn new() -> Self {
            Self {
                models: Ok(ModelDirectory::fallback()),
                list: Ok(vec![]),
                conversation: Ok(Conversation::new("untitled", vec![])),
                created: Ok(ConversationId::from(99)),
                delete_failures: vec![],
                chat: Ok(ChatReply::new("hello")),
                hang_chat: false,
                chat_calls: AtomicUsize::new(0),
                list_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl Backend for FakeBackend {
        async fn fetch_models(&self) -> Result<ModelDirectory> {
            self.models.clone()
        }

        async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.list.clone()
        }

        async fn get_conversation(&self, _: &ConversationId) -> Result<Conversation> {
            self.conversation.clone()
        }

        async fn create_conversation(&self) -> Result<ConversationId> {
            self.created.clone()
        }

        async fn delete_conversation(&self, id: &ConversationId) -> Result<()> {
            if self.delete_failures.contains(id) {
                Err(Error::not_found("no such conversation"))
            } else {
                Ok(())
            }
        }

        async fn chat(&self, _: ChatRequest) -> Result<ChatReply> {
            self.chat_calls.fetch_add(1, Ordering::SeqCst);
            if self.hang_chat {
                futures::future::pending::<()>().await;
            }
            self.chat.clone()
        }
    }

    fn session_with(fake: FakeBackend) -> ChatSession<FakeBackend> {
        ChatSession::new(fake, ChatConfig::default())
    }

    fn not_interrupted() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[test]
    fn begin_turn_trims_and_appends() {
        let mut session = session_with(FakeBackend::new());
        assert_eq!(session.begin_turn("  hi there  "), Submission::Accepted);
        assert_eq!(session.message_count(), 1);
        assert_eq!(session.messages()[0].text, "hi there");
        assert_eq!(session.messages()[0].role, Role::User);
        assert!(session.is_pending());
    }

    #[test]
    fn begin_turn_rejects_blank_input() {
        let mut session = session_with(FakeBackend::new());
        assert_eq!(session.begin_turn(""), Submission::Empty);
        assert_eq!(session.begin_turn("   \t  "), Submission::Empty);
        assert_eq!(session.message_count(), 0);
        assert!(!session.is_pending());
    }

    #[test]
    fn begin_turn_rejects_reentry_while_pending() {
        let mut session = session_with(FakeBackend::new());
        assert_eq!(session.begin_turn("first"), Submission::Accepted);
        assert_eq!(session.begin_turn("second"), Submission::Rejected);
        assert_eq!(session.message_count(), 1);
    }

    #[test]
    fn complete_turn_appends_reply() {
        let mut session = session_with(FakeBackend::new());
        session.begin_turn("hi");
        let adopted = session.complete_turn(Ok(ChatReply::new("hello yourself")));
        assert!(!adopted);
        assert!(!session.is_pending());
        assert_eq!(session.message_count(), 2);
        assert_eq!(session.messages()[1].role, Role::Bot);
        assert!(!session.messages()[1].is_error);
    }

    #[test]
    fn complete_turn_adopts_minted_id() {
        let mut session = session_with(FakeBackend::new());
        session.begin_turn("hi");
        let reply = ChatReply::new("hello").with_conversation_id(7.into());
        assert!(session.complete_turn(Ok(reply)));
        assert_eq!(session.active_conversation(), Some(&ConversationId::Int(7)));
    }

    #[test]
    fn complete_turn_keeps_existing_active_id() {
        let mut session = session_with(FakeBackend::new());
        session.active_conversation = Some(ConversationId::Int(3));
        session.begin_turn("hi");
        let reply = ChatReply::new("hello").with_conversation_id(9.into());
        assert!(!session.complete_turn(Ok(reply)));
        assert_eq!(session.active_conversation(), Some(&ConversationId::Int(3)));
    }

    #[test]
    fn complete_turn_flags_failure() {
        let mut session = session_with(FakeBackend::new());
        session.begin_turn("hi");
        assert!(!session.complete_turn(Err(Error::timeout("request timed out", Some(25.0)))));
        assert!(!session.is_pending());
        assert_eq!(session.message_count(), 2);
        assert!(session.messages()[1].is_error);
        assert!(session.last_error().unwrap().starts_with("chat failed:"));
    }

    #[test]
    fn accepted_turn_clears_stale_banner() {
        let mut session = session_with(FakeBackend::new());
        session.begin_turn("first");
        session.complete_turn(Err(Error::timeout("request timed out", Some(25.0))));
        assert!(session.last_error().is_some());

        assert_eq!(session.begin_turn("second"), Submission::Accepted);
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn blank_submission_is_a_no_op() {
        let mut session = session_with(FakeBackend::new());
        assert_eq!(session.send("   ", not_interrupted()).await, Submission::Empty);
        assert_eq!(session.message_count(), 0);
        assert_eq!(session.backend.chat_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn send_while_pending_issues_no_request() {
        let mut session = session_with(FakeBackend::new());
        assert_eq!(session.begin_turn("first"), Submission::Accepted);
        assert_eq!(
            session.send("second", not_interrupted()).await,
            Submission::Rejected
        );
        assert_eq!(session.backend.chat_calls.load(Ordering::SeqCst), 0);
        assert_eq!(session.message_count(), 1);
    }

    #[tokio::test]
    async fn adopting_minted_id_refreshes_list() {
        let mut fake = FakeBackend::new();
        fake.chat = Ok(ChatReply::new("hello").with_conversation_id(7.into()));
        fake.list = Ok(vec![ConversationSummary::new(
            7,
            "hello...",
            "2024-05-01T12:00:00",
        )]);
        let mut session = session_with(fake);

        assert_eq!(session.send("hi", not_interrupted()).await, Submission::Accepted);
        assert_eq!(session.active_conversation(), Some(&ConversationId::Int(7)));
        assert_eq!(session.backend.list_calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.conversations().len(), 1);
    }

    #[tokio::test]
    async fn send_with_active_id_skips_refresh() {
        let mut fake = FakeBackend::new();
        fake.chat = Ok(ChatReply::new("hello").with_conversation_id(9.into()));
        let mut session = session_with(fake);
        session.active_conversation = Some(ConversationId::Int(3));

        session.send("hi", not_interrupted()).await;
        assert_eq!(session.active_conversation(), Some(&ConversationId::Int(3)));
        assert_eq!(session.backend.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn timed_out_turn_appends_single_error() {
        let mut fake = FakeBackend::new();
        fake.chat = Err(Error::timeout("request timed out", Some(25.0)));
        let mut session = session_with(fake);

        session.send("hi", not_interrupted()).await;
        assert!(!session.is_pending());
        assert_eq!(session.message_count(), 2);
        let errors = session.messages().iter().filter(|m| m.is_error).count();
        assert_eq!(errors, 1);
    }

    #[tokio::test]
    async fn interrupt_aborts_turn() {
        let mut fake = FakeBackend::new();
        fake.hang_chat = true;
        let mut session = session_with(fake);
        let interrupted = Arc::new(AtomicBool::new(true));

        assert_eq!(session.send("hi", interrupted).await, Submission::Accepted);
        assert!(!session.is_pending());
        assert!(session.messages().last().unwrap().is_error);
        assert!(session.last_error().unwrap().contains("interrupted"));
    }

    #[tokio::test]
    async fn model_fetch_failure_installs_fallback() {
        let mut fake = FakeBackend::new();
        fake.models = Err(Error::internal_server("boom"));
        let mut session = session_with(fake);

        session.refresh_models().await;
        assert_eq!(session.models().len(), 2);
        assert_eq!(session.models().label("gpt-3.5-turbo"), Some("GPT-3.5 Turbo"));
        assert_eq!(session.models().label("gpt-4o"), Some("GPT-4o"));
        assert!(session.last_error().is_some());
    }

    #[tokio::test]
    async fn refresh_conversations_keeps_list_on_failure() {
        let mut fake = FakeBackend::new();
        fake.list = Ok(vec![ConversationSummary::new(1, "a", "t")]);
        let mut session = session_with(fake);
        session.refresh_conversations().await;
        assert_eq!(session.conversations().len(), 1);

        session.backend.list = Err(Error::service_unavailable("down"));
        session.refresh_conversations().await;
        assert_eq!(session.conversations().len(), 1);
        assert!(session.last_error().unwrap().contains("conversation list"));
    }

    #[tokio::test]
    async fn open_conversation_replaces_transcript() {
        let mut fake = FakeBackend::new();
        fake.conversation = Ok(Conversation::new(
            "greetings",
            vec![MessagePair::new("u1", "b1"), MessagePair::new("u2", "b2")],
        ));
        let mut session = session_with(fake);
        session.messages.push(Message::user("old"));

        assert!(session.open_conversation(5.into()).await);
        assert_eq!(session.active_conversation(), Some(&ConversationId::Int(5)));
        assert_eq!(session.message_count(), 4);
        assert_eq!(session.messages()[0].text, "u1");
        assert_eq!(session.messages()[3].text, "b2");
    }

    #[tokio::test]
    async fn open_failure_keeps_prior_state() {
        let mut fake = FakeBackend::new();
        fake.conversation = Err(Error::not_found("no such conversation"));
        let mut session = session_with(fake);
        session.active_conversation = Some(ConversationId::Int(1));
        session.messages.push(Message::user("old"));

        assert!(!session.open_conversation(5.into()).await);
        assert_eq!(session.active_conversation(), Some(&ConversationId::Int(1)));
        assert_eq!(session.message_count(), 1);
        assert!(session.last_error().unwrap().starts_with("open failed:"));
    }

    #[tokio::test]
    async fn new_conversation_adopts_and_refreshes() {
        let mut fake = FakeBackend::new();
        fake.created = Ok(ConversationId::from(42));
        let mut session = session_with(fake);
        session.messages.push(Message::user("old"));

        assert!(session.new_conversation().await);
        assert_eq!(session.active_conversation(), Some(&ConversationId::Int(42)));
        assert_eq!(session.message_count(), 0);
        assert_eq!(session.backend.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn delete_clears_active_despite_partial_failure() {
        let mut fake = FakeBackend::new();
        fake.delete_failures = vec![ConversationId::Int(1)];
        let mut session = session_with(fake);
        session.active_conversation = Some(ConversationId::Int(1));
        session.messages.push(Message::user("old"));

        let report = session.delete_conversations(vec![1.into(), 2.into()]).await;
        assert_eq!(report.deleted, vec![ConversationId::Int(2)]);
        assert_eq!(report.failed.len(), 1);
        assert!(session.active_conversation().is_none());
        assert_eq!(session.message_count(), 0);
        assert_eq!(session.backend.list_calls.load(Ordering::SeqCst), 1);
        assert!(session.last_error().unwrap().contains("failed to delete"));
    }

    #[tokio::test]
    async fn delete_of_inactive_conversations_keeps_transcript() {
        let fake = FakeBackend::new();
        let mut session = session_with(fake);
        session.active_conversation = Some(ConversationId::Int(9));
        session.messages.push(Message::user("keep me"));

        let report = session.delete_conversations(vec![1.into(), 2.into()]).await;
        assert!(report.all_succeeded());
        assert_eq!(session.active_conversation(), Some(&ConversationId::Int(9)));
        assert_eq!(session.message_count(), 1);
        assert!(session.last_error().is_none());
    }

    #[test]
    fn set_model_is_local() {
        let mut session = session_with(FakeBackend::new());
        assert_eq!(session.model(), "gpt-3.5-turbo");
        session.set_model("gpt-4o");
        assert_eq!(session.model(), "gpt-4o");
    }

    #[test]
    fn stats_snapshot() {
        let mut session = session_with(FakeBackend::new());
        session.messages.push(Message::user("hi"));
        session.active_conversation = Some(ConversationId::Int(4));

        let stats = session.stats();
        assert_eq!(stats.model, "gpt-3.5-turbo");
        assert_eq!(stats.message_count, 1);
        assert_eq!(stats.active_conversation, Some(ConversationId::Int(4)));
        assert!(!stats.pending);
    }
}
