use futures::future::join_all;

use crate::error::{Error, Result};
use crate::observability;
use crate::types::{
    ChatReply, ChatRequest, Conversation, ConversationId, ConversationSummary, ModelDirectory,
};

/// Outcome of a bulk conversation delete.
///
/// Bulk deletes settle every request instead of stopping at the first
/// failure, so the report carries both sides.
#[derive(Debug, Default)]
pub struct DeleteReport {
    /// Conversations the relay confirmed deleted.
    pub deleted: Vec<ConversationId>,
    /// Conversations that could not be deleted, with the reason each failed.
    pub failed: Vec<(ConversationId, Error)>,
}

impl DeleteReport {
    /// True when every requested conversation was deleted.
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// One line summarizing the failures, or None when there were none.
    pub fn error_summary(&self) -> Option<String> {
        if self.failed.is_empty() {
            return None;
        }
        let reasons: Vec<String> = self
            .failed
            .iter()
            .map(|(id, err)| format!("{}: {}", id, err))
            .collect();
        Some(format!(
            "failed to delete {} conversation(s): {}",
            self.failed.len(),
            reasons.join("; ")
        ))
    }
}

/// The surface of the relay this crate needs.
///
/// [Relay](crate::Relay) is the production implementation; tests swap in
/// an in-memory fake.
///
/// # Example
///
/// ```
/// use colloquy::{
///     Backend, ChatReply, ChatRequest, Conversation, ConversationId, ConversationSummary,
///     Error, ModelDirectory, Result,
/// };
///
/// struct Canned;
///
/// #[async_trait::async_trait]
/// impl Backend for Canned {
///     async fn fetch_models(&self) -> Result<ModelDirectory> {
///         Ok(ModelDirectory::fallback())
///     }
///
///     async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
///         Ok(vec![])
///     }
///
///     async fn get_conversation(&self, _: &ConversationId) -> Result<Conversation> {
///         Err(Error::not_found("no such conversation"))
///     }
///
///     async fn create_conversation(&self) -> Result<ConversationId> {
///         Ok(ConversationId::from(1))
///     }
///
///     async fn delete_conversation(&self, _: &ConversationId) -> Result<()> {
///         Ok(())
///     }
///
///     async fn chat(&self, _: ChatRequest) -> Result<ChatReply> {
///         Ok(ChatReply::new("canned"))
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let report = Canned.delete_conversations(&[1.into(), 2.into()]).await;
/// assert!(report.all_succeeded());
/// # })
/// ```
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Fetch the directory of models the relay is willing to serve.
    async fn fetch_models(&self) -> Result<ModelDirectory>;

    /// List stored conversations in the order the relay keeps them.
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>>;

    /// Fetch one conversation with its full message history.
    async fn get_conversation(&self, id: &ConversationId) -> Result<Conversation>;

    /// Create a fresh, empty conversation and return its identifier.
    async fn create_conversation(&self) -> Result<ConversationId>;

    /// Delete one conversation.
    async fn delete_conversation(&self, id: &ConversationId) -> Result<()>;

    /// Send one user message and wait for the model's reply.
    async fn chat(&self, request: ChatRequest) -> Result<ChatReply>;

    /// Delete several conversations concurrently and settle every one.
    ///
    /// One failure never aborts the rest of the batch.
    async fn delete_conversations(&self, ids: &[ConversationId]) -> DeleteReport {
        let deletes = ids.iter().map(|id| self.delete_conversation(id));
        let results = join_all(deletes).await;

        let mut report = DeleteReport::default();
        for (id, result) in ids.iter().zip(results) {
            match result {
                Ok(()) => report.deleted.push(id.clone()),
                Err(err) => report.failed.push((id.clone(), err)),
            }
        }
        observability::RELAY_DELETE_BATCHES.click();
        report
    }
}
