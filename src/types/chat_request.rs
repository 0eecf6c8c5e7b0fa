use serde::{Deserialize, Serialize};

use crate::types::ConversationId;

/// Request body for `POST /chat`.
///
/// `conversation_id` is serialized as JSON `null` when absent; the relay
/// distinguishes "continue this conversation" from "start a fresh one" by
/// exactly that null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message for this turn.
    pub message: String,

    /// Which model the relay should use for this turn.
    pub model: String,

    /// The conversation to append to, or `None` to let the relay mint one.
    pub conversation_id: Option<ConversationId>,
}

impl ChatRequest {
    /// Create a request that starts a fresh conversation.
    pub fn new(message: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            model: model.into(),
            conversation_id: None,
        }
    }

    /// Target an existing conversation.
    pub fn with_conversation(mut self, id: ConversationId) -> Self {
        self.conversation_id = Some(id);
        self
    }
}
