use serde::{Deserialize, Serialize};

use crate::types::ConversationId;

/// Response body for `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// The model's reply text.
    pub response: String,

    /// Present when the relay minted a conversation for this turn (the
    /// request carried a null conversation id). The session adopts it as
    /// the active conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,

    /// Server-side timestamp for the turn. Opaque display data; the relay
    /// emits Python `isoformat()` strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ChatReply {
    /// Create a reply with just the response text.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            conversation_id: None,
            timestamp: None,
        }
    }

    /// Attach a minted conversation id.
    pub fn with_conversation_id(mut self, id: ConversationId) -> Self {
        self.conversation_id = Some(id);
        self
    }
}
