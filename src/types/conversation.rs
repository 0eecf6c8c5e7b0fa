use serde::{Deserialize, Serialize};

use crate::types::Message;

/// One user utterance plus its corresponding model reply.
///
/// This is the backend's unit of persisted history: `GET /conversations/{id}`
/// returns pairs, and the client flattens them into the display list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePair {
    /// What the user sent.
    pub user_message: String,

    /// What the model replied, as relayed by the backend.
    pub bot_response: String,
}

impl MessagePair {
    /// Create a new message pair.
    pub fn new(user_message: impl Into<String>, bot_response: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            bot_response: bot_response.into(),
        }
    }
}

/// A full conversation as returned by `GET /conversations/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Server-derived conversation title.
    pub title: String,

    /// Persisted history, in chronological pair order.
    pub messages: Vec<MessagePair>,
}

impl Conversation {
    /// Create a new conversation.
    pub fn new(title: impl Into<String>, messages: Vec<MessagePair>) -> Self {
        Self {
            title: title.into(),
            messages,
        }
    }

    /// Flatten persisted pairs into the display list.
    ///
    /// Each pair becomes two sequential [`Message`]s, user then bot,
    /// preserving pair order: `[(u1,b1),(u2,b2)]` yields
    /// `[user:u1, bot:b1, user:u2, bot:b2]`.
    pub fn flatten(&self) -> Vec<Message> {
        let mut flat = Vec::with_capacity(self.messages.len() * 2);
        for pair in &self.messages {
            flat.push(Message::user(pair.user_message.clone()));
            flat.push(Message::bot(pair.bot_response.clone()));
        }
        flat
    }
}
