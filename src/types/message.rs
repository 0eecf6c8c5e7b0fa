/// Role type for a chat message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    /// The human side of the conversation.
    User,

    /// The model side of the conversation, as relayed by the backend.
    Bot,
}

/// A single entry in the session's display list.
///
/// Messages are created on send (user) or on response/error (bot) and are
/// append-only; display order is chronological. This is the client-side
/// view model; the wire format persists history as
/// [`MessagePair`](crate::types::MessagePair)s instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Who produced this message.
    pub role: Role,

    /// The message text.
    pub text: String,

    /// True when this is a bot-side placeholder describing a failed turn
    /// rather than a real reply.
    pub is_error: bool,
}

impl Message {
    /// Create a new message with the given role and text.
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            is_error: false,
        }
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create a bot message.
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Role::Bot, text)
    }

    /// Create a bot message flagged as an error.
    ///
    /// Failed chat turns surface in-thread as one of these so the failure
    /// is legible in context, not just in a banner.
    pub fn bot_error(text: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_role_and_flag() {
        let m = Message::user("hi");
        assert_eq!(m.role, Role::User);
        assert!(!m.is_error);

        let m = Message::bot("hello");
        assert_eq!(m.role, Role::Bot);
        assert!(!m.is_error);

        let m = Message::bot_error("it broke");
        assert_eq!(m.role, Role::Bot);
        assert!(m.is_error);
        assert_eq!(m.text, "it broke");
    }
}
