use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque server-assigned conversation identifier.
///
/// The relay mints these; the client never inspects them beyond equality
/// and display. Backends have used both integer row ids and string ids, so
/// this deserializes untagged from either JSON form and serializes back in
/// the same form it arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConversationId {
    /// Numeric identifier (e.g. a database row id).
    Int(i64),

    /// String identifier (e.g. a UUID).
    Str(String),
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationId::Int(id) => write!(f, "{id}"),
            ConversationId::Str(id) => write!(f, "{id}"),
        }
    }
}

impl From<i64> for ConversationId {
    fn from(id: i64) -> Self {
        ConversationId::Int(id)
    }
}

impl From<String> for ConversationId {
    fn from(id: String) -> Self {
        ConversationId::Str(id)
    }
}

impl From<&str> for ConversationId {
    fn from(id: &str) -> Self {
        ConversationId::Str(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_integer_form() {
        let id: ConversationId = serde_json::from_value(serde_json::json!(42)).unwrap();
        assert_eq!(id, ConversationId::Int(42));
    }

    #[test]
    fn deserialize_string_form() {
        let id: ConversationId =
            serde_json::from_value(serde_json::json!("c-1234")).unwrap();
        assert_eq!(id, ConversationId::Str("c-1234".to_string()));
    }

    #[test]
    fn round_trips_preserve_form() {
        let int_id = ConversationId::Int(7);
        assert_eq!(serde_json::to_value(&int_id).unwrap(), serde_json::json!(7));

        let str_id = ConversationId::from("abc");
        assert_eq!(
            serde_json::to_value(&str_id).unwrap(),
            serde_json::json!("abc")
        );
    }

    #[test]
    fn display_forms() {
        assert_eq!(ConversationId::Int(3).to_string(), "3");
        assert_eq!(ConversationId::from("xyz").to_string(), "xyz");
    }
}
