use serde::{Deserialize, Serialize};

use crate::types::ConversationId;

/// One row of the conversation list, as returned by `GET /conversations`.
///
/// The backend controls both the title (server-derived, never set by this
/// client) and the list order; the client renders rows verbatim and does
/// not re-sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Opaque conversation identifier.
    pub id: ConversationId,

    /// Server-derived conversation title.
    pub title: String,

    /// Creation timestamp, carried as the opaque string the backend emits.
    ///
    /// The relay writes Python `isoformat()` strings without an offset, so
    /// this is display data, not something to parse or compare.
    pub created_at: String,
}

impl ConversationSummary {
    /// Create a new conversation summary.
    pub fn new(
        id: impl Into<ConversationId>,
        title: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            created_at: created_at.into(),
        }
    }
}
