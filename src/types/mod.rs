// Public modules
pub mod chat_reply;
pub mod chat_request;
pub mod conversation;
pub mod conversation_id;
pub mod conversation_summary;
pub mod message;
pub mod model_directory;

// Re-exports
pub use chat_reply::ChatReply;
pub use chat_request::ChatRequest;
pub use conversation::{Conversation, MessagePair};
pub use conversation_id::ConversationId;
pub use conversation_summary::ConversationSummary;
pub use message::{Message, Role};
pub use model_directory::ModelDirectory;
