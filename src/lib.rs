// Public modules
pub mod backend;
pub mod chat;
pub mod client;
pub mod error;
pub mod observability;
pub mod render;
pub mod types;

// Re-exports
pub use backend::{Backend, DeleteReport};
pub use client::{DEFAULT_RELAY_URL, DEFAULT_TIMEOUT, RELAY_URL_ENV, Relay};
pub use error::{Error, Result};
pub use render::{PlainTextRenderer, Renderer};
pub use types::*;
