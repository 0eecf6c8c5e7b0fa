//! Interactive chat on top of the relay client.
//!
//! A readline REPL: plain lines become chat turns against the configured
//! model, while `/` lines manage session state locally. Conversations are
//! persisted by the relay, so the session only caches what it last
//! fetched.
//!
//! [`commands`] sorts input into those two kinds. [`config`] turns flags
//! into session settings. [`session`] owns the state machine driving both
//! the turn cycle and the conversation list.

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use session::{ChatSession, SessionStats, Submission};
