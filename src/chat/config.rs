//! Command-line surface for the chat binary.
//!
//! `arrrg` parses the flags; [`ChatConfig`] is what the session actually
//! consumes once defaults are filled in.

use arrrg_derive::CommandLine;

/// Default model requested when none is configured.
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Command-line arguments for the colloquy-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the relay backend.
    #[arrrg(optional, "Relay URL (default: http://localhost:5001)", "URL")]
    pub relay_url: Option<String>,

    /// Model id to request, when not the stock default.
    #[arrrg(optional, "Model to use (default: gpt-3.5-turbo)", "MODEL")]
    pub model: Option<String>,

    /// Per-request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 25)", "SECONDS")]
    pub timeout: Option<u64>,

    /// Suppress ANSI styling.
    #[arrrg(flag, "Disable colored output")]
    pub no_color: bool,
}

/// Resolved settings for a chat session.
///
/// Built from [`ChatArgs`] once flag defaults are applied; the session
/// treats it as plain data.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The model requested for new turns.
    pub model: String,

    /// Render with ANSI styling.
    pub use_color: bool,
}

impl ChatConfig {
    /// Stock settings, the default model with color output on.
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            use_color: true,
        }
    }

    /// Swap in a different model id.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Turn off ANSI styling in printed output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        ChatConfig {
            model: args.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            use_color: !args.no_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_settings() {
        let config = ChatConfig::new();
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert!(config.use_color);
    }

    #[test]
    fn bare_args_resolve_to_stock_settings() {
        let config = ChatConfig::from(ChatArgs::default());
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert!(config.use_color);
    }

    #[test]
    fn args_override_model_and_color() {
        let args = ChatArgs {
            relay_url: Some("http://relay.example:9999".to_string()),
            model: Some("gpt-4o".to_string()),
            timeout: Some(5),
            no_color: true,
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.model, "gpt-4o");
        assert!(!config.use_color);
    }

    #[test]
    fn builder_overrides() {
        let config = ChatConfig::new().with_model("gpt-4o").without_color();
        assert_eq!(config.model, "gpt-4o");
        assert!(!config.use_color);
    }
}
