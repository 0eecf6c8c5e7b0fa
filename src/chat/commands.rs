//! Slash commands typed at the chat prompt.
//!
//! Lines starting with `/` drive the conversation list and session state
//! locally; everything else goes to the relay as a chat message.

/// One recognized slash command.
///
/// Commands act on the session itself and never reach the relay as text.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// List the models the relay serves.
    Models,

    /// Switch the model used for new turns.
    Model(String),

    /// List stored conversations.
    List,

    /// Open a conversation by 1-based list position or id.
    Open(String),

    /// Start a fresh conversation.
    New,

    /// Delete one or more conversations by 1-based list position or id.
    Delete(Vec<String>),

    /// Display session status.
    Status,

    /// Print the command list.
    Help,

    /// Leave the program.
    Quit,

    /// Malformed command, with the complaint to show the user.
    Invalid(String),
}

/// Recognize a slash command in a line of user input.
///
/// `None` means the line is ordinary chat text and belongs to the relay;
/// `Some(ChatCommand::Invalid(..))` means it looked like a command but did
/// not parse.
///
/// # Examples
///
/// ```
/// # use colloquy::chat::parse_command;
/// assert!(parse_command("/list").is_some());
/// assert!(parse_command("just chatting").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let rest = input.trim().strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let arg = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    Some(match command.as_str() {
        "models" => ChatCommand::Models,
        "model" => match arg {
            Some(model) => ChatCommand::Model(model.to_string()),
            None => ChatCommand::Invalid("/model requires a model name".to_string()),
        },
        "list" | "ls" => ChatCommand::List,
        "open" => match arg {
            Some(sel) if sel.split_whitespace().count() == 1 => {
                ChatCommand::Open(sel.to_string())
            }
            Some(_) => {
                ChatCommand::Invalid("/open takes a single list position or id".to_string())
            }
            None => ChatCommand::Invalid("/open requires a list position or id".to_string()),
        },
        "new" => ChatCommand::New,
        "delete" | "rm" => match arg {
            Some(sel) => {
                ChatCommand::Delete(sel.split_whitespace().map(String::from).collect())
            }
            None => ChatCommand::Invalid(
                "/delete requires one or more list positions or ids".to_string(),
            ),
        },
        "status" | "stats" => ChatCommand::Status,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    })
}

/// One-screen command reference printed by `/help`.
pub fn help_text() -> &'static str {
    r#"Commands:
  /models                List models the relay serves
  /model <name>          Switch the model for new turns
  /list                  List stored conversations
  /open <n|id>           Open a conversation by list position or id
  /new                   Start a fresh conversation
  /delete <n|id> [...]   Delete one or more conversations
  /status                Show session status
  /help                  Show this list
  /quit                  Leave the chat"#
}
