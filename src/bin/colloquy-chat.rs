//! Interactive chat application backed by a colloquy relay.
//!
//! This binary provides a REPL interface for chatting with hosted models
//! through the relay, with server-side conversation history.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage against the default relay at http://localhost:5001
//! colloquy-chat
//!
//! # Point at a different relay
//! colloquy-chat --relay-url http://relay.internal:5001
//!
//! # Pick a model up front
//! colloquy-chat --model gpt-4o
//!
//! # Plain output for piping
//! colloquy-chat --no-color
//! ```
//!
//! # Commands
//!
//! Lines starting with `/` act on the session instead of the model:
//! - `/help` - List commands
//! - `/models` - List the models the relay serves
//! - `/model <name>` - Pick the model for new turns
//! - `/list` - List stored conversations
//! - `/open <n|id>` - Open a stored conversation
//! - `/new` - Start a fresh conversation
//! - `/delete <n|id> ...` - Delete conversations
//! - `/status` - Show session status
//! - `/quit` - Leave

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use colloquy::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, Submission,
    help_text, parse_command,
};
use colloquy::{Backend, ConversationId, ConversationSummary, Relay};

/// Main entry point for the colloquy-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("colloquy-chat [OPTIONS]");

    let relay = Relay::with_options(args.relay_url.clone(), args.timeout.map(Duration::from_secs))?;
    let relay_url = relay.base_url().to_string();

    let config = ChatConfig::from(args);
    let use_color = config.use_color;

    let mut session = ChatSession::new(relay, config);
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    // Ctrl+C flips this flag; the in-flight turn polls it
    let interrupted = Arc::new(AtomicBool::new(false));

    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    println!("Colloquy Chat (relay: {}, model: {})", relay_url, session.model());
    println!("Type /help for the command list\n");

    session.refresh_models().await;
    print_banner(&session, &mut renderer);
    session.refresh_conversations().await;
    print_banner(&session, &mut renderer);

    loop {
        // A stale interrupt must not cancel the next request
        interrupted.store(false, Ordering::Relaxed);

        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Models => {
                            session.refresh_models().await;
                            print_models(&session);
                            print_banner(&session, &mut renderer);
                        }
                        ChatCommand::Model(model_id) => {
                            session.set_model(model_id);
                            let label = session.models().label_or_id(session.model());
                            renderer.print_info(&format!("Model changed to: {}", label));
                        }
                        ChatCommand::List => {
                            session.refresh_conversations().await;
                            print_conversations(&session);
                            print_banner(&session, &mut renderer);
                        }
                        ChatCommand::Open(selector) => {
                            match resolve_selector(&selector, session.conversations()) {
                                Some(id) => {
                                    let title = session
                                        .conversations()
                                        .iter()
                                        .find(|summary| summary.id == id)
                                        .map(|summary| summary.title.clone());
                                    if session.open_conversation(id).await {
                                        if let Some(title) = title {
                                            renderer.print_info(&format!("Opened: {}", title));
                                        }
                                        renderer.print_transcript(session.messages());
                                    }
                                    print_banner(&session, &mut renderer);
                                }
                                None => {
                                    renderer.print_error(&format!(
                                        "No conversation matches '{}'; try /list first",
                                        selector
                                    ));
                                }
                            }
                        }
                        ChatCommand::New => {
                            if session.new_conversation().await {
                                renderer.print_info("Started a fresh conversation.");
                            }
                            print_banner(&session, &mut renderer);
                        }
                        ChatCommand::Delete(selectors) => {
                            let mut ids: Vec<ConversationId> = Vec::new();
                            for selector in &selectors {
                                match resolve_selector(selector, session.conversations()) {
                                    Some(id) => {
                                        if !ids.contains(&id) {
                                            ids.push(id);
                                        }
                                    }
                                    None => {
                                        renderer.print_error(&format!(
                                            "No conversation matches '{}'; try /list first",
                                            selector
                                        ));
                                    }
                                }
                            }
                            if !ids.is_empty() {
                                let report = session.delete_conversations(ids).await;
                                if !report.deleted.is_empty() {
                                    renderer.print_info(&format!(
                                        "Deleted {} conversation(s).",
                                        report.deleted.len()
                                    ));
                                }
                                print_banner(&session, &mut renderer);
                            }
                        }
                        ChatCommand::Status => {
                            print_status(&session, &relay_url);
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message - send through the relay
                let count_before = session.message_count();
                if session.send(line, interrupted.clone()).await == Submission::Accepted {
                    // The prompt line above already shows the user's message
                    for message in &session.messages()[count_before + 1..] {
                        renderer.print_message(message);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

/// Resolve a selector against the cached conversation list.
///
/// A selector is either a 1-based list position or a conversation id.
/// Positions win when both readings are possible.
fn resolve_selector(
    selector: &str,
    conversations: &[ConversationSummary],
) -> Option<ConversationId> {
    if let Ok(position) = selector.parse::<usize>()
        && position >= 1
        && let Some(summary) = conversations.get(position - 1)
    {
        return Some(summary.id.clone());
    }
    conversations
        .iter()
        .find(|summary| summary.id.to_string() == selector)
        .map(|summary| summary.id.clone())
}

fn print_banner<B: Backend>(session: &ChatSession<B>, renderer: &mut dyn Renderer) {
    if let Some(banner) = session.last_error() {
        renderer.print_banner(banner);
    }
}

fn print_models<B: Backend>(session: &ChatSession<B>) {
    let models = session.models();
    if models.is_empty() {
        println!("    No models advertised by the relay.");
        return;
    }
    println!("    Models:");
    for (id, label) in models.iter() {
        let marker = if id == session.model() { "*" } else { " " };
        println!("      {} {} ({})", marker, id, label);
    }
}

fn print_conversations<B: Backend>(session: &ChatSession<B>) {
    let conversations = session.conversations();
    if conversations.is_empty() {
        println!("    No stored conversations.");
        return;
    }
    println!("    Conversations:");
    for (position, summary) in conversations.iter().enumerate() {
        let marker = if session.active_conversation() == Some(&summary.id) {
            "*"
        } else {
            " "
        };
        println!(
            "      {} {:>3}. {} ({}) [{}]",
            marker,
            position + 1,
            summary.title,
            summary.created_at,
            summary.id
        );
    }
}

fn print_status<B: Backend>(session: &ChatSession<B>, relay_url: &str) {
    let stats = session.stats();
    println!("    Session Status:");
    println!("      Relay: {}", relay_url);
    println!("      Model: {} ({})", stats.model, stats.model_label);
    match stats.active_conversation {
        Some(ref id) => println!("      Conversation: {}", id),
        None => println!("      Conversation: (unsaved)"),
    }
    println!("      Messages this session: {}", stats.message_count);
    println!("      Stored conversations: {}", stats.conversation_count);
    println!("      Models available: {}", stats.model_count);
    if stats.pending {
        println!("      Request: in flight");
    }
    match stats.last_error {
        Some(ref banner) => println!("      Last error: {}", banner),
        None => println!("      Last error: (none)"),
    }
}
