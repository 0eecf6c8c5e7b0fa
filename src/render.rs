//! Output rendering for the chat transcript.
//!
//! This module provides a renderer trait and a plain-text implementation
//! for chat messages, status banners, and informational lines.

use std::io::{self, Stdout, Write};

use crate::types::{Message, Role};

/// ANSI reset, closing any style opened above.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for dim text (used for informational lines).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for cyan text (used for the user label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for the bot label).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code for yellow text (used for status banners).
const ANSI_YELLOW: &str = "\x1b[33m";

/// Where chat output goes.
///
/// The seam between session logic and the terminal. The stock
/// implementation writes plain text with optional ANSI styling; tests
/// substitute a recording implementation.
pub trait Renderer: Send {
    /// Print one chat message, dispatched on its role.
    ///
    /// Failed turns are recorded as bot messages flagged as errors; they
    /// render through [print_error](Renderer::print_error) so they stay
    /// visually distinct from real replies.
    fn print_message(&mut self, message: &Message) {
        if message.is_error {
            self.print_error(&message.text);
        } else {
            match message.role {
                Role::User => self.print_user(&message.text),
                Role::Bot => self.print_bot(&message.text),
            }
        }
    }

    /// Print a whole transcript, oldest message first.
    fn print_transcript(&mut self, messages: &[Message]) {
        for message in messages {
            self.print_message(message);
        }
    }

    /// Print a message the user sent.
    fn print_user(&mut self, text: &str);

    /// Print a reply from the model.
    fn print_bot(&mut self, text: &str);

    /// Print an error that belongs in the transcript.
    fn print_error(&mut self, error: &str);

    /// Print a transient status banner.
    fn print_banner(&mut self, banner: &str);

    /// Print an informational line.
    fn print_info(&mut self, info: &str);
}

/// Writes the transcript straight to stdout.
///
/// With color on, ANSI escapes distinguish the two speaker labels from
/// errors and banners; with color off the text is pipe-clean.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Renderer with ANSI color on.
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            use_color: true,
        }
    }

    /// Renderer with color chosen by the caller, usually from `--no-color`.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    /// Push buffered output out before control returns to the prompt.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_user(&mut self, text: &str) {
        if self.use_color {
            println!("{ANSI_CYAN}you:{ANSI_RESET} {text}");
        } else {
            println!("you: {text}");
        }
        self.flush();
    }

    fn print_bot(&mut self, text: &str) {
        if self.use_color {
            println!("{ANSI_GREEN}bot:{ANSI_RESET} {text}");
        } else {
            println!("bot: {text}");
        }
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("{ANSI_RED}error:{ANSI_RESET} {error}");
        } else {
            eprintln!("error: {error}");
        }
    }

    fn print_banner(&mut self, banner: &str) {
        if self.use_color {
            println!("{ANSI_YELLOW}[{banner}]{ANSI_RESET}");
        } else {
            println!("[{banner}]");
        }
        self.flush();
    }

    fn print_info(&mut self, info: &str) {
        if self.use_color {
            println!("{ANSI_DIM}{info}{ANSI_RESET}");
        } else {
            println!("{info}");
        }
        self.flush();
    }
}
