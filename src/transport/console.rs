//! Terminal chat: one process, one chat, stdin in and stdout out.

use super::{Messenger, TransportError};
use crate::bot::Bot;
use crate::render::{RenderInstruction, RenderMode};
use crate::router::Inbound;
use crate::session::ChatId;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument, warn};

/// Prints instructions to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMessenger;

#[async_trait::async_trait]
impl Messenger for ConsoleMessenger {
    async fn deliver(&self, instruction: &RenderInstruction) -> Result<(), TransportError> {
        println!("{}", format_instruction(instruction));
        Ok(())
    }
}

/// Renders an instruction as terminal text.
///
/// Buttons are printed as `[index label]` so they can be pressed with
/// `press <index>`.
pub fn format_instruction(instruction: &RenderInstruction) -> String {
    let mut out = match instruction.mode {
        RenderMode::Send => instruction.text.clone(),
        RenderMode::Edit => format!("(edited) {}", instruction.text),
    };
    if let Some(grid) = &instruction.buttons {
        for row in grid.rows() {
            let line = row
                .iter()
                .map(|b| format!("[{} {}]", b.index(), b.label()))
                .collect::<Vec<_>>()
                .join("");
            out.push('\n');
            out.push_str(&line);
        }
    }
    out
}

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleLine {
    /// Nothing typed.
    Empty,
    /// An event for the bot.
    Inbound(Inbound),
    /// A voice message stored in a file.
    Voice(PathBuf),
    /// A line that could not be understood, with a hint.
    Invalid(String),
}

/// Parses one console line.
///
/// `press N` presses button `N`, `/voice <file>` sends a recorded voice
/// message, anything else is a command or text.
pub fn parse_console_line(line: &str) -> ConsoleLine {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleLine::Empty;
    }
    if let Some(rest) = line.strip_prefix("press") {
        return match rest.trim().parse::<usize>() {
            Ok(index) => ConsoleLine::Inbound(Inbound::ButtonPress { index }),
            Err(_) => ConsoleLine::Invalid("Usage: press <button number>".to_string()),
        };
    }
    if let Some(rest) = line.strip_prefix("/voice") {
        let path = rest.trim();
        return if path.is_empty() {
            ConsoleLine::Invalid("Usage: /voice <audio file>".to_string())
        } else {
            ConsoleLine::Voice(PathBuf::from(path))
        };
    }
    ConsoleLine::Inbound(Inbound::from_text(line))
}

/// Runs the console chat until stdin closes.
#[instrument(skip(bot))]
pub async fn run_console(bot: &Bot, chat_id: ChatId) -> Result<(), TransportError> {
    info!("Console chat started");
    println!("{}", crate::texts::help_menu());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let inbound = match parse_console_line(&line) {
            ConsoleLine::Empty => continue,
            ConsoleLine::Invalid(hint) => {
                println!("{hint}");
                continue;
            }
            ConsoleLine::Inbound(inbound) => inbound,
            ConsoleLine::Voice(path) => match tokio::fs::read(&path).await {
                Ok(audio) => Inbound::Voice { audio },
                Err(e) => {
                    println!("Cannot read {}: {e}", path.display());
                    continue;
                }
            },
        };
        if let Err(e) = bot.on_inbound(chat_id, inbound).await {
            warn!(error = %e, "Event handled but replies were lost");
        }
    }

    info!("Console closed");
    Ok(())
}
