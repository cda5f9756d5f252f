//! Command-line interface for chatplay.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Chatplay - chat bot playing tic-tac-toe, five-in-a-row and matches
#[derive(Parser, Debug)]
#[command(name = "chatplay")]
#[command(about = "Chat bot that plays small board games against you", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Chat with the bot in this terminal
    Console {
        /// Chat id used for the terminal conversation
        #[arg(long, default_value = "1")]
        chat_id: i64,
    },

    /// Run the HTTP ingestion server
    Http {
        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::parse_from(["chatplay", "http", "--port", "8080", "--config", "bot.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("bot.toml")));
        match cli.command {
            Command::Http { port, host } => {
                assert_eq!(port, Some(8080));
                assert_eq!(host, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_console_default_chat() {
        let cli = Cli::parse_from(["chatplay", "console"]);
        assert!(matches!(cli.command, Command::Console { chat_id: 1 }));
    }
}
