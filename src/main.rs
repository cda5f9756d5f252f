//! Chatplay - chat bot CLI
//!
//! Plays tic-tac-toe, five-in-a-row and matches in a terminal chat or behind
//! an HTTP ingestion endpoint.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use chatplay::{
    Bot, BotConfig, ConsoleMessenger, Credentials, LogMessenger, Messenger, Orchestrator, Router,
    Services, StandardEngines, WebhookMessenger,
};
use clap::Parser;
use cli::{Cli, Command};
use std::sync::Arc;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = BotConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Console { chat_id } => run_console(config, chat_id).await,
        Command::Http { port, host } => run_http(config, host, port).await,
    }
}

/// Builds a bot delivering through `messenger`.
#[instrument(skip_all)]
fn build_bot(config: &BotConfig, messenger: Arc<dyn Messenger>) -> Result<Bot> {
    let services = Services::from_config(config.services(), &Credentials::from_env())?;
    let engines = Arc::new(StandardEngines::with_matches(config.initial_matches()));
    Ok(Bot::new(
        Orchestrator::new(engines),
        Router::with_keywords()?,
        services,
        messenger,
    ))
}

/// Chat in the terminal
async fn run_console(config: BotConfig, chat_id: i64) -> Result<()> {
    // Logs go to stderr so they do not mix with the chat
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(chat_id, "Starting console chat");
    let bot = build_bot(&config, Arc::new(ConsoleMessenger))?;
    chatplay::run_console(&bot, chat_id).await?;
    Ok(())
}

/// Run the HTTP ingestion server
async fn run_http(config: BotConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let host = host.unwrap_or_else(|| config.http().host().clone());
    let port = port.unwrap_or(*config.http().port());
    info!(%host, port, "Starting chatplay HTTP server");

    let messenger: Arc<dyn Messenger> = match config.messenger().webhook_url() {
        Some(url) => Arc::new(WebhookMessenger::new(
            url.clone(),
            config.services().timeout(),
        )?),
        None => Arc::new(LogMessenger),
    };
    let bot = Arc::new(build_bot(&config, messenger)?);
    chatplay::serve(bot, &host, port).await?;
    Ok(())
}
