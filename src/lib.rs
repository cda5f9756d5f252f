//! Chatplay library - a chat-driven game orchestrator.
//!
//! Players talk to the bot through a chat transport. Each chat gets its own
//! session state machine that walks through game selection, setup and play,
//! while the game engines in `chatplay_games` supply the opponent.
//!
//! # Architecture
//!
//! - **Router**: turns commands, text and button presses into events
//! - **Orchestrator**: the per-chat state machine and turn sequencing
//! - **Session store**: one serialised slot per chat
//! - **Engines**: tic-tac-toe 3x3, five-in-a-row 8x8, matches
//! - **Transports**: console, HTTP ingestion, webhook delivery
//!
//! # Example
//!
//! ```no_run
//! use chatplay::{Bot, Inbound, LogMessenger, Orchestrator, Router, Services, StandardEngines};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let bot = Bot::new(
//!     Orchestrator::new(Arc::new(StandardEngines::default())),
//!     Router::with_keywords()?,
//!     Services::none(),
//!     Arc::new(LogMessenger),
//! );
//! let replies = bot.on_inbound(42, Inbound::from_text("/tictactoe")).await?;
//! assert_eq!(replies[0].text, "Choose board size: 3 or 8");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod bot;
mod config;
mod engine;
mod error;
mod event;
mod orchestrator;
mod render;
mod router;
mod services;
mod session;
mod transport;

pub mod texts;

// Crate-level exports - Bot and orchestration
pub use bot::Bot;
pub use orchestrator::Orchestrator;

// Crate-level exports - Configuration
pub use config::{BotConfig, ConfigError, Credentials, HttpConfig, MessengerConfig, ServicesConfig};

// Crate-level exports - Engines
pub use engine::{
    BoardSize, CountingEngine, EngineError, EngineRegistry, GomokuEngine, GridEngine,
    MatchesEngine, StandardEngines, TicTacToeEngine,
};

// Crate-level exports - Errors
pub use error::{ErrorKind, OrchestratorError};

// Crate-level exports - Events and routing
pub use event::{Event, GameChoice};
pub use router::{
    Inbound, Input, Intent, IntentClassifier, KeywordClassifier, Route, Router, SOLVE_COMMANDS,
    TextIntent,
};

// Crate-level exports - Rendering
pub use render::{
    BLANK_GLYPH, Button, ButtonGrid, O_GLYPH, RenderCache, RenderInstruction, RenderMode,
    X_GLYPH, cell_index, cell_position, glyph,
};

// Crate-level exports - Services
pub use services::{
    JokeClient, ServiceError, Services, TextService, Transcriber, WitTranscriber, WolframSolver,
    YandexTranslator, joke_term,
};

// Crate-level exports - Sessions
pub use session::{
    ChatGuard, ChatId, ChatSlot, GameBoard, GameKind, Session, SessionState, SessionStore, Setup,
};

// Crate-level exports - Transports
pub use transport::{
    ConsoleLine, ConsoleMessenger, LogMessenger, Messenger, TransportError, WebhookMessenger, app,
    format_instruction, parse_console_line, run_console, serve,
};
