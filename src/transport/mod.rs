//! Delivery of render instructions and inbound transports.

mod console;
mod http;
mod messenger;

pub use console::{ConsoleLine, ConsoleMessenger, format_instruction, parse_console_line, run_console};
pub use http::{app, serve};
pub use messenger::{LogMessenger, WebhookMessenger};

use crate::render::RenderInstruction;
use derive_more::{Display, Error};
use tracing::instrument;

/// Transport error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Transport error: {} at {}:{}", message, file, line)]
pub struct TransportError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl TransportError {
    /// Creates a new transport error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for TransportError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("IO error: {}", err))
    }
}

impl From<reqwest::Error> for TransportError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::new(format!("HTTP error: {}", err))
    }
}

/// Sink for render instructions.
///
/// Delivery is fire-and-forget from the orchestrator's side: a failure is
/// reported, never retried.
#[async_trait::async_trait]
pub trait Messenger: Send + Sync {
    /// Delivers one instruction.
    async fn deliver(&self, instruction: &RenderInstruction) -> Result<(), TransportError>;
}
