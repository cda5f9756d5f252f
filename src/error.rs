//! Orchestrator error types.
//!
//! Errors carry the source location where they were raised, captured with
//! `#[track_caller]`, so a log line points at the transition that failed.
//!
//! | Kind | Recovery |
//! |------|----------|
//! | [`ErrorKind::InvalidInput`] | corrective render, state unchanged |
//! | [`ErrorKind::NoActiveSession`] | answered as if idle |
//! | [`ErrorKind::EngineFailure`] | session destroyed, chat back to idle |
//! | [`ErrorKind::TransportFailure`] | reported to the caller, state kept |

use crate::engine::EngineError;
use crate::transport::TransportError;
use derive_more::{Display, Error};
use tracing::instrument;

/// Category of an [`OrchestratorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ErrorKind {
    /// Bad board size, occupied cell, event that does not fit the state.
    #[display("invalid input")]
    InvalidInput,
    /// A game event arrived for a chat with no game.
    #[display("no active session")]
    NoActiveSession,
    /// The game engine could not produce or apply a move.
    #[display("engine failure")]
    EngineFailure,
    /// The messenger could not deliver a render instruction.
    #[display("transport failure")]
    TransportFailure,
}

/// Error raised while handling a chat event.
#[derive(Debug, Clone, Display, Error)]
#[display("Orchestrator error ({}): {} at {}:{}", kind, message, file, line)]
pub struct OrchestratorError {
    /// Error category.
    pub kind: ErrorKind,
    /// User-facing message for input errors, diagnostic text otherwise.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl OrchestratorError {
    /// Creates a new error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Input the current state cannot accept.
    #[track_caller]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    /// Game event without a game.
    #[track_caller]
    pub fn no_active_session(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoActiveSession, message)
    }

    /// Engine could not move.
    #[track_caller]
    pub fn engine_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EngineFailure, message)
    }

    /// Delivery failed.
    #[track_caller]
    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransportFailure, message)
    }
}

impl From<EngineError> for OrchestratorError {
    #[track_caller]
    fn from(err: EngineError) -> Self {
        Self::engine_failure(err.message)
    }
}

impl From<TransportError> for OrchestratorError {
    #[track_caller]
    fn from(err: TransportError) -> Self {
        Self::transport_failure(err.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_points_at_caller() {
        let err = OrchestratorError::invalid_input("Choose board size: 3 or 8!");
        assert_eq!(err.kind, ErrorKind::InvalidInput);
        assert!(err.file.ends_with("error.rs"));
        assert!(err.to_string().contains("invalid input"));
    }

    #[test]
    fn test_engine_error_converts_to_engine_failure() {
        let err: OrchestratorError = EngineError::new("no legal move").into();
        assert_eq!(err.kind, ErrorKind::EngineFailure);
        assert_eq!(err.message, "no legal move");
    }
}
