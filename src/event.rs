//! Events consumed by the orchestrator.

use chatplay_games::Marker;
use serde::{Deserialize, Serialize};

/// Game a start command asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum GameChoice {
    /// The matches game.
    Matches,
    /// Tic-tac-toe; the board size is asked next.
    TicTacToe,
}

/// An already classified chat event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Start a game.
    StartCommand(GameChoice),
    /// Answer to the board size prompt, unparsed.
    SizeChoice(String),
    /// Side picked by the player.
    SideChoice(Marker),
    /// Board button pressed.
    CellPress(usize),
    /// Free text for the matches game, forwarded verbatim.
    MatchesText(String),
    /// Leave the current game.
    ExitCommand,
    /// Start or help: back to idle.
    ResetCommand,
    /// Input that fits nothing in the current state.
    Unrecognized(String),
}
