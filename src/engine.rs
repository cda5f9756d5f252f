//! Game engine capability consumed by the orchestrator.
//!
//! The orchestrator never touches a board directly. Grid games go through
//! [`GridEngine`], the matches game through [`MatchesEngine`], and the engine
//! for a session is resolved from its kind by an [`EngineRegistry`].

use chatplay_games::{
    DEFAULT_MATCHES, GridBoard, Marker, MatchesGame, MatchesReply, PlaceError, gomoku_ai,
    tictactoe_ai,
};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Side length of a grid game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
pub enum BoardSize {
    /// 3x3 tic-tac-toe.
    #[strum(to_string = "3")]
    Three,
    /// 8x8 five-in-a-row.
    #[strum(to_string = "8")]
    Eight,
}

impl BoardSize {
    /// Parses the player's answer to the board size prompt.
    pub fn from_choice(text: &str) -> Option<Self> {
        match text.trim() {
            "3" => Some(BoardSize::Three),
            "8" => Some(BoardSize::Eight),
            _ => None,
        }
    }

    /// Number of cells along one side.
    pub fn side(self) -> usize {
        match self {
            BoardSize::Three => 3,
            BoardSize::Eight => 8,
        }
    }
}

/// Engine error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Engine error: {} at {}:{}", message, file, line)]
pub struct EngineError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl EngineError {
    /// Creates a new engine error with caller location tracking.
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

impl From<PlaceError> for EngineError {
    #[track_caller]
    fn from(err: PlaceError) -> Self {
        Self::new(err.to_string())
    }
}

/// Capability surface of a grid game engine.
///
/// Only `size`, `new_game` and `engine_move` differ between variants; the
/// rest delegate to [`GridBoard`].
pub trait GridEngine: Send + Sync {
    /// Board size this engine plays.
    fn size(&self) -> BoardSize;

    /// Creates an empty board.
    fn new_game(&self) -> GridBoard;

    /// Picks the engine's move for the marker to move.
    fn engine_move(&self, board: &GridBoard) -> Result<usize, EngineError>;

    /// Whether `cell` can be played now.
    fn legal(&self, board: &GridBoard, cell: usize) -> bool {
        !board.is_over() && board.is_empty(cell)
    }

    /// Plays `cell` for the marker to move.
    fn apply(&self, board: &mut GridBoard, cell: usize) -> Result<(), EngineError> {
        board.place(cell)?;
        Ok(())
    }

    /// Whether the game has ended.
    fn is_terminal(&self, board: &GridBoard) -> bool {
        board.is_over()
    }

    /// Winner of a finished game, `None` for a draw or an unfinished game.
    fn winner(&self, board: &GridBoard) -> Option<Marker> {
        board.winner()
    }

    /// Marker whose turn it is.
    fn to_move(&self, board: &GridBoard) -> Marker {
        board.to_move()
    }

    /// Cell contents in row-major order.
    fn view(&self, board: &GridBoard) -> Vec<Option<Marker>> {
        board.cells().to_vec()
    }
}

/// Capability surface of the matches game engine.
pub trait MatchesEngine: Send + Sync {
    /// Creates a new game.
    fn new_game(&self) -> MatchesGame;

    /// Rules shown when a game starts.
    fn rules(&self) -> String;

    /// Feeds one player message to the game.
    fn get_response(&self, game: &mut MatchesGame, text: &str) -> Result<MatchesReply, EngineError>;
}

/// Resolves the engine for a game kind.
pub trait EngineRegistry: Send + Sync {
    /// Engine for a grid game of `size`.
    fn grid(&self, size: BoardSize) -> &dyn GridEngine;

    /// Engine for the matches game.
    fn matches(&self) -> &dyn MatchesEngine;
}

/// 3x3 tic-tac-toe with a perfect-play opponent.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicTacToeEngine;

impl GridEngine for TicTacToeEngine {
    fn size(&self) -> BoardSize {
        BoardSize::Three
    }

    fn new_game(&self) -> GridBoard {
        GridBoard::tictactoe()
    }

    #[instrument(skip(self, board))]
    fn engine_move(&self, board: &GridBoard) -> Result<usize, EngineError> {
        tictactoe_ai::best_move(board).ok_or_else(|| EngineError::new("No move available"))
    }
}

/// 8x8 five-in-a-row with a heuristic opponent.
#[derive(Debug, Clone, Copy, Default)]
pub struct GomokuEngine;

impl GridEngine for GomokuEngine {
    fn size(&self) -> BoardSize {
        BoardSize::Eight
    }

    fn new_game(&self) -> GridBoard {
        GridBoard::gomoku()
    }

    #[instrument(skip(self, board))]
    fn engine_move(&self, board: &GridBoard) -> Result<usize, EngineError> {
        gomoku_ai::best_move(board).ok_or_else(|| EngineError::new("No move available"))
    }
}

/// The matches game starting from a fixed pile.
#[derive(Debug, Clone, Copy)]
pub struct CountingEngine {
    initial: u32,
}

impl CountingEngine {
    /// Creates an engine whose games start with `initial` matches, at least one.
    pub fn new(initial: u32) -> Self {
        Self {
            initial: initial.max(1),
        }
    }
}

impl Default for CountingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MATCHES)
    }
}

impl MatchesEngine for CountingEngine {
    fn new_game(&self) -> MatchesGame {
        MatchesGame::new(self.initial)
    }

    fn rules(&self) -> String {
        MatchesGame::rules(self.initial)
    }

    #[instrument(skip(self, game))]
    fn get_response(&self, game: &mut MatchesGame, text: &str) -> Result<MatchesReply, EngineError> {
        let reply = game.get_response(text);
        debug!(code = %reply.code, remaining = game.remaining(), "Matches engine replied");
        Ok(reply)
    }
}

/// The engines shipped with the bot.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEngines {
    tictactoe: TicTacToeEngine,
    gomoku: GomokuEngine,
    matches: CountingEngine,
}

impl StandardEngines {
    /// Creates the standard registry with a custom matches pile.
    pub fn with_matches(initial: u32) -> Self {
        Self {
            matches: CountingEngine::new(initial),
            ..Self::default()
        }
    }
}

impl EngineRegistry for StandardEngines {
    fn grid(&self, size: BoardSize) -> &dyn GridEngine {
        match size {
            BoardSize::Three => &self.tictactoe,
            BoardSize::Eight => &self.gomoku,
        }
    }

    fn matches(&self) -> &dyn MatchesEngine {
        &self.matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatplay_games::MatchesCode;
    use strum::IntoEnumIterator;

    #[test]
    fn test_board_size_choice() {
        assert_eq!(BoardSize::from_choice(" 3 "), Some(BoardSize::Three));
        assert_eq!(BoardSize::from_choice("8"), Some(BoardSize::Eight));
        assert_eq!(BoardSize::from_choice("5"), None);
        assert_eq!(BoardSize::Eight.to_string(), "8");
    }

    #[test]
    fn test_registry_resolves_by_size() {
        let engines = StandardEngines::default();
        for size in BoardSize::iter() {
            let engine = engines.grid(size);
            assert_eq!(engine.size(), size);
            assert_eq!(engine.new_game().size(), size.side());
        }
    }

    #[test]
    fn test_apply_rejects_occupied_cell() {
        let engine = TicTacToeEngine;
        let mut board = engine.new_game();
        engine.apply(&mut board, 4).unwrap();
        assert!(!engine.legal(&board, 4));
        assert!(engine.apply(&mut board, 4).is_err());
        assert_eq!(board.move_count(), 1);
    }

    #[test]
    fn test_engine_move_fails_on_finished_board() {
        let engine = TicTacToeEngine;
        let mut board = engine.new_game();
        for cell in [0, 3, 1, 4, 2] {
            engine.apply(&mut board, cell).unwrap();
        }
        assert!(engine.is_terminal(&board));
        assert!(engine.engine_move(&board).is_err());
    }

    #[test]
    fn test_empty_matches_pile_is_raised_to_one() {
        let engines = StandardEngines::with_matches(0);
        let engine = engines.matches();
        assert!(engine.rules().contains("there are 1 matches"));

        let mut game = engine.new_game();
        assert_eq!(game.remaining(), 1);
        let reply = engine.get_response(&mut game, "n").unwrap();
        assert_eq!(reply.code, MatchesCode::HumanWon);
    }
}
