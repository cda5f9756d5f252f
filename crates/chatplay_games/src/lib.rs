//! Pure game logic for chatplay.
//!
//! Three games share this crate:
//!
//! - **Tic-tac-toe**: a 3x3 [`GridBoard`] won with three in a row, played by
//!   [`tictactoe_ai::best_move`].
//! - **Five-in-a-row**: an 8x8 [`GridBoard`] won with five in a row, played by
//!   [`gomoku_ai::best_move`].
//! - **Matches**: a Nim-like counting game driven by free text, see [`MatchesGame`].
//!
//! Nothing here knows about chats, sessions or rendering.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod grid;
mod marker;
mod matches;

pub mod gomoku_ai;
pub mod tictactoe_ai;

pub use grid::{GridBoard, GridStatus, PlaceError};
pub use marker::Marker;
pub use matches::{MatchesCode, MatchesGame, MatchesPhase, MatchesReply, DEFAULT_MATCHES, MAX_TAKE};
