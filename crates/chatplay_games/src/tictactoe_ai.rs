//! Perfect-play opponent for 3x3 tic-tac-toe.
//!
//! Negamax with alpha-beta pruning. Wins found at a shallower depth score
//! higher, so the AI finishes games quickly and delays losses.

use crate::grid::{GridBoard, GridStatus};
use tracing::{debug, instrument};

/// Centre first, then corners, then edges.
const PREFERRED_ORDER: [usize; 9] = [4, 0, 2, 6, 8, 1, 3, 5, 7];

const WIN_SCORE: i32 = 100;
const BOUND: i32 = 1_000;

/// Returns the best cell for the marker to move, or `None` when the game is
/// over or the board is not 3x3.
#[instrument(skip(board), fields(moves = board.move_count()))]
pub fn best_move(board: &GridBoard) -> Option<usize> {
    if board.is_over() || board.size() != 3 {
        return None;
    }

    let mut best: Option<(usize, i32)> = None;
    for cell in ordered_empty(board) {
        let mut child = board.clone();
        if child.place(cell).is_err() {
            continue;
        }
        let score = -negamax(&child, 1, -BOUND, BOUND);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((cell, score));
        }
    }

    debug!(choice = ?best, "Tic-tac-toe AI chose cell");
    best.map(|(cell, _)| cell)
}

fn negamax(board: &GridBoard, depth: i32, mut alpha: i32, beta: i32) -> i32 {
    match board.status() {
        // The previous mover completed a line.
        GridStatus::Won(_) => return depth - WIN_SCORE,
        GridStatus::Draw => return 0,
        GridStatus::InProgress => {}
    }

    let mut best = -BOUND;
    for cell in ordered_empty(board) {
        let mut child = board.clone();
        if child.place(cell).is_err() {
            continue;
        }
        let score = -negamax(&child, depth + 1, -beta, -alpha);
        best = best.max(score);
        alpha = alpha.max(score);
        if alpha >= beta {
            break;
        }
    }
    best
}

fn ordered_empty(board: &GridBoard) -> impl Iterator<Item = usize> + '_ {
    PREFERRED_ORDER
        .iter()
        .copied()
        .filter(move |&cell| board.is_empty(cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Marker;

    fn board_from(cells: &[usize]) -> GridBoard {
        let mut board = GridBoard::tictactoe();
        for &cell in cells {
            board.place(cell).unwrap();
        }
        board
    }

    #[test]
    fn test_opens_in_centre() {
        assert_eq!(best_move(&GridBoard::tictactoe()), Some(4));
    }

    #[test]
    fn test_takes_winning_cell() {
        // X: 0 1, O: 3 4, X to move
        let board = board_from(&[0, 3, 1, 4]);
        assert_eq!(best_move(&board), Some(2));
    }

    #[test]
    fn test_blocks_opponent_line() {
        // X: 0 1, O: 4, O to move must block at 2
        let board = board_from(&[0, 4, 1]);
        assert_eq!(board.to_move(), Marker::O);
        assert_eq!(best_move(&board), Some(2));
    }

    #[test]
    fn test_no_move_when_over() {
        let board = board_from(&[0, 3, 1, 4, 2]);
        assert_eq!(best_move(&board), None);
    }

    #[test]
    fn test_never_loses_to_first_free_cell_player() {
        for ai in [Marker::X, Marker::O] {
            let mut board = GridBoard::tictactoe();
            while !board.is_over() {
                let cell = if board.to_move() == ai {
                    best_move(&board).unwrap()
                } else {
                    board.empty_cells().next().unwrap()
                };
                board.place(cell).unwrap();
            }
            assert_ne!(board.winner(), Some(ai.opponent()), "AI as {ai} lost");
        }
    }
}
