//! Heuristic opponent for five-in-a-row.
//!
//! Every empty cell is scored by the runs it would create for the mover
//! (attack) and the runs it would cut for the opponent (defence). Defence is
//! weighted slightly lower so a winning move always beats a block.

use crate::grid::GridBoard;
use crate::marker::Marker;
use tracing::{debug, instrument};

const FIVE: i64 = 1_000_000;

/// Returns the highest scoring empty cell for the marker to move, or `None`
/// when the game is over.
#[instrument(skip(board), fields(size = board.size(), moves = board.move_count()))]
pub fn best_move(board: &GridBoard) -> Option<usize> {
    if board.is_over() {
        return None;
    }
    let me = board.to_move();

    let mut best: Option<(usize, i64)> = None;
    for cell in board.empty_cells() {
        let attack = cell_score(board, cell, me);
        let defence = cell_score(board, cell, me.opponent()) * 9 / 10;
        let score = attack + defence + centrality(board, cell);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((cell, score));
        }
    }

    debug!(choice = ?best, "Five-in-a-row AI chose cell");
    best.map(|(cell, _)| cell)
}

/// Sum of run scores `marker` would get by playing `cell`.
fn cell_score(board: &GridBoard, cell: usize, marker: Marker) -> i64 {
    GridBoard::directions()
        .iter()
        .map(|&dir| {
            let (count, open_ends) = board.run_through(cell, marker, dir);
            run_score(count, open_ends, board.win_length())
        })
        .sum()
}

fn run_score(count: usize, open_ends: usize, win_length: usize) -> i64 {
    if count >= win_length {
        return FIVE;
    }
    match (win_length - count, open_ends) {
        (_, 0) => 0,
        (1, 2) => 50_000,
        (1, _) => 5_000,
        (2, 2) => 5_000,
        (2, _) => 500,
        (3, 2) => 300,
        (3, _) => 50,
        (_, 2) => 20,
        _ => 5,
    }
}

/// Small bonus that keeps early play near the middle.
fn centrality(board: &GridBoard, cell: usize) -> i64 {
    let size = board.size() as i64;
    let row = (cell as i64) / size;
    let col = (cell as i64) % size;
    let centre2 = size - 1;
    let distance = (2 * row - centre2).abs() + (2 * col - centre2).abs();
    2 * size - distance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_from(cells: &[usize]) -> GridBoard {
        let mut board = GridBoard::gomoku();
        for &cell in cells {
            board.place(cell).unwrap();
        }
        board
    }

    #[test]
    fn test_opens_near_centre() {
        let cell = best_move(&GridBoard::gomoku()).unwrap();
        assert!([27, 28, 35, 36].contains(&cell), "opened at {cell}");
    }

    #[test]
    fn test_completes_five() {
        // X: 16 17 18 19, O: 40 41 42 49, X to move
        let board = board_from(&[16, 40, 17, 41, 18, 42, 19, 49]);
        let cell = best_move(&board).unwrap();
        assert!(cell == 20, "expected winning cell 20, got {cell}");
    }

    #[test]
    fn test_blocks_four() {
        // X: 16 17 18 19 threatens 20, O to move
        let board = board_from(&[16, 40, 17, 41, 18, 55, 19]);
        assert_eq!(board.to_move(), Marker::O);
        assert_eq!(best_move(&board), Some(20));
    }

    #[test]
    fn test_prefers_win_over_block() {
        // O: 40 41 42 43 can win at 44; X also threatens 20
        let board = board_from(&[16, 40, 17, 41, 18, 42, 19, 43, 63]);
        assert_eq!(board.to_move(), Marker::O);
        assert_eq!(best_move(&board), Some(44));
    }
}
