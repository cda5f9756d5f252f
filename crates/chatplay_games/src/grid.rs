//! N x N boards won by placing k markers in a row.
//!
//! Cells are addressed by a single index in row-major order,
//! `row * size + col`.

use crate::marker::Marker;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Horizontal, vertical and both diagonals.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Status of a grid game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridStatus {
    /// Moves can still be made.
    InProgress,
    /// A marker completed a line.
    Won(Marker),
    /// The board filled up without a line.
    Draw,
}

/// Errors that can occur when placing a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum PlaceError {
    /// The game already reached a terminal status.
    #[display("Game is already over")]
    GameOver,
    /// The index does not address a cell of this board.
    #[display("Cell {cell} is out of bounds for a {size}x{size} board")]
    OutOfBounds {
        /// Requested cell.
        cell: usize,
        /// Board side length.
        size: usize,
    },
    /// The cell already holds a marker.
    #[display("Cell {cell} is already occupied")]
    Occupied {
        /// Requested cell.
        cell: usize,
    },
}

/// A square board where `win_length` markers in a line win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBoard {
    size: usize,
    win_length: usize,
    cells: Vec<Option<Marker>>,
    to_move: Marker,
    status: GridStatus,
    history: Vec<usize>,
}

impl GridBoard {
    /// Creates an empty board. X moves first.
    #[instrument]
    pub fn new(size: usize, win_length: usize) -> Self {
        Self {
            size,
            win_length,
            cells: vec![None; size * size],
            to_move: Marker::X,
            status: GridStatus::InProgress,
            history: Vec::new(),
        }
    }

    /// Classic 3x3 tic-tac-toe.
    pub fn tictactoe() -> Self {
        Self::new(3, 3)
    }

    /// 8x8 five-in-a-row.
    pub fn gomoku() -> Self {
        Self::new(8, 5)
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Markers needed in a line to win.
    pub fn win_length(&self) -> usize {
        self.win_length
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Option<Marker>] {
        &self.cells
    }

    /// Marker at `cell`, `None` when empty or out of bounds.
    pub fn get(&self, cell: usize) -> Option<Marker> {
        self.cells.get(cell).copied().flatten()
    }

    /// Whether `cell` is on the board and empty.
    pub fn is_empty(&self, cell: usize) -> bool {
        matches!(self.cells.get(cell), Some(None))
    }

    /// Marker whose turn it is.
    pub fn to_move(&self) -> Marker {
        self.to_move
    }

    /// Current status.
    pub fn status(&self) -> GridStatus {
        self.status
    }

    /// Winner, if any.
    pub fn winner(&self) -> Option<Marker> {
        match self.status {
            GridStatus::Won(marker) => Some(marker),
            _ => None,
        }
    }

    /// Whether the game has ended.
    pub fn is_over(&self) -> bool {
        self.status != GridStatus::InProgress
    }

    /// Number of markers placed so far.
    pub fn move_count(&self) -> usize {
        self.history.len()
    }

    /// Cells in the order they were played.
    pub fn history(&self) -> &[usize] {
        &self.history
    }

    /// Empty cells in index order.
    pub fn empty_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(i, _)| i)
    }

    /// Places the marker whose turn it is at `cell`.
    ///
    /// # Errors
    ///
    /// Fails without touching the board when the game is over, the index is
    /// off the board, or the cell is taken.
    #[instrument(skip(self), fields(size = self.size, to_move = %self.to_move))]
    pub fn place(&mut self, cell: usize) -> Result<GridStatus, PlaceError> {
        if self.is_over() {
            return Err(PlaceError::GameOver);
        }
        if cell >= self.cells.len() {
            return Err(PlaceError::OutOfBounds {
                cell,
                size: self.size,
            });
        }
        if self.cells[cell].is_some() {
            return Err(PlaceError::Occupied { cell });
        }

        let marker = self.to_move;
        self.cells[cell] = Some(marker);
        self.history.push(cell);

        if self.completes_line(cell, marker) {
            self.status = GridStatus::Won(marker);
        } else if self.cells.iter().all(Option::is_some) {
            self.status = GridStatus::Draw;
        } else {
            self.to_move = marker.opponent();
        }
        Ok(self.status)
    }

    /// Length of the run of `marker` through `cell` along `(dr, dc)`,
    /// counting `cell` itself and whether each end is open (on the board
    /// and empty).
    pub fn run_through(
        &self,
        cell: usize,
        marker: Marker,
        (dr, dc): (isize, isize),
    ) -> (usize, usize) {
        let mut count = 1;
        let mut open_ends = 0;
        for sign in [1isize, -1] {
            let mut step = 1;
            loop {
                match self.offset(cell, dr * sign * step, dc * sign * step) {
                    Some(next) if self.get(next) == Some(marker) => {
                        count += 1;
                        step += 1;
                    }
                    Some(next) if self.is_empty(next) => {
                        open_ends += 1;
                        break;
                    }
                    _ => break,
                }
            }
        }
        (count, open_ends)
    }

    /// The four line directions.
    pub fn directions() -> [(isize, isize); 4] {
        DIRECTIONS
    }

    fn completes_line(&self, cell: usize, marker: Marker) -> bool {
        DIRECTIONS
            .iter()
            .any(|&dir| self.run_through(cell, marker, dir).0 >= self.win_length)
    }

    fn offset(&self, cell: usize, dr: isize, dc: isize) -> Option<usize> {
        let size = self.size as isize;
        let row = (cell / self.size) as isize + dr;
        let col = (cell % self.size) as isize + dc;
        if (0..size).contains(&row) && (0..size).contains(&col) {
            Some((row * size + col) as usize)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(board: &mut GridBoard, cells: &[usize]) -> GridStatus {
        let mut status = board.status();
        for &cell in cells {
            status = board.place(cell).unwrap();
        }
        status
    }

    #[test]
    fn test_x_moves_first_and_turns_alternate() {
        let mut board = GridBoard::tictactoe();
        assert_eq!(board.to_move(), Marker::X);
        board.place(4).unwrap();
        assert_eq!(board.get(4), Some(Marker::X));
        assert_eq!(board.to_move(), Marker::O);
    }

    #[test]
    fn test_occupied_cell_rejected() {
        let mut board = GridBoard::tictactoe();
        board.place(4).unwrap();
        let before = board.clone();
        assert_eq!(board.place(4), Err(PlaceError::Occupied { cell: 4 }));
        assert_eq!(board, before);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut board = GridBoard::tictactoe();
        assert_eq!(
            board.place(9),
            Err(PlaceError::OutOfBounds { cell: 9, size: 3 })
        );
    }

    #[test]
    fn test_row_win() {
        let mut board = GridBoard::tictactoe();
        // X: 0 1 2, O: 3 4
        let status = play(&mut board, &[0, 3, 1, 4, 2]);
        assert_eq!(status, GridStatus::Won(Marker::X));
        assert_eq!(board.winner(), Some(Marker::X));
        assert_eq!(board.place(8), Err(PlaceError::GameOver));
    }

    #[test]
    fn test_anti_diagonal_win() {
        let mut board = GridBoard::tictactoe();
        // X: 0 1 8, O: 2 4 6
        let status = play(&mut board, &[0, 2, 1, 4, 8, 6]);
        assert_eq!(status, GridStatus::Won(Marker::O));
    }

    #[test]
    fn test_draw() {
        let mut board = GridBoard::tictactoe();
        // X O X / X O O / O X X
        let status = play(&mut board, &[0, 1, 2, 4, 3, 5, 7, 6, 8]);
        assert_eq!(status, GridStatus::Draw);
        assert!(board.is_over());
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_five_in_a_row_on_gomoku_board() {
        let mut board = GridBoard::gomoku();
        // X along row 2, O along row 5
        let status = play(&mut board, &[16, 40, 17, 41, 18, 42, 19, 43]);
        assert_eq!(status, GridStatus::InProgress);
        assert_eq!(board.place(20), Ok(GridStatus::Won(Marker::X)));
    }

    #[test]
    fn test_four_is_not_enough_on_gomoku_board() {
        let mut board = GridBoard::gomoku();
        // X diagonal 0 9 18 27
        let status = play(&mut board, &[0, 7, 9, 15, 18, 23, 27]);
        assert_eq!(status, GridStatus::InProgress);
    }

    #[test]
    fn test_lines_do_not_wrap_across_rows() {
        let mut board = GridBoard::tictactoe();
        // X at 2 and 3 are adjacent indices but on different rows
        let status = play(&mut board, &[2, 0, 3, 8, 4]);
        assert_eq!(status, GridStatus::InProgress);
    }

    #[test]
    fn test_run_through_counts_open_ends() {
        let mut board = GridBoard::gomoku();
        play(&mut board, &[10, 40, 11, 50]);
        assert_eq!(board.run_through(12, Marker::X, (0, 1)), (3, 2));
        assert_eq!(board.run_through(8, Marker::X, (0, 1)), (1, 1));
    }
}
