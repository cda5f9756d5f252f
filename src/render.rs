//! Render instructions sent to the messenger.
//!
//! A grid is drawn as one button per cell. A button's index is
//! `row * size + col`, which is also the cell index the engines use, so a
//! button press maps straight back to a move.

use crate::session::ChatId;
use chatplay_games::Marker;
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};

/// Glyph for a cell holding X.
pub const X_GLYPH: &str = "❌";
/// Glyph for a cell holding O.
pub const O_GLYPH: &str = "⭕️";
/// Label of an empty cell.
pub const BLANK_GLYPH: &str = " ";

/// Whether to post a new message or edit the one carrying the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RenderMode {
    /// Post a new message.
    Send,
    /// Edit the chat's board message in place.
    Edit,
}

/// One pressable button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Button {
    /// Text on the button.
    label: String,
    /// Opaque index reported back when pressed.
    index: usize,
}

/// Rows of buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ButtonGrid {
    rows: Vec<Vec<Button>>,
}

impl ButtonGrid {
    /// Grid with one button per board cell.
    pub fn board(cells: &[Option<Marker>], size: usize) -> Self {
        let rows = cells
            .chunks(size)
            .enumerate()
            .map(|(row, chunk)| {
                chunk
                    .iter()
                    .enumerate()
                    .map(|(col, cell)| {
                        Button::new(glyph(*cell).to_string(), cell_index(row, col, size))
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// The X / O side prompt. X is index 0, O is index 1.
    pub fn side_choice() -> Self {
        Self {
            rows: vec![
                vec![Button::new(Marker::X.to_string(), 0)],
                vec![Button::new(Marker::O.to_string(), 1)],
            ],
        }
    }

    /// All buttons, row by row.
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }
}

/// Directive for the messenger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderInstruction {
    /// Target chat.
    pub chat_id: ChatId,
    /// Send or edit.
    pub mode: RenderMode,
    /// Message text.
    pub text: String,
    /// Optional buttons under the text.
    pub buttons: Option<ButtonGrid>,
}

impl RenderInstruction {
    /// A new plain text message.
    pub fn send(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            mode: RenderMode::Send,
            text: text.into(),
            buttons: None,
        }
    }

    /// An edit of the board message.
    pub fn edit(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            mode: RenderMode::Edit,
            text: text.into(),
            buttons: None,
        }
    }

    /// Attaches buttons.
    pub fn with_buttons(mut self, buttons: ButtonGrid) -> Self {
        self.buttons = Some(buttons);
        self
    }
}

/// Button label for a cell.
pub fn glyph(cell: Option<Marker>) -> &'static str {
    match cell {
        Some(Marker::X) => X_GLYPH,
        Some(Marker::O) => O_GLYPH,
        None => BLANK_GLYPH,
    }
}

/// Index of the button at `(row, col)`.
pub fn cell_index(row: usize, col: usize, size: usize) -> usize {
    row * size + col
}

/// `(row, col)` of a button index, `None` when off the board.
pub fn cell_position(index: usize, size: usize) -> Option<(usize, usize)> {
    (index < size * size).then(|| (index / size, index % size))
}

/// Cell markers as last shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderCache {
    cells: Vec<Option<Marker>>,
}

impl RenderCache {
    /// Cache holding `cells`.
    pub fn new(cells: Vec<Option<Marker>>) -> Self {
        Self { cells }
    }

    /// Cells as last rendered.
    pub fn cells(&self) -> &[Option<Marker>] {
        &self.cells
    }

    /// Indices whose marker differs from `view`.
    pub fn diff(&self, view: &[Option<Marker>]) -> Vec<usize> {
        view.iter()
            .enumerate()
            .filter(|&(i, cell)| self.cells.get(i) != Some(cell))
            .map(|(i, _)| i)
            .collect()
    }

    /// Replaces the cache with `view`.
    pub fn update(&mut self, view: Vec<Option<Marker>>) {
        self.cells = view;
    }
}
