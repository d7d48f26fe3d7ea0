//! Click-to-move selection.

use chess::Game;
use cozy_chess::{Piece, Square};

/// What a click asks the coordinator to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Selected(Square),
    Cleared,
    /// Try this move. The selection has already been cleared.
    Move {
        from: Square,
        to: Square,
        promotion: Option<Piece>,
    },
    Ignored,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    selected: Option<Square>,
}

impl Selection {
    pub fn selected(&self) -> Option<Square> {
        self.selected
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Clicking a piece of the side to move selects it, or deselects it if
    /// it already was. Any other square turns an existing selection into a
    /// move attempt (pawns reaching the last rank become queens).
    pub fn click(&mut self, game: &Game, sq: Square) -> ClickOutcome {
        let board = game.position();
        if board.color_on(sq) == Some(board.side_to_move()) {
            if self.selected == Some(sq) {
                self.selected = None;
                return ClickOutcome::Cleared;
            }
            self.selected = Some(sq);
            return ClickOutcome::Selected(sq);
        }

        match self.selected.take() {
            Some(from) => ClickOutcome::Move {
                from,
                to: sq,
                promotion: game.promotion_for(from, sq),
            },
            None => ClickOutcome::Ignored,
        }
    }
}
