//! Display state derived from the game and the analysis.
//!
//! Nothing here is stored; every value is recomputed from the current
//! position, the candidate lines and the board orientation.

use std::collections::HashMap;

use chess::{is_capture, Game, Terminal};
use cozy_chess::{Color, Square};
use serde::Serialize;

/// Highlight kind of one board square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    /// Origin square of the current selection.
    Selected,
    /// Legal destination without a capture.
    Quiet,
    /// Legal destination capturing a piece, en passant included.
    Capture,
    MatedKing,
    /// Piece giving check to a mated king.
    Checker,
}

/// Legal-destination highlights for the piece on `from`.
///
/// Empty when the square holds no piece of the side to move.
pub fn move_highlights(game: &Game, from: Square) -> HashMap<Square, Highlight> {
    let board = game.position();
    let mut highlights = HashMap::new();
    if board.color_on(from) != Some(board.side_to_move()) {
        return highlights;
    }

    for mv in game.legal_moves_from(from) {
        // Castling is king-takes-rook internally; show the king's real target.
        let to = display_target(board, mv);
        let kind = if is_capture(board, mv) {
            Highlight::Capture
        } else {
            Highlight::Quiet
        };
        highlights.entry(to).or_insert(kind);
    }
    highlights.insert(from, Highlight::Selected);
    highlights
}

fn display_target(board: &cozy_chess::Board, mv: cozy_chess::Move) -> Square {
    let uci = chess::format_uci_move(board, mv);
    uci.get(2..4)
        .and_then(chess::parse_square)
        .unwrap_or(mv.to)
}

/// Mated king and every checking piece. Empty unless the game ended in mate.
pub fn checkmate_highlights(terminal: &Terminal) -> HashMap<Square, Highlight> {
    let mut highlights = HashMap::new();
    if let Terminal::Checkmate { king, checkers, .. } = terminal {
        highlights.insert(*king, Highlight::MatedKing);
        for sq in checkers {
            highlights.insert(*sq, Highlight::Checker);
        }
    }
    highlights
}

/// Split of the evaluation bar in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvalBar {
    pub white: f64,
    pub black: f64,
}

impl Default for EvalBar {
    fn default() -> Self {
        eval_bar(0)
    }
}

/// Map a White-relative centipawn score onto the bar.
///
/// `white = 50 + 50 * tanh(pawns / 3)`: saturating, symmetric around an
/// even position.
pub fn eval_bar(cp: i32) -> EvalBar {
    let pawns = f64::from(cp) / 100.0;
    let white = (50.0 + (pawns / 3.0).tanh() * 50.0).clamp(0.0, 100.0);
    EvalBar {
        white,
        black: 100.0 - white,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Centre of `sq` in an 8x8 view box seen from `orientation`'s side.
pub fn square_center(sq: Square, orientation: Color) -> Point {
    let file = f64::from(sq.file() as u8);
    let row = 7.0 - f64::from(sq.rank() as u8);
    match orientation {
        Color::White => Point {
            x: file + 0.5,
            y: row + 0.5,
        },
        Color::Black => Point {
            x: 7.0 - file + 0.5,
            y: 7.0 - row + 0.5,
        },
    }
}

/// Distance a knight arrow stops short of the target square centre.
const KNIGHT_ARROW_INSET: f64 = 0.15;

/// Best-move arrow in view-box coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Arrow {
    pub from: Point,
    /// Elbow of a knight arrow.
    pub via: Option<Point>,
    pub to: Point,
}

impl Arrow {
    pub fn svg_path(&self) -> String {
        match self.via {
            Some(via) => format!(
                "M{} {} L{} {} L{} {}",
                self.from.x, self.from.y, via.x, via.y, self.to.x, self.to.y
            ),
            None => format!(
                "M{} {} L{} {}",
                self.from.x, self.from.y, self.to.x, self.to.y
            ),
        }
    }
}

/// Arrow from `from` to `to`. Knight moves bend once: along the longer
/// axis first, then the short leg, which ends slightly before the target.
pub fn best_move_arrow(from: Square, to: Square, is_knight: bool, orientation: Color) -> Arrow {
    let start = square_center(from, orientation);
    let end = square_center(to, orientation);
    if !is_knight {
        return Arrow {
            from: start,
            via: None,
            to: end,
        };
    }

    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let via = if dx.abs() < dy.abs() {
        Point {
            x: start.x,
            y: end.y,
        }
    } else {
        Point {
            x: end.x,
            y: start.y,
        }
    };

    let leg_x = via.x - end.x;
    let leg_y = via.y - end.y;
    let leg = (leg_x * leg_x + leg_y * leg_y).sqrt();
    let tip = Point {
        x: end.x + leg_x * KNIGHT_ARROW_INSET / leg,
        y: end.y + leg_y * KNIGHT_ARROW_INSET / leg,
    };

    Arrow {
        from: start,
        via: Some(via),
        to: tip,
    }
}

/// Status line for the position under the cursor.
pub fn status_text(terminal: &Terminal, in_check: bool) -> String {
    match terminal {
        Terminal::Checkmate { mated, .. } => match mated {
            Color::White => "Checkmate! Black wins".to_string(),
            Color::Black => "Checkmate! White wins".to_string(),
        },
        Terminal::Draw(reason) => format!("Draw! ({})", reason),
        Terminal::None if in_check => "Check!".to_string(),
        Terminal::None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::{parse_square, DrawReason};

    fn sq(s: &str) -> Square {
        parse_square(s).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_move_highlights_marks_origin_and_targets() {
        let game = Game::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let highlights = move_highlights(&game, sq("e4"));
        assert_eq!(highlights.get(&sq("e4")), Some(&Highlight::Selected));
        assert_eq!(highlights.get(&sq("e5")), Some(&Highlight::Quiet));
        assert_eq!(highlights.get(&sq("d5")), Some(&Highlight::Capture));
        assert_eq!(highlights.len(), 3);
    }

    #[test]
    fn test_en_passant_target_is_a_capture() {
        let game = Game::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        let highlights = move_highlights(&game, sq("e5"));
        assert_eq!(highlights.get(&sq("d6")), Some(&Highlight::Capture));
        assert_eq!(highlights.get(&sq("e6")), Some(&Highlight::Quiet));
    }

    #[test]
    fn test_castling_shows_king_destination() {
        let game = Game::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let highlights = move_highlights(&game, sq("e1"));
        assert_eq!(highlights.get(&sq("g1")), Some(&Highlight::Quiet));
        assert!(highlights.get(&sq("h1")).is_none());
    }

    #[test]
    fn test_opponent_piece_has_no_highlights() {
        let game = Game::new();
        assert!(move_highlights(&game, sq("e7")).is_empty());
        assert!(move_highlights(&game, sq("e4")).is_empty());
    }

    #[test]
    fn test_checkmate_highlights() {
        let terminal = Terminal::Checkmate {
            mated: Color::White,
            king: sq("e1"),
            checkers: vec![sq("h4")],
        };
        let highlights = checkmate_highlights(&terminal);
        assert_eq!(highlights.get(&sq("e1")), Some(&Highlight::MatedKing));
        assert_eq!(highlights.get(&sq("h4")), Some(&Highlight::Checker));
        assert!(checkmate_highlights(&Terminal::None).is_empty());
    }

    #[test]
    fn test_eval_bar() {
        let even = eval_bar(0);
        assert!(close(even.white, 50.0));
        assert!(close(even.black, 50.0));

        let ahead = eval_bar(300);
        assert!(close(ahead.white, 50.0 + 1f64.tanh() * 50.0));
        assert!(close(ahead.white + ahead.black, 100.0));

        let mated = eval_bar(-chess::MATE_SENTINEL_CP);
        assert!(mated.white >= 0.0 && mated.white < 0.001);
    }

    #[test]
    fn test_square_centres() {
        assert_eq!(square_center(sq("a1"), Color::White), Point { x: 0.5, y: 7.5 });
        assert_eq!(square_center(sq("h8"), Color::White), Point { x: 7.5, y: 0.5 });
        assert_eq!(square_center(sq("a1"), Color::Black), Point { x: 7.5, y: 0.5 });
    }

    #[test]
    fn test_straight_arrow() {
        let arrow = best_move_arrow(sq("e2"), sq("e4"), false, Color::White);
        assert!(arrow.via.is_none());
        assert_eq!(arrow.svg_path(), "M4.5 6.5 L4.5 4.5");
    }

    #[test]
    fn test_knight_arrow_bends_along_longer_axis() {
        // g1f3: one file left, two ranks up. |dx| < |dy| so the elbow is (from.x, to.y).
        let arrow = best_move_arrow(sq("g1"), sq("f3"), true, Color::White);
        let via = arrow.via.unwrap();
        assert_eq!(via, Point { x: 6.5, y: 5.5 });
        assert!(close(arrow.to.x, 5.5 + 0.15));
        assert!(close(arrow.to.y, 5.5));

        // b1d2: two files right, one rank up. Elbow is (to.x, from.y).
        let arrow = best_move_arrow(sq("b1"), sq("d2"), true, Color::White);
        assert_eq!(arrow.via.unwrap(), Point { x: 3.5, y: 7.5 });
        assert!(close(arrow.to.x, 3.5));
        assert!(close(arrow.to.y, 6.5 + 0.15));
    }

    #[test]
    fn test_status_text() {
        let mate = Terminal::Checkmate {
            mated: Color::Black,
            king: sq("e8"),
            checkers: vec![],
        };
        assert_eq!(status_text(&mate, true), "Checkmate! White wins");
        assert_eq!(
            status_text(&Terminal::Draw(DrawReason::Stalemate), false),
            "Draw! (stalemate)"
        );
        assert_eq!(status_text(&Terminal::None, true), "Check!");
        assert_eq!(status_text(&Terminal::None, false), "");
    }
}
