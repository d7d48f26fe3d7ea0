//! UCI (Universal Chess Interface) move utilities

use cozy_chess::{Board, File, Move, Piece, Rank, Square};

use crate::converters::{format_piece, format_square};
#[cfg(test)]
use crate::converters::{parse_promotion, parse_square};

/// Convert UCI castling notation to cozy_chess notation
///
/// UCI uses standard notation (king moves 2 squares): e1g1, e1c1, e8g8, e8c8
/// cozy_chess uses king-to-rook notation: e1h1, e1a1, e8h8, e8a8
///
/// Returns the converted move only when it is legal in the given position.
pub fn convert_uci_castling_to_cozy(mv: Move, legal_moves: &[Move]) -> Move {
    let is_rank_1_or_8 = matches!(mv.from.rank(), Rank::First | Rank::Eighth);
    let is_e_file = matches!(mv.from.file(), File::E);
    let is_g_or_c_file = matches!(mv.to.file(), File::G | File::C);

    if is_rank_1_or_8 && is_e_file && is_g_or_c_file && mv.promotion.is_none() {
        let rook_file = if mv.to.file() == File::G {
            File::H
        } else {
            File::A
        };
        let converted = Move {
            from: mv.from,
            to: Square::new(rook_file, mv.from.rank()),
            promotion: None,
        };
        if legal_moves.contains(&converted) {
            return converted;
        }
    }

    mv
}

/// Resolve a coordinate move against a position.
///
/// Accepts both UCI castling (`e1g1`) and cozy_chess castling (`e1h1`).
/// Returns `None` when the resulting move is not legal.
pub fn resolve_move(board: &Board, mv: Move) -> Option<Move> {
    let legal = legal_moves(board);
    let converted = convert_uci_castling_to_cozy(mv, &legal);
    legal.contains(&converted).then_some(converted)
}

/// Parse and resolve a UCI move string ("e2e4", "e7e8q").
#[cfg(test)]
pub(crate) fn parse_uci_move(board: &Board, s: &str) -> Option<Move> {
    let from = parse_square(s.get(0..2)?)?;
    let to = parse_square(s.get(2..4)?)?;
    let promotion = match s.get(4..) {
        None | Some("") => None,
        Some(p) if p.len() == 1 => Some(parse_promotion(p.chars().next()?)?),
        Some(_) => return None,
    };
    resolve_move(
        board,
        Move {
            from,
            to,
            promotion,
        },
    )
}

/// Format a move in UCI notation (e.g., "e2e4", "e7e8q")
///
/// The board is needed to turn cozy_chess castling (king takes own rook)
/// back into the standard two-square king move.
pub fn format_uci_move(board: &Board, mv: Move) -> String {
    let to = if is_castling(board, mv) {
        let file = if mv.to.file() as u8 > mv.from.file() as u8 {
            File::G
        } else {
            File::C
        };
        Square::new(file, mv.from.rank())
    } else {
        mv.to
    };

    let mut s = format!("{}{}", format_square(mv.from), format_square(to));
    if let Some(promo) = mv.promotion {
        s.push(format_piece(promo));
    }
    s
}

/// True when `mv` is a castling move in cozy_chess representation.
pub fn is_castling(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::King)
        && board.color_on(mv.to).is_some()
        && board.color_on(mv.to) == board.color_on(mv.from)
}

pub(crate) fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|mvs| {
        moves.extend(mvs);
        false
    });
    moves
}

#[cfg(test)]
mod tests {
    use super::*;

    fn castling_board() -> Board {
        "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap()
    }

    #[test]
    fn test_format_uci_move() {
        let board = Board::default();
        let mv = Move {
            from: Square::new(File::E, Rank::Second),
            to: Square::new(File::E, Rank::Fourth),
            promotion: None,
        };
        assert_eq!(format_uci_move(&board, mv), "e2e4");
    }

    #[test]
    fn test_castling_round_trips_through_uci_text() {
        let board = castling_board();
        let mv = parse_uci_move(&board, "e1g1").unwrap();
        assert_eq!(mv.to, Square::new(File::H, Rank::First));
        assert_eq!(format_uci_move(&board, mv), "e1g1");

        let long = parse_uci_move(&board, "e1c1").unwrap();
        assert_eq!(long.to, Square::new(File::A, Rank::First));
        assert_eq!(format_uci_move(&board, long), "e1c1");
    }

    #[test]
    fn test_promotion_parsing() {
        let board: Board = "8/4P3/8/8/8/8/k7/7K w - - 0 1".parse().unwrap();
        let mv = parse_uci_move(&board, "e7e8q").unwrap();
        assert_eq!(mv.promotion, Some(Piece::Queen));
        assert!(parse_uci_move(&board, "e7e8").is_none());
        assert!(parse_uci_move(&board, "e7e8x").is_none());
    }

    #[test]
    fn test_illegal_move_is_not_resolved() {
        let board = Board::default();
        assert!(parse_uci_move(&board, "e2e5").is_none());
        assert!(parse_uci_move(&board, "zz").is_none());
    }
}
