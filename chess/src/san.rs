//! Standard Algebraic Notation.

use cozy_chess::{Board, GameStatus, Move, Piece};

use crate::converters::{file_char, format_piece_upper, format_square, rank_char};
use crate::uci::{is_castling, legal_moves};

/// Format a legal move as SAN ("Nf3", "exd5", "O-O", "e8=Q+", "Qh4#").
///
/// The move must be legal in `board`.
pub fn format_san(board: &Board, mv: Move) -> String {
    let mut san = body(board, mv);

    let mut after = board.clone();
    after.play_unchecked(mv);
    if !after.checkers().is_empty() {
        san.push(if after.status() == GameStatus::Won {
            '#'
        } else {
            '+'
        });
    }

    san
}

fn body(board: &Board, mv: Move) -> String {
    if is_castling(board, mv) {
        return if mv.to.file() as u8 > mv.from.file() as u8 {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        };
    }

    let Some(piece) = board.piece_on(mv.from) else {
        return format_square(mv.to);
    };
    let is_capture = is_capture(board, mv);
    let mut san = String::new();

    if piece == Piece::Pawn {
        if is_capture {
            san.push(file_char(mv.from.file()));
            san.push('x');
        }
        san.push_str(&format_square(mv.to));
        if let Some(promo) = mv.promotion {
            san.push('=');
            san.push(format_piece_upper(promo));
        }
        return san;
    }

    san.push(format_piece_upper(piece));
    san.push_str(&disambiguation(board, mv, piece));
    if is_capture {
        san.push('x');
    }
    san.push_str(&format_square(mv.to));
    san
}

/// Capture test that also covers en passant.
pub fn is_capture(board: &Board, mv: Move) -> bool {
    if is_castling(board, mv) {
        return false;
    }
    if board.color_on(mv.to).is_some() {
        return true;
    }
    board.piece_on(mv.from) == Some(Piece::Pawn) && mv.from.file() != mv.to.file()
}

fn disambiguation(board: &Board, mv: Move, piece: Piece) -> String {
    let rivals: Vec<Move> = legal_moves(board)
        .into_iter()
        .filter(|other| {
            other.to == mv.to && other.from != mv.from && board.piece_on(other.from) == Some(piece)
        })
        .collect();

    if rivals.is_empty() {
        return String::new();
    }

    let shares_file = rivals.iter().any(|o| o.from.file() == mv.from.file());
    let shares_rank = rivals.iter().any(|o| o.from.rank() == mv.from.rank());

    match (shares_file, shares_rank) {
        (false, _) => file_char(mv.from.file()).to_string(),
        (true, false) => rank_char(mv.from.rank()).to_string(),
        (true, true) => format_square(mv.from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uci::parse_uci_move;

    fn san(fen: &str, uci: &str) -> String {
        let board: Board = fen.parse().unwrap();
        let mv = parse_uci_move(&board, uci).unwrap();
        format_san(&board, mv)
    }

    #[test]
    fn test_simple_moves() {
        let start = crate::fen::STANDARD_FEN;
        assert_eq!(san(start, "e2e4"), "e4");
        assert_eq!(san(start, "g1f3"), "Nf3");
    }

    #[test]
    fn test_castling() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        assert_eq!(san(fen, "e1g1"), "O-O");
        assert_eq!(san(fen, "e1c1"), "O-O-O");
    }

    #[test]
    fn test_pawn_capture_and_en_passant() {
        assert_eq!(
            san("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1", "e4d5"),
            "exd5"
        );
        assert_eq!(
            san("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1", "e5d6"),
            "exd6"
        );
    }

    #[test]
    fn test_disambiguation() {
        // Knights on b1 and f1 can both reach d2.
        assert_eq!(san("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1", "b1d2"), "Nbd2");
        // Rooks on a1 and a5 share a file.
        assert_eq!(san("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1", "a1a3"), "R1a3");
    }

    #[test]
    fn test_promotion_and_mate_suffix() {
        assert_eq!(san("8/4P3/8/8/8/8/k7/7K w - - 0 1", "e7e8q"), "e8=Q");
        // Fool's mate.
        assert_eq!(
            san(
                "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2",
                "d8h4"
            ),
            "Qh4#"
        );
    }

    #[test]
    fn test_check_suffix() {
        assert_eq!(san("4k3/8/8/8/8/8/8/R3K3 w - - 0 1", "a1a8"), "Ra8+");
    }
}
