use cozy_chess::Board;

/// FEN of the standard starting position.
pub const STANDARD_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Parse a FEN string into a Board
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    let fields = fen.split_whitespace().count();
    if fields == 0 {
        return Err(FenError::Empty);
    }
    if fields != 6 {
        return Err(FenError::FieldCount(fields));
    }

    fen.trim()
        .parse()
        .map_err(|_| FenError::InvalidPosition(fen.to_string()))
}

/// Format a Board as a FEN string
pub fn format_fen(board: &Board) -> String {
    board.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("Empty FEN")]
    Empty,
    #[error("Expected 6 FEN fields, found {0}")]
    FieldCount(usize),
    #[error("Invalid position: {0}")]
    InvalidPosition(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_fen_round_trip() {
        let board = parse_fen(STANDARD_FEN).unwrap();
        assert_eq!(format_fen(&board), STANDARD_FEN);
    }

    #[test]
    fn test_rejects_truncated_fen() {
        assert!(matches!(parse_fen(""), Err(FenError::Empty)));
        assert!(matches!(
            parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w"),
            Err(FenError::FieldCount(2))
        ));
    }

    #[test]
    fn test_rejects_impossible_position() {
        // Two white kings.
        assert!(matches!(
            parse_fen("8/8/8/8/8/8/8/KK5k w - - 0 1"),
            Err(FenError::InvalidPosition(_))
        ));
    }
}
