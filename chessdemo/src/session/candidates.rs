//! Analysis lines turned into displayable candidates.

use chess::{format_san, resolve_move, AnalysisScore};
use cozy_chess::{Board, Move, Piece};
use engine::{EngineInfo, Score};
use serde::Serialize;

/// One ranked analysis line for the position it was computed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLine {
    pub rank: u8,
    /// White-relative score.
    pub score: AnalysisScore,
    pub mv: Move,
    /// First move of the line in UCI notation.
    pub uci: String,
    pub san: String,
    pub is_knight: bool,
    pub depth: Option<u8>,
}

/// Serializable view of a candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateView {
    pub rank: u8,
    pub uci: String,
    pub san: String,
    pub score: String,
    pub cp: i32,
    pub depth: Option<u8>,
    pub is_knight: bool,
}

impl From<&CandidateLine> for CandidateView {
    fn from(line: &CandidateLine) -> Self {
        Self {
            rank: line.rank,
            uci: line.uci.clone(),
            san: line.san.clone(),
            score: line.score.display(),
            cp: line.score.to_cp(),
            depth: line.depth,
            is_knight: line.is_knight,
        }
    }
}

/// White-relative score of an info line for `board`.
pub fn white_score(board: &Board, score: Score) -> AnalysisScore {
    let relative = match score {
        Score::Centipawns(cp) => AnalysisScore::Centipawns(cp),
        Score::Mate(m) => AnalysisScore::Mate(m),
    };
    relative.white_relative(board.side_to_move())
}

/// Build a candidate by replaying the line's first move on a copy of
/// `board`. Lines without a score or whose first move is not legal here
/// yield `None`.
pub fn candidate_from_info(board: &Board, info: &EngineInfo) -> Option<CandidateLine> {
    let score = white_score(board, info.score?);
    let first = *info.pv.first()?;
    let mv = resolve_move(board, first)?;

    Some(CandidateLine {
        rank: info.rank(),
        score,
        mv,
        uci: chess::format_uci_move(board, mv),
        san: format_san(board, mv),
        is_knight: board.piece_on(mv.from) == Some(Piece::Knight),
        depth: info.depth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::uci::{parse_uci_message, UciMessage};

    fn info(line: &str) -> EngineInfo {
        match parse_uci_message(line).unwrap() {
            UciMessage::Info(info) => info,
            other => panic!("not an info line: {:?}", other),
        }
    }

    #[test]
    fn test_candidate_from_legal_line() {
        let board = Board::default();
        let line = candidate_from_info(
            &board,
            &info("info depth 18 multipv 2 score cp 25 pv g1f3 d7d5"),
        )
        .unwrap();
        assert_eq!(line.rank, 2);
        assert_eq!(line.san, "Nf3");
        assert_eq!(line.uci, "g1f3");
        assert!(line.is_knight);
        assert_eq!(line.score, AnalysisScore::Centipawns(25));
        assert_eq!(line.depth, Some(18));
    }

    #[test]
    fn test_black_to_move_score_is_negated() {
        let board: Board = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
            .parse()
            .unwrap();
        let line = candidate_from_info(&board, &info("info depth 10 score cp 50 pv e7e5")).unwrap();
        assert_eq!(line.score.to_cp(), -50);
        assert_eq!(CandidateView::from(&line).score, "-0.5");
    }

    #[test]
    fn test_illegal_first_move_is_discarded() {
        let board = Board::default();
        assert!(candidate_from_info(&board, &info("info depth 5 score cp 10 pv e2e5")).is_none());
        assert!(candidate_from_info(&board, &info("info depth 5 score cp 10")).is_none());
        assert!(candidate_from_info(&board, &info("info depth 5 pv e2e4")).is_none());
    }

    #[test]
    fn test_malformed_first_move_is_discarded() {
        let board = Board::default();
        let line = info("info depth 5 multipv 1 score cp 10 pv e2e9 e2e4");
        assert!(candidate_from_info(&board, &line).is_none());
    }

    #[test]
    fn test_extreme_scores_do_not_overflow() {
        let board: Board = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
            .parse()
            .unwrap();
        assert_eq!(
            white_score(&board, Score::Centipawns(i32::MIN)),
            AnalysisScore::Centipawns(i32::MAX)
        );
        assert_eq!(
            white_score(&board, Score::Mate(i32::MIN)).to_cp(),
            chess::MATE_SENTINEL_CP
        );
    }

    #[test]
    fn test_castling_line() {
        let board: Board = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        let line =
            candidate_from_info(&board, &info("info depth 8 score mate 2 pv e1g1")).unwrap();
        assert_eq!(line.san, "O-O");
        assert_eq!(line.uci, "e1g1");
        assert_eq!(line.score.to_cp(), chess::MATE_SENTINEL_CP);
    }
}
