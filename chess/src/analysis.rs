//! Engine evaluation scores.

use cozy_chess::Color;
use serde::{Deserialize, Serialize};

/// Centipawn value every mate score saturates to.
///
/// Far outside any realistic centipawn evaluation so mate and material
/// scores can share one numeric path.
pub const MATE_SENTINEL_CP: i32 = 10_000;

/// Engine evaluation score.
///
/// Centipawns: positive = the side the score is relative to is better.
/// Mate: positive N = that side mates in N moves,
/// negative N = that side gets mated in N moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisScore {
    Centipawns(i32),
    Mate(i32),
}

impl AnalysisScore {
    /// Convert a score reported relative to the side to move into a
    /// White-relative score.
    pub fn white_relative(self, side_to_move: Color) -> Self {
        match side_to_move {
            Color::White => self,
            Color::Black => self.negate(),
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Centipawns(cp) => format!("{:.1}", *cp as f64 / 100.0),
            Self::Mate(m) => {
                if *m > 0 {
                    format!("+M{}", m)
                } else {
                    format!("-M{}", m.unsigned_abs())
                }
            }
        }
    }

    /// Convert to centipawns. Mate scores saturate at [`MATE_SENTINEL_CP`].
    pub fn to_cp(&self) -> i32 {
        match self {
            Self::Centipawns(cp) => *cp,
            Self::Mate(m) => {
                if *m > 0 {
                    MATE_SENTINEL_CP
                } else {
                    -MATE_SENTINEL_CP
                }
            }
        }
    }

    /// Negate the score (flip perspective).
    pub fn negate(&self) -> Self {
        match self {
            Self::Centipawns(cp) => Self::Centipawns(cp.saturating_neg()),
            Self::Mate(m) => Self::Mate(m.saturating_neg()),
        }
    }
}

impl std::fmt::Display for AnalysisScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_to_move_flips_sign() {
        let score = AnalysisScore::Centipawns(50).white_relative(Color::Black);
        assert_eq!(score.to_cp(), -50);
        let score = AnalysisScore::Centipawns(50).white_relative(Color::White);
        assert_eq!(score.to_cp(), 50);
    }

    #[test]
    fn test_mate_sentinel() {
        assert_eq!(AnalysisScore::Mate(3).to_cp(), MATE_SENTINEL_CP);
        assert_eq!(AnalysisScore::Mate(-1).to_cp(), -MATE_SENTINEL_CP);
        assert_eq!(AnalysisScore::Mate(0).to_cp(), -MATE_SENTINEL_CP);
        assert!(MATE_SENTINEL_CP > 9_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(AnalysisScore::Centipawns(50).display(), "0.5");
        assert_eq!(AnalysisScore::Centipawns(-123).display(), "-1.2");
        assert_eq!(AnalysisScore::Mate(3).display(), "+M3");
        assert_eq!(AnalysisScore::Mate(-2).display(), "-M2");
    }

    #[test]
    fn test_extreme_values_saturate() {
        assert_eq!(
            AnalysisScore::Centipawns(i32::MIN).negate(),
            AnalysisScore::Centipawns(i32::MAX)
        );
        assert_eq!(AnalysisScore::Mate(i32::MIN).negate(), AnalysisScore::Mate(i32::MAX));
        assert_eq!(AnalysisScore::Mate(i32::MIN).display(), "-M2147483648");
    }
}
