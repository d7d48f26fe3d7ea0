pub mod analysis;
pub mod converters;
pub mod fen;
pub mod game;
pub mod san;
pub mod uci;

pub use analysis::{AnalysisScore, MATE_SENTINEL_CP};
pub use converters::*;
pub use fen::{format_fen, parse_fen, FenError, STANDARD_FEN};
pub use game::{DrawReason, Game, GameError, GameMode, HistoryEntry, MoveRecord, Terminal};
pub use san::{format_san, is_capture};
pub use uci::{convert_uci_castling_to_cozy, format_uci_move, resolve_move};
