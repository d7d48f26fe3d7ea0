use std::collections::BTreeMap;

use serde::Serialize;

use super::candidates::CandidateView;
use crate::display::{Arrow, EvalBar, Highlight};

/// Complete, immutable snapshot of coordinator state.
/// Sent to subscribers on every state change and on subscribe.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub fen: String,
    pub side_to_move: String,
    pub mode: ModeView,
    pub orientation: String,
    pub skill_level: u8,
    pub show_best_move: bool,
    pub cursor: usize,
    pub history_len: usize,
    /// Every recorded move, including those after the cursor.
    pub moves: Vec<MoveView>,
    pub last_move: Option<(String, String)>,
    pub status: String,
    pub in_check: bool,
    pub game_over: bool,
    pub selected: Option<String>,
    /// Square name to highlight kind.
    pub highlights: BTreeMap<String, Highlight>,
    pub analysis: AnalysisView,
    pub player_engine: EngineStatus,
    pub analysis_engine: EngineStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModeView {
    VsComputer { human: String },
    VsPlayer,
}

/// A single move in the history.
#[derive(Debug, Clone, Serialize)]
pub struct MoveView {
    /// History index of the position this move produced.
    pub index: usize,
    pub color: String,
    pub uci: String,
    pub san: String,
    pub fen_after: String,
}

/// Evaluation and candidate lines for the current position.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisView {
    pub fen: String,
    /// Score text of the top line, White-relative ("0.3", "+M2").
    pub evaluation: String,
    pub evaluation_cp: i32,
    pub eval_bar: EvalBar,
    pub candidates: Vec<CandidateView>,
    /// Top candidate as an arrow, when best-move display is on.
    pub arrow: Option<Arrow>,
    pub arrow_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStatus {
    Loading,
    Ready,
    Thinking,
    Unavailable,
}
