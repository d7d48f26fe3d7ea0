//! Plain-text rendering of snapshots.

use std::fmt::Write;

use chess::{parse_color, parse_fen};
use chessdemo::display::{EvalBar, Highlight};
use chessdemo::session::{AnalysisView, EngineStatus, ModeView};
use chessdemo::SessionSnapshot;
use cozy_chess::{Color, File, Rank, Square};

/// Width of the evaluation bar in characters.
const BAR_WIDTH: usize = 32;

/// Number of candidate lines printed under the board.
const SHOWN_CANDIDATES: usize = 3;

pub fn board(snapshot: &SessionSnapshot) -> String {
    let Ok(board) = parse_fen(&snapshot.fen) else {
        return format!("(unreadable position: {})\n", snapshot.fen);
    };
    let orientation = parse_color(&snapshot.orientation).unwrap_or(Color::White);

    let ranks: Vec<Rank> = match orientation {
        Color::White => Rank::ALL.iter().rev().copied().collect(),
        Color::Black => Rank::ALL.to_vec(),
    };
    let files: Vec<File> = match orientation {
        Color::White => File::ALL.to_vec(),
        Color::Black => File::ALL.iter().rev().copied().collect(),
    };

    let mut out = String::new();
    for &rank in &ranks {
        let _ = write!(out, "{} ", chess::rank_char(rank));
        for &file in &files {
            let sq = Square::new(file, rank);
            let piece = match (board.piece_on(sq), board.color_on(sq)) {
                (Some(piece), Some(Color::White)) => chess::format_piece_upper(piece),
                (Some(piece), _) => chess::format_piece(piece),
                (None, _) => '.',
            };
            let highlight = snapshot.highlights.get(&chess::format_square(sq)).copied();
            out.push_str(&cell(piece, highlight));
        }
        out.push('\n');
    }
    out.push_str("  ");
    for &file in &files {
        let _ = write!(out, " {} ", chess::file_char(file));
    }
    out.push('\n');
    out
}

fn cell(piece: char, highlight: Option<Highlight>) -> String {
    match highlight {
        None => format!(" {} ", piece),
        Some(Highlight::Selected) => format!("({})", piece),
        Some(Highlight::Quiet) => " * ".to_string(),
        Some(Highlight::Capture) => format!("[{}]", piece),
        Some(Highlight::MatedKing) => format!("#{}#", piece),
        Some(Highlight::Checker) => format!("+{}+", piece),
    }
}

pub fn eval_bar(bar: &EvalBar) -> String {
    let white = ((bar.white / 100.0) * BAR_WIDTH as f64).round() as usize;
    let white = white.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(white), "-".repeat(BAR_WIDTH - white))
}

/// One-line summary of the analysis.
pub fn analysis_line(analysis: &AnalysisView) -> String {
    let mut line = format!("{} {}", eval_bar(&analysis.eval_bar), analysis.evaluation);
    for candidate in analysis.candidates.iter().take(SHOWN_CANDIDATES) {
        let _ = write!(line, "  {}. {} ({})", candidate.rank, candidate.san, candidate.score);
    }
    line
}

fn status_label(status: EngineStatus) -> &'static str {
    match status {
        EngineStatus::Loading => "loading",
        EngineStatus::Ready => "ready",
        EngineStatus::Thinking => "thinking",
        EngineStatus::Unavailable => "unavailable",
    }
}

/// Move list as numbered SAN pairs, the move under the cursor bracketed.
pub fn move_list(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    for mv in &snapshot.moves {
        if mv.color == "white" {
            let _ = write!(out, "{}. ", (mv.index + 1) / 2);
        } else if out.is_empty() {
            let _ = write!(out, "{}... ", mv.index / 2);
        }
        if mv.index == snapshot.cursor {
            let _ = write!(out, "[{}] ", mv.san);
        } else {
            let _ = write!(out, "{} ", mv.san);
        }
    }
    out.trim_end().to_string()
}

pub fn snapshot(snapshot: &SessionSnapshot) -> String {
    let mut out = board(snapshot);
    let mode = match &snapshot.mode {
        ModeView::VsComputer { human } => format!("vs computer, you play {}", human),
        ModeView::VsPlayer => "two players".to_string(),
    };
    let _ = writeln!(
        out,
        "{} to move | {} | skill {} | engines: player {}, analysis {}",
        snapshot.side_to_move,
        mode,
        snapshot.skill_level,
        status_label(snapshot.player_engine),
        status_label(snapshot.analysis_engine),
    );
    if !snapshot.status.is_empty() {
        let _ = writeln!(out, "{}", snapshot.status);
    }
    let moves = move_list(snapshot);
    if !moves.is_empty() {
        let _ = writeln!(
            out,
            "moves ({}/{}): {}",
            snapshot.cursor,
            snapshot.history_len - 1,
            moves
        );
    }
    let _ = writeln!(out, "{}", analysis_line(&snapshot.analysis));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chessdemo::display;

    #[test]
    fn test_cells() {
        assert_eq!(cell('P', None), " P ");
        assert_eq!(cell('N', Some(Highlight::Selected)), "(N)");
        assert_eq!(cell('.', Some(Highlight::Quiet)), " * ");
        assert_eq!(cell('p', Some(Highlight::Capture)), "[p]");
    }

    #[test]
    fn test_eval_bar_text() {
        let even = eval_bar(&display::eval_bar(0));
        assert_eq!(even.len(), BAR_WIDTH + 2);
        assert_eq!(even.matches('#').count(), BAR_WIDTH / 2);

        let lost = eval_bar(&display::eval_bar(-chess::MATE_SENTINEL_CP));
        assert_eq!(lost.matches('#').count(), 0);
    }
}
