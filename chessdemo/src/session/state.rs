use std::collections::BTreeMap;

use chess::{format_color, format_square, AnalysisScore, Game, GameError, GameMode, MoveRecord};
use cozy_chess::{Color, Move, Piece, Square};
use engine::{EngineEvent, EngineInfo, EngineRole, EngineSession, SessionState};
use tokio::time::Instant;

use super::candidates::{candidate_from_info, white_score, CandidateLine, CandidateView};
use super::commands::SessionError;
use super::snapshot::{AnalysisView, EngineStatus, ModeView, MoveView, SessionSnapshot};
use crate::config::{SearchSettings, MAX_SKILL_LEVEL};
use crate::display::{
    best_move_arrow, checkmate_highlights, eval_bar, move_highlights, status_text,
};
use crate::input::{ClickOutcome, Selection};
use crate::sound::{cues_for, SoundCue, SoundSink};

/// Internal mutable state, owned entirely by the coordinator actor. No locks.
pub(crate) struct CoordinatorState {
    pub game: Game,
    pub mode: GameMode,
    pub orientation: Color,
    pub skill_level: u8,
    pub show_best_move: bool,
    pub settings: SearchSettings,
    pub player: Option<EngineSession>,
    pub analysis: Option<EngineSession>,
    /// FEN the computer's outstanding move request was made for.
    pub player_request: Option<String>,
    /// Candidate lines for the current position, by rank.
    pub candidates: BTreeMap<u8, CandidateLine>,
    /// Score of the most recent top line. Survives position changes so the
    /// bar does not jump while a new search starts.
    pub evaluation: Option<AnalysisScore>,
    pub selection: Selection,
    pub sounds: Box<dyn SoundSink>,
}

impl CoordinatorState {
    pub fn new(
        game: Game,
        mode: GameMode,
        settings: SearchSettings,
        skill_level: u8,
        sounds: Box<dyn SoundSink>,
    ) -> Self {
        let orientation = match mode {
            GameMode::VsComputer { human } => human,
            GameMode::VsPlayer => Color::White,
        };
        Self {
            game,
            mode,
            orientation,
            skill_level: skill_level.min(MAX_SKILL_LEVEL),
            show_best_move: true,
            settings,
            player: None,
            analysis: None,
            player_request: None,
            candidates: BTreeMap::new(),
            evaluation: None,
            selection: Selection::default(),
            sounds,
        }
    }

    /// Build a full snapshot of the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        let terminal = self.game.terminal();
        let in_check = self.game.is_check();

        let mut highlights = match self.selection.selected() {
            Some(sq) if !terminal.is_over() => move_highlights(&self.game, sq),
            _ => Default::default(),
        };
        highlights.extend(checkmate_highlights(&terminal));

        let moves = self
            .game
            .history()
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                entry.last_move.as_ref().map(|record| MoveView {
                    index,
                    color: format_color(record.color).to_string(),
                    uci: record.uci.clone(),
                    san: record.san.clone(),
                    fen_after: record.fen_after.clone(),
                })
            })
            .collect();

        SessionSnapshot {
            fen: self.game.fen().to_string(),
            side_to_move: format_color(self.game.side_to_move()).to_string(),
            mode: match self.mode {
                GameMode::VsComputer { human } => ModeView::VsComputer {
                    human: format_color(human).to_string(),
                },
                GameMode::VsPlayer => ModeView::VsPlayer,
            },
            orientation: format_color(self.orientation).to_string(),
            skill_level: self.skill_level,
            show_best_move: self.show_best_move,
            cursor: self.game.cursor(),
            history_len: self.game.len(),
            moves,
            last_move: self
                .game
                .last_move()
                .map(|m| (format_square(m.from), format_square(m.to))),
            status: status_text(&terminal, in_check),
            in_check,
            game_over: terminal.is_over(),
            selected: self.selection.selected().map(format_square),
            highlights: highlights
                .into_iter()
                .map(|(sq, kind)| (format_square(sq), kind))
                .collect(),
            analysis: self.analysis_view(),
            player_engine: engine_status(self.player.as_ref()),
            analysis_engine: engine_status(self.analysis.as_ref()),
        }
    }

    pub fn analysis_view(&self) -> AnalysisView {
        let evaluation = self.evaluation.unwrap_or(AnalysisScore::Centipawns(0));
        let arrow = self
            .candidates
            .values()
            .next()
            .filter(|_| self.show_best_move)
            .map(|top| {
                best_move_arrow(top.mv.from, arrow_target(top), top.is_knight, self.orientation)
            });

        AnalysisView {
            fen: self.game.fen().to_string(),
            evaluation: evaluation.display(),
            evaluation_cp: evaluation.to_cp(),
            eval_bar: eval_bar(evaluation.to_cp()),
            candidates: self.candidates.values().map(CandidateView::from).collect(),
            arrow_path: arrow.map(|a| a.svg_path()),
            arrow,
        }
    }

    pub fn apply_user_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Piece>,
    ) -> Result<MoveRecord, SessionError> {
        self.selection.clear();
        if self.game.is_game_over() {
            return Err(SessionError::GameOver);
        }
        if !self.mode.human_may_move(self.game.side_to_move()) {
            return Err(SessionError::NotYourTurn);
        }

        let record = self
            .game
            .apply_move(from, to, promotion)
            .map_err(|e| SessionError::IllegalMove(e.to_string()))?;
        tracing::info!(san = %record.san, "Player moved");
        self.after_move(&record);
        Ok(record)
    }

    /// Feed a square click through the selection state machine.
    pub fn click(&mut self, square: Square) -> Result<Option<MoveRecord>, SessionError> {
        match self.selection.click(&self.game, square) {
            ClickOutcome::Move {
                from,
                to,
                promotion,
            } => self.apply_user_move(from, to, promotion).map(Some),
            _ => Ok(None),
        }
    }

    pub fn step_back(&mut self) -> Result<(), SessionError> {
        self.game.step_back().map_err(|_| SessionError::NothingToUndo)?;
        self.on_position_changed();
        Ok(())
    }

    pub fn step_forward(&mut self) -> Result<(), SessionError> {
        self.game
            .step_forward()
            .map_err(|_| SessionError::NothingToRedo)?;
        self.on_position_changed();
        Ok(())
    }

    pub fn jump_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.game.jump_to(index).map_err(|e| match e {
            GameError::OutOfRange { index, .. } => SessionError::OutOfRange(index),
            other => SessionError::Internal(other.to_string()),
        })?;
        self.on_position_changed();
        Ok(())
    }

    pub fn new_game(&mut self, mode: Option<GameMode>) {
        if let Some(mode) = mode {
            self.mode = mode;
            if let GameMode::VsComputer { human } = mode {
                self.orientation = human;
            }
        }
        self.game.reset();
        tracing::info!(mode = ?self.mode, "New game");
        self.sounds.play(SoundCue::Start);
        self.restart();
    }

    pub fn load_fen(&mut self, fen: &str) -> Result<(), SessionError> {
        self.game
            .load_fen(fen)
            .map_err(|e| SessionError::InvalidFen(e.to_string()))?;
        tracing::info!(fen, "Loaded position");
        self.restart();
        Ok(())
    }

    pub fn set_skill_level(&mut self, level: u8) -> Result<(), SessionError> {
        if level > MAX_SKILL_LEVEL {
            return Err(SessionError::InvalidSkillLevel(level));
        }
        self.skill_level = level;
        for session in [self.player.as_mut(), self.analysis.as_mut()].into_iter().flatten() {
            if let Err(e) = session.configure("Skill Level", &level.to_string()) {
                tracing::debug!(role = %session.role(), "Skill level not applied yet: {}", e);
            }
        }
        self.maybe_analyze();
        Ok(())
    }

    pub fn flip_board(&mut self) {
        self.orientation = !self.orientation;
    }

    /// Engine handshake finished: push options, then resume the flow.
    pub fn on_engine_ready(&mut self, role: EngineRole) {
        let skill = self.skill_level.to_string();
        let multipv = self.settings.multipv.to_string();
        let session = match role {
            EngineRole::Player => self.player.as_mut(),
            EngineRole::Analysis => self.analysis.as_mut(),
        };
        if let Some(session) = session {
            let mut result = session.configure("Skill Level", &skill);
            if role == EngineRole::Analysis {
                result = result.and_then(|_| session.configure("MultiPV", &multipv));
            }
            if let Err(e) = result {
                tracing::warn!(role = %role, "Failed to configure engine: {}", e);
            }
        }
        self.maybe_analyze();
        self.maybe_trigger_engine();
    }

    /// Apply the computer's move if it still answers the current position.
    pub fn apply_engine_move(
        &mut self,
        fen: &str,
        mv: Option<Move>,
    ) -> Result<Option<MoveRecord>, SessionError> {
        let wanted = self.player_request.take();
        if wanted.as_deref() != Some(fen) || fen != self.game.fen() {
            tracing::debug!(fen, "Dropping stale best move");
            self.maybe_trigger_engine();
            return Ok(None);
        }
        let Some(mv) = mv else {
            tracing::warn!(fen, "Engine reported no move");
            return Ok(None);
        };

        let record = self
            .game
            .make_move(mv)
            .map_err(|e| SessionError::IllegalMove(e.to_string()))?;
        tracing::info!(san = %record.san, "Computer moved");
        self.after_move(&record);
        Ok(Some(record))
    }

    /// Merge an analysis line. Returns whether the analysis view changed.
    pub fn accept_info(&mut self, fen: &str, info: &EngineInfo) -> bool {
        if fen != self.game.fen() || self.game.is_game_over() {
            tracing::debug!(fen, "Dropping stale analysis");
            return false;
        }
        let Some(score) = info.score else {
            return false;
        };

        let board = self.game.position();
        if info.rank() == 1 {
            self.evaluation = Some(white_score(board, score));
        }
        match candidate_from_info(board, info) {
            Some(line) => {
                self.candidates.insert(line.rank, line);
            }
            None if !info.pv.is_empty() => {
                tracing::debug!(rank = info.rank(), "Discarding candidate with illegal move");
            }
            None => {}
        }
        true
    }

    /// The engine for `role` failed its handshake or exited.
    pub fn on_engine_lost(&mut self, role: EngineRole, event: &EngineEvent) {
        tracing::error!(role = %role, ?event, "Engine unavailable");
        if role == EngineRole::Player {
            self.player_request = None;
        }
    }

    /// Enforce engine deadlines. Returns the roles whose handshake failed.
    pub fn check_timeouts(&mut self, now: Instant) -> Vec<EngineRole> {
        let mut failed = Vec::new();
        for session in [self.player.as_mut(), self.analysis.as_mut()].into_iter().flatten() {
            if let Some(EngineEvent::HandshakeFailed) = session.check_timeouts(now) {
                failed.push(session.role());
            }
        }
        if failed.contains(&EngineRole::Player) {
            self.player_request = None;
        }
        // A forced stop may have freed the player session.
        self.maybe_trigger_engine();
        failed
    }

    pub fn shutdown_engines(&mut self) {
        for session in [self.player.as_mut(), self.analysis.as_mut()].into_iter().flatten() {
            session.terminate();
        }
        self.player_request = None;
    }

    fn after_move(&mut self, record: &MoveRecord) {
        for cue in cues_for(record) {
            self.sounds.play(cue);
        }
        self.on_position_changed();
    }

    /// Fresh history: forget the computer's request and any evaluation.
    fn restart(&mut self) {
        self.player_request = None;
        if let Some(player) = self.player.as_mut() {
            player.stop();
        }
        self.evaluation = None;
        self.on_position_changed();
    }

    pub fn on_position_changed(&mut self) {
        self.selection.clear();
        self.candidates.clear();
        if self.game.is_game_over() {
            self.evaluation = Some(AnalysisScore::Centipawns(0));
        }
        self.maybe_analyze();
        self.maybe_trigger_engine();
    }

    /// Analyse the current position when it is the live end of the game.
    fn maybe_analyze(&mut self) {
        let live = self.game.at_end() && !self.game.is_game_over();
        let fen = self.game.fen().to_string();
        let think_ms = self.settings.analysis_movetime_ms;
        let Some(analysis) = self.analysis.as_mut() else {
            return;
        };
        if !analysis.is_ready() {
            return;
        }
        if !live {
            analysis.cancel();
            return;
        }
        if let Err(e) = analysis.request_analysis(&fen, think_ms) {
            tracing::warn!("Failed to start analysis: {}", e);
        }
    }

    /// Ask the player engine for a move when it is the computer's turn.
    fn maybe_trigger_engine(&mut self) {
        if !self.should_trigger_engine() {
            return;
        }
        let fen = self.game.fen().to_string();
        let think_ms = self.settings.player_movetime_ms;
        let Some(player) = self.player.as_mut() else {
            return;
        };
        match player.request_best_move(&fen, think_ms) {
            Ok(()) => self.player_request = Some(fen),
            Err(e) => tracing::warn!("Failed to request computer move: {}", e),
        }
    }

    pub fn should_trigger_engine(&self) -> bool {
        if self.player_request.is_some() {
            return false;
        }
        if self.mode.engine_side() != Some(self.game.side_to_move()) {
            return false;
        }
        if !self.game.at_end() || self.game.is_game_over() {
            return false;
        }
        self.player.as_ref().is_some_and(|p| p.is_idle())
    }
}

/// King destination for castling lines, the move's own target otherwise.
fn arrow_target(line: &CandidateLine) -> Square {
    line.uci
        .get(2..4)
        .and_then(chess::parse_square)
        .unwrap_or(line.mv.to)
}

fn engine_status(session: Option<&EngineSession>) -> EngineStatus {
    match session.map(|s| s.state()) {
        None | Some(SessionState::Terminated) => EngineStatus::Unavailable,
        Some(SessionState::Starting) => EngineStatus::Loading,
        Some(SessionState::Ready | SessionState::Idle) => EngineStatus::Ready,
        Some(SessionState::Active) => EngineStatus::Thinking,
    }
}
