use cozy_chess::{Board, Color, Move, Piece, Rank, Square};
use serde::{Deserialize, Serialize};

use crate::converters::format_uci_square_pair;
use crate::fen::{format_fen, parse_fen, FenError};
use crate::san::{format_san, is_capture};
use crate::uci::{format_uci_move, is_castling, legal_moves, resolve_move};

/// Game state with a linear, time-travelling history.
///
/// `history[0]` is the starting position and every later entry is reachable
/// from its predecessor by exactly one legal move. The cursor always points
/// at a recorded entry; the position shown to the player is the one under
/// the cursor.
#[derive(Debug, Clone)]
pub struct Game {
    history: Vec<HistoryEntry>,
    cursor: usize,
}

/// One position in the history, plus the move that produced it.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub board: Board,
    pub fen: String,
    pub last_move: Option<MoveRecord>,
}

/// Result of applying a move. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub mv: Move,
    /// Standard UCI text of the move (castling as `e1g1`).
    pub uci: String,
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub color: Color,
    pub captured: Option<Piece>,
    pub promotion: Option<Piece>,
    pub san: String,
    pub fen_after: String,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_draw: bool,
}

/// Who controls which side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    VsComputer { human: Color },
    VsPlayer,
}

impl GameMode {
    /// Side played by the engine, if any.
    pub fn engine_side(&self) -> Option<Color> {
        match self {
            Self::VsComputer { human } => Some(!*human),
            Self::VsPlayer => None,
        }
    }

    pub fn human_may_move(&self, side: Color) -> bool {
        self.engine_side() != Some(side)
    }
}

impl Default for GameMode {
    fn default() -> Self {
        Self::VsComputer {
            human: Color::White,
        }
    }
}

/// End-of-game state of the position under the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal {
    None,
    Checkmate {
        mated: Color,
        king: Square,
        checkers: Vec<Square>,
    },
    Draw(DrawReason),
}

impl Terminal {
    pub fn is_over(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn winner(&self) -> Option<Color> {
        match self {
            Self::Checkmate { mated, .. } => Some(!*mated),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawReason {
    Stalemate,
    FiftyMoveRule,
    InsufficientMaterial,
    ThreefoldRepetition,
}

impl std::fmt::Display for DrawReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Stalemate => "stalemate",
            Self::FiftyMoveRule => "fifty-move rule",
            Self::InsufficientMaterial => "insufficient material",
            Self::ThreefoldRepetition => "threefold repetition",
        };
        f.write_str(text)
    }
}

impl Game {
    /// Create a new game from the standard starting position
    pub fn new() -> Self {
        Self::from_board(Board::default())
    }

    /// Create a game from a FEN string
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        Ok(Self::from_board(parse_fen(fen)?))
    }

    fn from_board(board: Board) -> Self {
        let fen = format_fen(&board);
        Self {
            history: vec![HistoryEntry {
                board,
                fen,
                last_move: None,
            }],
            cursor: 0,
        }
    }

    /// Back to the standard start: history = [start], cursor = 0.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Start a fresh history from a FEN. On error nothing changes.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), GameError> {
        *self = Self::from_fen(fen)?;
        Ok(())
    }

    /// Get the current board position
    pub fn position(&self) -> &Board {
        &self.history[self.cursor].board
    }

    /// FEN of the current position.
    pub fn fen(&self) -> &str {
        &self.history[self.cursor].fen
    }

    pub fn side_to_move(&self) -> Color {
        self.position().side_to_move()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Never true: the starting position is always recorded.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn at_end(&self) -> bool {
        self.cursor + 1 == self.history.len()
    }

    /// Move that produced the current position.
    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history[self.cursor].last_move.as_ref()
    }

    /// Moves played up to the cursor.
    pub fn moves(&self) -> impl Iterator<Item = &MoveRecord> {
        self.history[..=self.cursor]
            .iter()
            .filter_map(|entry| entry.last_move.as_ref())
    }

    /// Apply a move given as squares plus an optional promotion piece.
    pub fn apply_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Piece>,
    ) -> Result<MoveRecord, GameError> {
        self.make_move(Move {
            from,
            to,
            promotion,
        })
    }

    /// Apply a move to the current position.
    ///
    /// Castling may be given in UCI form (`e1g1`) or cozy_chess form (`e1h1`).
    /// Positions after the cursor are discarded before the new one is
    /// appended. An illegal move changes nothing.
    pub fn make_move(&mut self, mv: Move) -> Result<MoveRecord, GameError> {
        let board = self.position();
        let resolved = resolve_move(board, mv)
            .ok_or_else(|| GameError::IllegalMove(format_uci_square_pair(mv)))?;

        let piece = board
            .piece_on(resolved.from)
            .ok_or_else(|| GameError::IllegalMove(format_uci_square_pair(mv)))?;
        let color = board.side_to_move();
        let captured = if is_castling(board, resolved) {
            None
        } else if is_capture(board, resolved) {
            Some(board.piece_on(resolved.to).unwrap_or(Piece::Pawn))
        } else {
            None
        };
        let san = format_san(board, resolved);
        let uci = format_uci_move(board, resolved);

        let mut next = board.clone();
        next.play_unchecked(resolved);
        let fen_after = format_fen(&next);

        let record = MoveRecord {
            mv: resolved,
            uci,
            from: resolved.from,
            to: resolved.to,
            piece,
            color,
            captured,
            promotion: resolved.promotion,
            san,
            fen_after: fen_after.clone(),
            is_check: !next.checkers().is_empty(),
            is_checkmate: false,
            is_draw: false,
        };

        self.history.truncate(self.cursor + 1);
        self.history.push(HistoryEntry {
            board: next,
            fen: fen_after,
            last_move: Some(record),
        });
        self.cursor += 1;

        let terminal = self.terminal();
        let entry = &mut self.history[self.cursor];
        let record = entry
            .last_move
            .as_mut()
            .ok_or_else(|| GameError::IllegalMove(format_uci_square_pair(mv)))?;
        record.is_checkmate = matches!(terminal, Terminal::Checkmate { .. });
        record.is_draw = matches!(terminal, Terminal::Draw(_));

        Ok(record.clone())
    }

    /// Move the cursor one position back.
    pub fn step_back(&mut self) -> Result<(), GameError> {
        if self.cursor == 0 {
            return Err(GameError::NothingToUndo);
        }
        self.cursor -= 1;
        Ok(())
    }

    /// Move the cursor one position forward.
    pub fn step_forward(&mut self) -> Result<(), GameError> {
        if self.at_end() {
            return Err(GameError::NothingToRedo);
        }
        self.cursor += 1;
        Ok(())
    }

    /// Put the cursor on any recorded position.
    pub fn jump_to(&mut self, index: usize) -> Result<(), GameError> {
        if index >= self.history.len() {
            return Err(GameError::OutOfRange {
                index,
                len: self.history.len(),
            });
        }
        self.cursor = index;
        Ok(())
    }

    /// Get all legal moves for the current position
    pub fn legal_moves(&self) -> Vec<Move> {
        legal_moves(self.position())
    }

    /// Legal moves of the piece standing on `from`.
    pub fn legal_moves_from(&self, from: Square) -> Vec<Move> {
        let mut moves = Vec::new();
        self.position()
            .generate_moves_for(from.bitboard(), |mvs| {
                moves.extend(mvs);
                false
            });
        moves
    }

    pub fn is_check(&self) -> bool {
        !self.position().checkers().is_empty()
    }

    /// Checkmate, draw or nothing for the position under the cursor.
    pub fn terminal(&self) -> Terminal {
        let board = self.position();
        let has_moves = board.generate_moves(|_| true);

        if !has_moves {
            let mated = board.side_to_move();
            if board.checkers().is_empty() {
                return Terminal::Draw(DrawReason::Stalemate);
            }
            return Terminal::Checkmate {
                mated,
                king: board.king(mated),
                checkers: board.checkers().into_iter().collect(),
            };
        }

        if board.halfmove_clock() >= 100 {
            return Terminal::Draw(DrawReason::FiftyMoveRule);
        }
        if insufficient_material(board) {
            return Terminal::Draw(DrawReason::InsufficientMaterial);
        }
        if self.repetitions() >= 3 {
            return Terminal::Draw(DrawReason::ThreefoldRepetition);
        }
        Terminal::None
    }

    pub fn is_game_over(&self) -> bool {
        self.terminal().is_over()
    }

    /// Promotion piece to use for a drag or click move: a pawn reaching the
    /// last rank is promoted to a queen.
    pub fn promotion_for(&self, from: Square, to: Square) -> Option<Piece> {
        let board = self.position();
        let side = board.side_to_move();
        if board.piece_on(from) != Some(Piece::Pawn) || board.color_on(from) != Some(side) {
            return None;
        }
        let last_rank = match side {
            Color::White => Rank::Eighth,
            Color::Black => Rank::First,
        };
        (to.rank() == last_rank).then_some(Piece::Queen)
    }

    /// How often the current position occurred up to the cursor.
    fn repetitions(&self) -> usize {
        let key = repetition_key(self.fen());
        self.history[..=self.cursor]
            .iter()
            .filter(|entry| repetition_key(&entry.fen) == key)
            .count()
    }
}

/// Placement, side to move, castling rights and en passant square.
fn repetition_key(fen: &str) -> Vec<&str> {
    fen.split_whitespace().take(4).collect()
}

fn insufficient_material(board: &Board) -> bool {
    let kings = board.pieces(Piece::King);
    let others = board.occupied() ^ kings;
    if others.is_empty() {
        return true;
    }

    let heavy = board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | board.pieces(Piece::Queen);
    if !heavy.is_empty() {
        return false;
    }
    if others.len() == 1 {
        return true;
    }
    if !board.pieces(Piece::Knight).is_empty() {
        return false;
    }

    // Only bishops left: a draw when they all stand on one shade.
    let mut shades = others.into_iter().map(is_dark_square);
    let first = shades.next();
    shades.all(|shade| Some(shade) == first)
}

fn is_dark_square(sq: Square) -> bool {
    (sq.file() as u8 + sq.rank() as u8) % 2 == 0
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Illegal move: {0}")]
    IllegalMove(String),
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Nothing to redo")]
    NothingToRedo,
    #[error("History index {index} out of range (length {len})")]
    OutOfRange { index: usize, len: usize },
    #[error("FEN parse error: {0}")]
    FenError(#[from] FenError),
}
