use chess::GameMode;
use cozy_chess::{Piece, Square};
use tokio::sync::{broadcast, oneshot};

use super::events::SessionEvent;
use super::snapshot::SessionSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Illegal move: {0}")]
    IllegalMove(String),
    #[error("Invalid FEN: {0}")]
    InvalidFen(String),
    #[error("It is the computer's turn")]
    NotYourTurn,
    #[error("Game is over")]
    GameOver,
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Nothing to redo")]
    NothingToRedo,
    #[error("No position at index {0}")]
    OutOfRange(usize),
    #[error("Skill level must be 0-20, got {0}")]
    InvalidSkillLevel(u8),
    #[error("Internal error: {0}")]
    Internal(String),
}

type SnapshotReply = oneshot::Sender<Result<SessionSnapshot, SessionError>>;

/// Commands sent to the coordinator actor. Each embeds a oneshot for the reply.
/// Computer moves and analysis are never requested directly; the actor
/// issues them after every state change.
pub enum SessionCommand {
    MakeMove {
        from: Square,
        to: Square,
        promotion: Option<Piece>,
        reply: SnapshotReply,
    },
    Click {
        square: Square,
        reply: SnapshotReply,
    },
    StepBack {
        reply: SnapshotReply,
    },
    StepForward {
        reply: SnapshotReply,
    },
    JumpTo {
        index: usize,
        reply: SnapshotReply,
    },
    NewGame {
        mode: Option<GameMode>,
        reply: SnapshotReply,
    },
    LoadFen {
        fen: String,
        reply: SnapshotReply,
    },
    SetSkillLevel {
        level: u8,
        reply: SnapshotReply,
    },
    FlipBoard {
        reply: SnapshotReply,
    },
    SetShowBestMove {
        show: bool,
        reply: SnapshotReply,
    },
    GetSnapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Subscribe {
        reply: oneshot::Sender<(SessionSnapshot, broadcast::Receiver<SessionEvent>)>,
    },
    Shutdown,
}
