pub mod process;
pub mod session;
pub mod uci;

pub use process::{find_engine_path, spawn_engine_process, EngineIo, EnginePeer};
pub use session::{EngineRole, EngineSession, SessionError, SessionState, SessionTimeouts};
pub use uci::{UciError, UciMessage};

use cozy_chess::Move;

/// Commands sent to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Uci,
    IsReady,
    SetOption { name: String, value: Option<String> },
    UciNewGame,
    SetPosition { fen: String },
    Go(GoParams),
    Stop,
    Quit,
}

impl EngineCommand {
    /// Wire form of the command, without the trailing newline.
    pub fn to_uci_line(&self) -> String {
        match self {
            Self::Uci => "uci".to_string(),
            Self::IsReady => "isready".to_string(),
            Self::SetOption { name, value } => match value {
                Some(value) => format!("setoption name {} value {}", name, value),
                None => format!("setoption name {}", name),
            },
            Self::UciNewGame => "ucinewgame".to_string(),
            Self::SetPosition { fen } => format!("position fen {}", fen),
            Self::Go(params) => params.to_uci_line(),
            Self::Stop => "stop".to_string(),
            Self::Quit => "quit".to_string(),
        }
    }
}

/// Parameters for the "go" command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    pub movetime: Option<u64>, // Move time in milliseconds
    pub depth: Option<u8>,     // Search depth
    pub infinite: bool,        // Search until "stop"
}

impl GoParams {
    pub fn movetime(ms: u64) -> Self {
        Self {
            movetime: Some(ms),
            ..Default::default()
        }
    }

    fn to_uci_line(&self) -> String {
        if let Some(movetime) = self.movetime {
            format!("go movetime {}", movetime)
        } else if let Some(depth) = self.depth {
            format!("go depth {}", depth)
        } else if self.infinite {
            "go infinite".to_string()
        } else {
            "go movetime 1000".to_string() // Default 1 second
        }
    }
}

/// Events produced by an [`EngineSession`].
///
/// Search results carry the FEN the search was started for, so a consumer
/// can tell whether they still describe its current position.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Handshake finished; the session accepts options and searches.
    Ready,
    /// Search finished. `mv` is `None` for `bestmove (none)`.
    BestMove { fen: String, mv: Option<Move> },
    Info { fen: String, info: EngineInfo },
    /// No `readyok` arrived in time; the session has been terminated.
    HandshakeFailed,
    /// The engine's output ended.
    Closed,
}

/// Engine analysis information
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineInfo {
    pub depth: Option<u8>,
    pub seldepth: Option<u8>,
    pub time_ms: Option<u64>,
    pub nodes: Option<u64>,
    pub score: Option<Score>,
    pub pv: Vec<Move>, // Principal variation
    pub multipv: Option<u8>,
    pub currmove: Option<Move>,
    pub hashfull: Option<u16>,
    pub nps: Option<u64>,
}

impl EngineInfo {
    /// Rank of the line this info belongs to. Engines omit `multipv`
    /// when only one line is searched.
    pub fn rank(&self) -> u8 {
        self.multipv.unwrap_or(1)
    }
}

/// Score as reported by the engine, relative to the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Centipawns(i32),
    Mate(i32), // Negative for being mated
}
