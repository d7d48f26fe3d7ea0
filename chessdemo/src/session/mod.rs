pub mod actor;
pub mod candidates;
pub mod commands;
pub mod events;
pub mod handle;
pub mod snapshot;
pub mod state;

use chess::{Game, GameMode};
use engine::{find_engine_path, EngineRole, EngineSession};
use tokio::sync::{broadcast, mpsc};

use crate::config::{DemoConfig, SearchSettings};
use crate::sound::SoundSink;
use actor::run_session_actor;
pub use candidates::{CandidateLine, CandidateView};
pub use commands::SessionError;
pub use events::SessionEvent;
pub use handle::SessionHandle;
pub use snapshot::{AnalysisView, EngineStatus, ModeView, MoveView, SessionSnapshot};
use state::CoordinatorState;

/// How a new coordinator starts out.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub mode: GameMode,
    /// Starting position; the standard one when `None`.
    pub fen: Option<String>,
    pub settings: SearchSettings,
    pub skill_level: u8,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            mode: GameMode::default(),
            fen: None,
            settings: SearchSettings::default(),
            skill_level: crate::config::DEFAULT_SKILL_LEVEL,
        }
    }
}

/// The two engine workers. Either may be missing; the coordinator then
/// runs without computer moves or without analysis.
#[derive(Default)]
pub struct SessionEngines {
    pub player: Option<EngineSession>,
    pub analysis: Option<EngineSession>,
}

impl SessionEngines {
    /// Locate the engine and spawn one process per role.
    pub fn start(config: &DemoConfig) -> Self {
        let Some(path) = find_engine_path(config.engine_path.as_deref()) else {
            tracing::warn!("No UCI engine found; running without engines");
            return Self::default();
        };
        tracing::info!(path = %path.display(), "Using engine");

        let spawn = |role| match EngineSession::spawn(role, &path, config.timeouts) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::error!(role = %role, "Failed to start engine: {}", e);
                None
            }
        };
        Self {
            player: spawn(EngineRole::Player),
            analysis: spawn(EngineRole::Analysis),
        }
    }
}

/// Spawn the coordinator actor and return its handle.
pub fn spawn_session(
    options: SessionOptions,
    engines: SessionEngines,
    sounds: Box<dyn SoundSink>,
) -> Result<SessionHandle, SessionError> {
    let game = match options.fen {
        Some(ref fen) => Game::from_fen(fen).map_err(|e| SessionError::InvalidFen(e.to_string()))?,
        None => Game::new(),
    };

    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (event_tx, _) = broadcast::channel(100);

    let mut state = CoordinatorState::new(
        game,
        options.mode,
        options.settings,
        options.skill_level,
        sounds,
    );
    state.player = engines.player;
    state.analysis = engines.analysis;

    tokio::spawn(async move {
        run_session_actor(state, cmd_rx, event_tx).await;
    });

    Ok(SessionHandle::new(cmd_tx))
}
