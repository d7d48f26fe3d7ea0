//! Lifecycle of one UCI engine worker.
//!
//! A session moves through `Starting -> Ready -> Active <-> Idle ->
//! Terminated`. It tags every search result with the FEN the search was
//! started for and never blocks: outbound lines go to an unbounded channel
//! and inbound lines are pulled with [`EngineSession::next_event`].

use std::fmt;
use std::path::Path;
use std::time::Duration;

use tokio::process::Child;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::process::{spawn_engine_process, EngineIo};
use crate::uci::{parse_uci_message, UciMessage};
use crate::{EngineCommand, EngineEvent, GoParams, UciError};

/// What the session is used for. Only affects logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineRole {
    Player,
    Analysis,
}

impl fmt::Display for EngineRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => f.write_str("player"),
            Self::Analysis => f.write_str("analysis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// `uci`/`isready` sent, waiting for `readyok`.
    Starting,
    /// Handshake done, no search issued yet.
    Ready,
    /// A search is outstanding.
    Active,
    Idle,
    Terminated,
}

#[derive(Debug, Clone, Copy)]
pub struct SessionTimeouts {
    /// How long to wait for `readyok`. One retry is made before giving up.
    pub handshake: Duration,
    /// How long to wait for the `bestmove` that answers a `stop`.
    pub stop: Duration,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            handshake: Duration::from_secs(10),
            stop: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Engine is still starting")]
    NotReady,
    #[error("Engine is busy with another search")]
    Busy,
    #[error("Engine session has terminated")]
    Terminated,
    #[error("Engine error: {0}")]
    Uci(#[from] UciError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchKind {
    BestMove,
    Analysis,
}

#[derive(Debug, Clone)]
struct Search {
    fen: String,
    kind: SearchKind,
}

#[derive(Debug, Clone)]
struct QueuedAnalysis {
    fen: String,
    think_ms: u64,
}

pub struct EngineSession {
    role: EngineRole,
    state: SessionState,
    tx: mpsc::UnboundedSender<String>,
    rx: mpsc::Receiver<String>,
    process: Option<Child>,
    timeouts: SessionTimeouts,
    search: Option<Search>,
    queued: Option<QueuedAnalysis>,
    handshake_deadline: Option<Instant>,
    handshake_retried: bool,
    stop_deadline: Option<Instant>,
    /// `bestmove` lines still owed by searches abandoned after a stop timeout.
    stale_bestmoves: usize,
}

impl EngineSession {
    /// Start the handshake over an existing connection.
    pub fn start(role: EngineRole, io: EngineIo, timeouts: SessionTimeouts) -> Self {
        let mut session = Self {
            role,
            state: SessionState::Starting,
            tx: io.tx,
            rx: io.rx,
            process: io.process,
            timeouts,
            search: None,
            queued: None,
            handshake_deadline: Some(Instant::now() + timeouts.handshake),
            handshake_retried: false,
            stop_deadline: None,
            stale_bestmoves: 0,
        };
        tracing::info!(role = %role, "Starting engine session");
        session.send(EngineCommand::Uci);
        session.send(EngineCommand::IsReady);
        session
    }

    /// Spawn the engine executable at `path` and start the handshake.
    #[tracing::instrument(level = "info", skip(timeouts))]
    pub fn spawn(
        role: EngineRole,
        path: &Path,
        timeouts: SessionTimeouts,
    ) -> Result<Self, SessionError> {
        let io = spawn_engine_process(path)?;
        Ok(Self::start(role, io, timeouts))
    }

    pub fn role(&self) -> EngineRole {
        self.role
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Ready or Idle: a new search can be issued right away.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, SessionState::Ready | SessionState::Idle)
    }

    /// Handshake completed and not terminated.
    pub fn is_ready(&self) -> bool {
        !matches!(
            self.state,
            SessionState::Starting | SessionState::Terminated
        )
    }

    pub fn is_terminated(&self) -> bool {
        self.state == SessionState::Terminated
    }

    /// FEN of the outstanding search, if any.
    pub fn searching_fen(&self) -> Option<&str> {
        self.search.as_ref().map(|s| s.fen.as_str())
    }

    /// Set an engine option. Only allowed once the handshake is done.
    pub fn configure(&mut self, name: &str, value: &str) -> Result<(), SessionError> {
        self.ensure_ready()?;
        tracing::info!(role = %self.role, "Setting option {} = {}", name, value);
        self.send(EngineCommand::SetOption {
            name: name.to_string(),
            value: Some(value.to_string()),
        });
        Ok(())
    }

    /// Ask for a move in `fen`. Answered by exactly one
    /// [`EngineEvent::BestMove`] tagged with `fen`.
    pub fn request_best_move(&mut self, fen: &str, think_ms: u64) -> Result<(), SessionError> {
        self.ensure_ready()?;
        if !self.is_idle() {
            return Err(SessionError::Busy);
        }

        tracing::info!(role = %self.role, think_ms, "Requesting best move");
        self.send(EngineCommand::UciNewGame);
        self.send(EngineCommand::SetPosition {
            fen: fen.to_string(),
        });
        self.send(EngineCommand::Go(GoParams::movetime(think_ms)));
        self.begin(fen, SearchKind::BestMove);
        Ok(())
    }

    /// Analyse `fen`. A running search is stopped first and this request
    /// is dispatched once the engine has acknowledged the stop. Only the
    /// latest queued request is kept.
    pub fn request_analysis(&mut self, fen: &str, think_ms: u64) -> Result<(), SessionError> {
        self.ensure_ready()?;
        let request = QueuedAnalysis {
            fen: fen.to_string(),
            think_ms,
        };

        if self.is_idle() {
            self.dispatch_analysis(request);
        } else {
            tracing::debug!(role = %self.role, "Search running, queueing analysis");
            self.queued = Some(request);
            self.stop();
        }
        Ok(())
    }

    /// Ask the engine to stop the outstanding search. The session becomes
    /// Idle when the trailing `bestmove` arrives or the stop timeout passes.
    pub fn stop(&mut self) {
        if self.state != SessionState::Active || self.stop_deadline.is_some() {
            return;
        }
        self.send(EngineCommand::Stop);
        self.stop_deadline = Some(Instant::now() + self.timeouts.stop);
    }

    /// Drop any queued analysis and stop the running search.
    pub fn cancel(&mut self) {
        self.queued = None;
        self.stop();
    }

    /// Next typed event from the engine.
    ///
    /// Returns `None` once the session has terminated. The end of the
    /// engine's output is reported once as [`EngineEvent::Closed`].
    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        loop {
            if self.is_terminated() {
                return None;
            }
            let Some(line) = self.rx.recv().await else {
                tracing::warn!(role = %self.role, "Engine output closed");
                self.mark_terminated();
                return Some(EngineEvent::Closed);
            };
            if let Some(event) = self.handle_line(&line) {
                return Some(event);
            }
        }
    }

    /// Apply one line of engine output.
    pub fn handle_line(&mut self, line: &str) -> Option<EngineEvent> {
        if self.is_terminated() {
            return None;
        }
        tracing::trace!(role = %self.role, "UCI << {}", line);

        let msg = match parse_uci_message(line) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(role = %self.role, "Ignoring engine output: {}", e);
                return None;
            }
        };

        match msg {
            UciMessage::ReadyOk if self.state == SessionState::Starting => {
                self.state = SessionState::Ready;
                self.handshake_deadline = None;
                tracing::info!(role = %self.role, "Engine ready");
                Some(EngineEvent::Ready)
            }
            UciMessage::Info(info) => {
                if self.stale_bestmoves > 0 {
                    return None;
                }
                let search = self.search.as_ref()?;
                Some(EngineEvent::Info {
                    fen: search.fen.clone(),
                    info,
                })
            }
            UciMessage::BestMove { mv, .. } => {
                if self.stale_bestmoves > 0 {
                    self.stale_bestmoves -= 1;
                    tracing::debug!(role = %self.role, "Dropping bestmove of abandoned search");
                    return None;
                }
                let Some(search) = self.search.take() else {
                    tracing::debug!(role = %self.role, "Unexpected bestmove");
                    return None;
                };
                self.finish_search();
                tracing::debug!(role = %self.role, kind = ?search.kind, "Search finished");
                Some(EngineEvent::BestMove {
                    fen: search.fen,
                    mv,
                })
            }
            UciMessage::UciOk => {
                tracing::debug!(role = %self.role, "Received uciok");
                None
            }
            UciMessage::Id { .. } | UciMessage::Option(_) | UciMessage::ReadyOk => None,
        }
    }

    /// Enforce the handshake and stop deadlines.
    pub fn check_timeouts(&mut self, now: Instant) -> Option<EngineEvent> {
        if let Some(deadline) = self.handshake_deadline {
            if now >= deadline {
                if !self.handshake_retried {
                    tracing::warn!(role = %self.role, "No readyok yet, asking again");
                    self.handshake_retried = true;
                    self.handshake_deadline = Some(now + self.timeouts.handshake);
                    self.send(EngineCommand::IsReady);
                    return None;
                }
                tracing::error!(role = %self.role, "Engine handshake timed out");
                self.terminate();
                return Some(EngineEvent::HandshakeFailed);
            }
        }

        if let Some(deadline) = self.stop_deadline {
            if now >= deadline {
                tracing::warn!(role = %self.role, "Engine did not acknowledge stop in time");
                self.search = None;
                self.stale_bestmoves += 1;
                self.finish_search();
            }
        }
        None
    }

    /// Send `quit` and release the engine. Idempotent.
    pub fn terminate(&mut self) {
        if self.is_terminated() {
            return;
        }
        tracing::info!(role = %self.role, "Terminating engine session");
        self.send(EngineCommand::Quit);
        self.mark_terminated();

        if let Some(mut child) = self.process.take() {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move {
                        let _ = tokio::time::timeout(Duration::from_secs(1), child.wait()).await;
                        let _ = child.kill().await;
                    });
                }
                Err(_) => {
                    let _ = child.start_kill();
                }
            }
        }
    }

    fn ensure_ready(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Starting => Err(SessionError::NotReady),
            SessionState::Terminated => Err(SessionError::Terminated),
            _ => Ok(()),
        }
    }

    fn begin(&mut self, fen: &str, kind: SearchKind) {
        self.search = Some(Search {
            fen: fen.to_string(),
            kind,
        });
        self.state = SessionState::Active;
    }

    fn dispatch_analysis(&mut self, request: QueuedAnalysis) {
        tracing::debug!(role = %self.role, think_ms = request.think_ms, "Starting analysis");
        self.send(EngineCommand::SetPosition {
            fen: request.fen.clone(),
        });
        self.send(EngineCommand::Go(GoParams::movetime(request.think_ms)));
        self.begin(&request.fen, SearchKind::Analysis);
    }

    /// Back to Idle, then run the queued analysis if there is one.
    fn finish_search(&mut self) {
        self.state = SessionState::Idle;
        self.stop_deadline = None;
        if let Some(request) = self.queued.take() {
            self.dispatch_analysis(request);
        }
    }

    fn mark_terminated(&mut self) {
        self.state = SessionState::Terminated;
        self.search = None;
        self.queued = None;
        self.handshake_deadline = None;
        self.stop_deadline = None;
    }

    fn send(&mut self, cmd: EngineCommand) {
        let line = cmd.to_uci_line();
        tracing::trace!(role = %self.role, "UCI >> {}", line);
        if self.tx.send(line).is_err() {
            tracing::warn!(role = %self.role, "Engine input closed");
        }
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        self.terminate();
    }
}
