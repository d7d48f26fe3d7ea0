use engine::EngineRole;

use super::snapshot::{AnalysisView, SessionSnapshot};

/// Events broadcast from the coordinator actor to all subscribers.
#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum SessionEvent {
    /// Full state snapshot after any mutation.
    StateChanged(SessionSnapshot),
    /// New analysis for the current position (frequent, lightweight).
    AnalysisChanged(AnalysisView),
    /// An engine failed its handshake or exited.
    EngineUnavailable(EngineRole),
    /// Error notification.
    Error(String),
}
