use engine::{EngineEvent, EngineRole, EngineSession};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time;
use tracing::Instrument;

use super::commands::*;
use super::events::*;
use super::snapshot::SessionSnapshot;
use super::state::CoordinatorState;

/// How often engine deadlines are checked.
const TICK_INTERVAL: time::Duration = time::Duration::from_millis(100);

/// The coordinator actor loop.
/// Owns all mutable state. Processes commands and engine events sequentially.
pub(crate) async fn run_session_actor(
    state: CoordinatorState,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
) {
    run_session_actor_inner(state, cmd_rx, event_tx)
        .instrument(tracing::info_span!("session"))
        .await;
}

async fn run_session_actor_inner(
    mut state: CoordinatorState,
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
) {
    tracing::info!("Session actor started");

    let mut tick = time::interval(TICK_INTERVAL);
    tick.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SessionCommand::Shutdown) | None => {
                        tracing::info!("Session actor shutting down");
                        state.shutdown_engines();
                        break;
                    }
                    Some(cmd) => handle_command(&mut state, cmd, &event_tx),
                }
            }

            Some(event) = next_engine_event(&mut state.player) => {
                handle_engine_event(&mut state, EngineRole::Player, event, &event_tx);
            }

            Some(event) = next_engine_event(&mut state.analysis) => {
                handle_engine_event(&mut state, EngineRole::Analysis, event, &event_tx);
            }

            _ = tick.tick() => {
                for role in state.check_timeouts(time::Instant::now()) {
                    let _ = event_tx.send(SessionEvent::EngineUnavailable(role));
                    let _ = event_tx.send(SessionEvent::StateChanged(state.snapshot()));
                }
            }
        }
    }

    tracing::info!("Session actor exited");
}

/// Next event of a live session; never resolves without one.
async fn next_engine_event(session: &mut Option<EngineSession>) -> Option<EngineEvent> {
    match session.as_mut() {
        Some(session) if !session.is_terminated() => session.next_event().await,
        _ => std::future::pending().await,
    }
}

fn reply_with_snapshot(
    reply: oneshot::Sender<Result<SessionSnapshot, SessionError>>,
    result: Result<SessionSnapshot, SessionError>,
    event_tx: &broadcast::Sender<SessionEvent>,
) {
    if let Ok(ref snap) = result {
        let _ = event_tx.send(SessionEvent::StateChanged(snap.clone()));
    }
    let _ = reply.send(result);
}

fn handle_command(
    state: &mut CoordinatorState,
    cmd: SessionCommand,
    event_tx: &broadcast::Sender<SessionEvent>,
) {
    match cmd {
        SessionCommand::MakeMove {
            from,
            to,
            promotion,
            reply,
        } => {
            let result = state
                .apply_user_move(from, to, promotion)
                .map(|_| state.snapshot());
            reply_with_snapshot(reply, result, event_tx);
        }
        SessionCommand::Click { square, reply } => {
            let result = state.click(square).map(|_| state.snapshot());
            reply_with_snapshot(reply, result, event_tx);
        }
        SessionCommand::StepBack { reply } => {
            let result = state.step_back().map(|_| state.snapshot());
            reply_with_snapshot(reply, result, event_tx);
        }
        SessionCommand::StepForward { reply } => {
            let result = state.step_forward().map(|_| state.snapshot());
            reply_with_snapshot(reply, result, event_tx);
        }
        SessionCommand::JumpTo { index, reply } => {
            let result = state.jump_to(index).map(|_| state.snapshot());
            reply_with_snapshot(reply, result, event_tx);
        }
        SessionCommand::NewGame { mode, reply } => {
            state.new_game(mode);
            reply_with_snapshot(reply, Ok(state.snapshot()), event_tx);
        }
        SessionCommand::LoadFen { fen, reply } => {
            let result = state.load_fen(&fen).map(|_| state.snapshot());
            reply_with_snapshot(reply, result, event_tx);
        }
        SessionCommand::SetSkillLevel { level, reply } => {
            let result = state.set_skill_level(level).map(|_| state.snapshot());
            reply_with_snapshot(reply, result, event_tx);
        }
        SessionCommand::FlipBoard { reply } => {
            state.flip_board();
            reply_with_snapshot(reply, Ok(state.snapshot()), event_tx);
        }
        SessionCommand::SetShowBestMove { show, reply } => {
            state.show_best_move = show;
            reply_with_snapshot(reply, Ok(state.snapshot()), event_tx);
        }
        SessionCommand::GetSnapshot { reply } => {
            let _ = reply.send(state.snapshot());
        }
        SessionCommand::Subscribe { reply } => {
            let snapshot = state.snapshot();
            let rx = event_tx.subscribe();
            let _ = reply.send((snapshot, rx));
        }
        // Handled by the actor loop.
        SessionCommand::Shutdown => {}
    }
}

fn handle_engine_event(
    state: &mut CoordinatorState,
    role: EngineRole,
    event: EngineEvent,
    event_tx: &broadcast::Sender<SessionEvent>,
) {
    match (role, event) {
        (_, EngineEvent::Ready) => {
            state.on_engine_ready(role);
            let _ = event_tx.send(SessionEvent::StateChanged(state.snapshot()));
        }
        (EngineRole::Player, EngineEvent::BestMove { fen, mv }) => {
            match state.apply_engine_move(&fen, mv) {
                Ok(_) => {
                    let _ = event_tx.send(SessionEvent::StateChanged(state.snapshot()));
                }
                Err(e) => {
                    tracing::error!("Failed to apply engine move: {}", e);
                    let _ = event_tx.send(SessionEvent::Error(e.to_string()));
                }
            }
        }
        (EngineRole::Analysis, EngineEvent::Info { fen, info }) => {
            if state.accept_info(&fen, &info) {
                let _ = event_tx.send(SessionEvent::AnalysisChanged(state.analysis_view()));
            }
        }
        (EngineRole::Analysis, EngineEvent::BestMove { fen, .. }) => {
            tracing::debug!(fen = %fen, "Analysis finished");
        }
        (EngineRole::Player, EngineEvent::Info { .. }) => {}
        (_, event @ (EngineEvent::HandshakeFailed | EngineEvent::Closed)) => {
            state.on_engine_lost(role, &event);
            let _ = event_tx.send(SessionEvent::EngineUnavailable(role));
            let _ = event_tx.send(SessionEvent::StateChanged(state.snapshot()));
        }
    }
}
