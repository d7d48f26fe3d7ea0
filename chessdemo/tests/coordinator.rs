//! End-to-end coordinator tests against scripted in-memory engines.

use std::time::Duration;

use chess::{parse_square, GameMode};
use chessdemo::config::SearchSettings;
use chessdemo::session::{
    spawn_session, EngineStatus, SessionEngines, SessionEvent, SessionHandle, SessionOptions,
};
use chessdemo::sound::NullSink;
use chessdemo::{SessionError, SessionSnapshot};
use cozy_chess::{Color, Square};
use engine::{EngineIo, EnginePeer, EngineRole, EngineSession, SessionTimeouts};
use tokio::sync::broadcast;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

fn sq(s: &str) -> Square {
    parse_square(s).unwrap()
}

fn timeouts() -> SessionTimeouts {
    SessionTimeouts {
        handshake: Duration::from_secs(30),
        stop: Duration::from_secs(30),
    }
}

fn fake_engine(role: EngineRole) -> (EngineSession, EnginePeer) {
    let (io, peer) = EngineIo::pipe();
    (EngineSession::start(role, io, timeouts()), peer)
}

async fn start(
    mode: GameMode,
    player: Option<EngineSession>,
    analysis: Option<EngineSession>,
) -> (SessionHandle, broadcast::Receiver<SessionEvent>) {
    let options = SessionOptions {
        mode,
        fen: None,
        settings: SearchSettings::default(),
        skill_level: 5,
    };
    let handle = spawn_session(options, SessionEngines { player, analysis }, Box::new(NullSink))
        .unwrap();
    let (_, events) = handle.subscribe().await.unwrap();
    (handle, events)
}

/// Read commands until one starts with `prefix`. Returns every line read.
async fn expect_command(peer: &mut EnginePeer, prefix: &str) -> Vec<String> {
    let mut seen = Vec::new();
    loop {
        let line = timeout(WAIT, peer.next_command())
            .await
            .unwrap_or_else(|_| panic!("no '{}' command, saw {:?}", prefix, seen))
            .expect("session closed its engine input");
        let done = line.starts_with(prefix);
        seen.push(line);
        if done {
            return seen;
        }
    }
}

/// Position the last `go` in `lines` was issued for.
fn searched_fen(lines: &[String]) -> String {
    lines
        .iter()
        .rev()
        .find_map(|l| l.strip_prefix("position fen "))
        .expect("no position command")
        .to_string()
}

async fn next_state(
    events: &mut broadcast::Receiver<SessionEvent>,
    accept: impl Fn(&SessionSnapshot) -> bool,
) -> SessionSnapshot {
    timeout(WAIT, async {
        loop {
            if let SessionEvent::StateChanged(snap) = events.recv().await.unwrap() {
                if accept(&snap) {
                    return snap;
                }
            }
        }
    })
    .await
    .expect("state never matched")
}

#[tokio::test]
async fn test_computer_replies_to_human_move() {
    let (player, mut peer) = fake_engine(EngineRole::Player);
    let (handle, mut events) = start(
        GameMode::VsComputer {
            human: Color::White,
        },
        Some(player),
        None,
    )
    .await;

    expect_command(&mut peer, "isready").await;
    peer.reply("uciok").await;
    peer.reply("readyok").await;
    expect_command(&mut peer, "setoption name Skill Level value 5").await;

    let snap = handle.make_move(sq("e2"), sq("e4"), None).await.unwrap();
    assert_eq!(snap.history_len, 2);

    let lines = expect_command(&mut peer, "go movetime 1000").await;
    assert_eq!(searched_fen(&lines), snap.fen);
    peer.reply("info depth 8 score cp -20 pv e7e5").await;
    peer.reply("bestmove e7e5 ponder g1f3").await;

    let snap = next_state(&mut events, |s| s.history_len == 3).await;
    assert_eq!(snap.moves[1].san, "e5");
    assert_eq!(snap.side_to_move, "white");
    assert_eq!(snap.player_engine, EngineStatus::Ready);
}

#[tokio::test]
async fn test_human_cannot_move_for_computer() {
    let (handle, _events) = start(
        GameMode::VsComputer {
            human: Color::Black,
        },
        None,
        None,
    )
    .await;
    assert_eq!(
        handle.make_move(sq("e2"), sq("e4"), None).await.unwrap_err(),
        SessionError::NotYourTurn
    );
}

#[tokio::test]
async fn test_late_engine_move_is_ignored() {
    let (player, mut peer) = fake_engine(EngineRole::Player);
    let (handle, mut events) = start(
        GameMode::VsComputer {
            human: Color::White,
        },
        Some(player),
        None,
    )
    .await;

    peer.reply("readyok").await;
    expect_command(&mut peer, "setoption name Skill Level").await;
    handle.make_move(sq("d2"), sq("d4"), None).await.unwrap();
    expect_command(&mut peer, "go").await;

    // Navigate away while the computer is thinking.
    let snap = handle.step_back().await.unwrap();
    assert_eq!(snap.cursor, 0);
    peer.reply("bestmove d7d5").await;

    let snap = next_state(&mut events, |s| {
        s.history_len == 2 && s.player_engine == EngineStatus::Ready
    })
    .await;
    assert_eq!(snap.history_len, 2);
    assert_eq!(snap.cursor, 0);

    // Back at the live end, the computer is asked again.
    handle.step_forward().await.unwrap();
    let lines = expect_command(&mut peer, "go").await;
    assert_eq!(searched_fen(&lines), handle.get_snapshot().await.unwrap().fen);
}

#[tokio::test]
async fn test_analysis_follows_current_position() {
    let (analysis, mut peer) = fake_engine(EngineRole::Analysis);
    let (handle, mut events) = start(GameMode::VsPlayer, None, Some(analysis)).await;

    peer.reply("readyok").await;
    let lines = expect_command(&mut peer, "go movetime 2000").await;
    assert!(lines.contains(&"setoption name MultiPV value 3".to_string()));
    let start_fen = searched_fen(&lines);

    let snap = handle.make_move(sq("e2"), sq("e4"), None).await.unwrap();
    expect_command(&mut peer, "stop").await;

    // Output of the abandoned search must not reach the display.
    peer.reply("info depth 9 multipv 1 score cp 35 pv d2d4").await;
    peer.reply("bestmove d2d4").await;

    let lines = expect_command(&mut peer, "go").await;
    assert_eq!(searched_fen(&lines), snap.fen);
    assert_ne!(snap.fen, start_fen);

    // Black to move: engine scores are from Black's side.
    peer.reply("info depth 10 multipv 1 score cp 50 pv e7e5 g1f3").await;
    peer.reply("info depth 10 multipv 2 score mate 3 pv e2e4").await;

    let analysis = timeout(WAIT, async {
        let mut seen = 0;
        loop {
            if let SessionEvent::AnalysisChanged(view) = events.recv().await.unwrap() {
                assert_eq!(view.fen, snap.fen);
                seen += 1;
                if seen == 2 {
                    return view;
                }
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(analysis.evaluation_cp, -50);
    assert_eq!(analysis.evaluation, "-0.5");
    // The rank-2 line starts with a move that is illegal here.
    assert_eq!(analysis.candidates.len(), 1);
    assert_eq!(analysis.candidates[0].san, "e5");
    assert!(analysis.arrow_path.is_some());
}

#[tokio::test]
async fn test_engine_that_never_answers_is_reported() {
    let (io, _peer) = EngineIo::pipe();
    let player = EngineSession::start(
        EngineRole::Player,
        io,
        SessionTimeouts {
            handshake: Duration::from_millis(50),
            stop: Duration::from_millis(50),
        },
    );
    let (_handle, mut events) = start(GameMode::default(), Some(player), None).await;

    let role = timeout(WAIT, async {
        loop {
            if let SessionEvent::EngineUnavailable(role) = events.recv().await.unwrap() {
                return role;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(role, EngineRole::Player);
}

#[tokio::test]
async fn test_invalid_start_position() {
    let options = SessionOptions {
        fen: Some("not a fen".to_string()),
        ..SessionOptions::default()
    };
    let result = spawn_session(options, SessionEngines::default(), Box::new(NullSink));
    assert!(matches!(result, Err(SessionError::InvalidFen(_))));
}
