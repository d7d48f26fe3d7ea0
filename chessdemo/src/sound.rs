//! Sound cues for applied moves.
//!
//! The coordinator owns a [`SoundSink`] and reports cues through it; what a
//! sink does with them (play audio, print, record) is up to the front-end.

use std::io::Write;

use chess::MoveRecord;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Start,
    Move,
    Capture,
    Check,
    Checkmate,
}

/// Receiver of sound cues.
pub trait SoundSink: Send {
    fn play(&mut self, cue: SoundCue);
}

/// Discards every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SoundSink for NullSink {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Rings the terminal bell on check and mate; other cues are only traced.
#[derive(Debug, Default)]
pub struct BellSink;

impl SoundSink for BellSink {
    fn play(&mut self, cue: SoundCue) {
        tracing::trace!(?cue, "Sound cue");
        if matches!(cue, SoundCue::Check | SoundCue::Checkmate) {
            let mut out = std::io::stdout();
            let _ = out.write_all(b"\x07");
            let _ = out.flush();
        }
    }
}

/// Cues for one applied move: `Capture` or `Move`, followed by
/// `Checkmate` or `Check` when the move gives one.
pub fn cues_for(record: &MoveRecord) -> Vec<SoundCue> {
    let mut cues = vec![if record.captured.is_some() {
        SoundCue::Capture
    } else {
        SoundCue::Move
    }];
    if record.is_checkmate {
        cues.push(SoundCue::Checkmate);
    } else if record.is_check {
        cues.push(SoundCue::Check);
    }
    cues
}
