//! Configuration for the chess demo.
//!
//! Every tunable has a compile-time default and can be overridden at runtime
//! through a dedicated environment variable. Command-line flags in the
//! binary take precedence over both.

use std::path::PathBuf;
use std::time::Duration;

use engine::SessionTimeouts;

/// Default think time for the computer's moves (in milliseconds).
const DEFAULT_PLAYER_MOVETIME_MS: u64 = 1000;

/// Default think time for each analysis run (in milliseconds).
const DEFAULT_ANALYSIS_MOVETIME_MS: u64 = 2000;

/// Default number of analysis lines.
const DEFAULT_MULTIPV: u8 = 3;

/// Default engine skill level (0-20).
pub const DEFAULT_SKILL_LEVEL: u8 = 10;

/// Default time to wait for `readyok` (in seconds).
const DEFAULT_HANDSHAKE_TIMEOUT_SECS: u64 = 10;

/// Default time to wait for a stopped search to report (in milliseconds).
const DEFAULT_STOP_TIMEOUT_MS: u64 = 500;

/// Default base URL of the prediction API.
const DEFAULT_PREDICT_URL: &str = "http://localhost:8000";

/// Highest skill level an engine accepts.
pub const MAX_SKILL_LEVEL: u8 = 20;

/// Search parameters used by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub player_movetime_ms: u64,
    pub analysis_movetime_ms: u64,
    pub multipv: u8,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            player_movetime_ms: DEFAULT_PLAYER_MOVETIME_MS,
            analysis_movetime_ms: DEFAULT_ANALYSIS_MOVETIME_MS,
            multipv: DEFAULT_MULTIPV,
        }
    }
}

/// All runtime settings, gathered from the environment.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub engine_path: Option<PathBuf>,
    pub search: SearchSettings,
    pub skill_level: u8,
    pub timeouts: SessionTimeouts,
    pub log_path: Option<PathBuf>,
    pub predict_url: String,
}

impl DemoConfig {
    pub fn from_env() -> Self {
        Self {
            engine_path: get_engine_path(),
            search: SearchSettings {
                player_movetime_ms: get_player_movetime_ms(),
                analysis_movetime_ms: get_analysis_movetime_ms(),
                multipv: get_multipv(),
            },
            skill_level: get_skill_level(),
            timeouts: SessionTimeouts {
                handshake: Duration::from_secs(get_handshake_timeout_secs()),
                stop: Duration::from_millis(get_stop_timeout_ms()),
            },
            log_path: get_log_path(),
            predict_url: get_predict_url(),
        }
    }
}

/// Get the engine executable path.
///
/// Priority:
/// 1. `CHESSDEMO_ENGINE_PATH` env variable if set
/// 2. `None`: the engine is looked up in common install locations
pub fn get_engine_path() -> Option<PathBuf> {
    std::env::var("CHESSDEMO_ENGINE_PATH").ok().map(PathBuf::from)
}

/// Get the computer's think time in milliseconds.
///
/// Priority:
/// 1. `CHESSDEMO_PLAYER_MOVETIME_MS` env variable if set (falls back to the
///    default if the value cannot be parsed as a `u64`)
/// 2. `1000` ms as fallback
pub fn get_player_movetime_ms() -> u64 {
    if let Ok(ms) = std::env::var("CHESSDEMO_PLAYER_MOVETIME_MS") {
        return ms.parse().unwrap_or(DEFAULT_PLAYER_MOVETIME_MS);
    }

    DEFAULT_PLAYER_MOVETIME_MS
}

/// Get the analysis think time in milliseconds.
///
/// Priority:
/// 1. `CHESSDEMO_ANALYSIS_MOVETIME_MS` env variable if set
/// 2. `2000` ms as fallback
pub fn get_analysis_movetime_ms() -> u64 {
    if let Ok(ms) = std::env::var("CHESSDEMO_ANALYSIS_MOVETIME_MS") {
        return ms.parse().unwrap_or(DEFAULT_ANALYSIS_MOVETIME_MS);
    }

    DEFAULT_ANALYSIS_MOVETIME_MS
}

/// Get the number of analysis lines. Zero is treated as unparsable.
pub fn get_multipv() -> u8 {
    if let Ok(lines) = std::env::var("CHESSDEMO_MULTIPV") {
        return lines
            .parse()
            .ok()
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MULTIPV);
    }

    DEFAULT_MULTIPV
}

/// Get the initial skill level. Values above 20 fall back to the default.
pub fn get_skill_level() -> u8 {
    if let Ok(level) = std::env::var("CHESSDEMO_SKILL_LEVEL") {
        return level
            .parse()
            .ok()
            .filter(|l| *l <= MAX_SKILL_LEVEL)
            .unwrap_or(DEFAULT_SKILL_LEVEL);
    }

    DEFAULT_SKILL_LEVEL
}

pub fn get_handshake_timeout_secs() -> u64 {
    if let Ok(secs) = std::env::var("CHESSDEMO_HANDSHAKE_TIMEOUT_SECS") {
        return secs.parse().unwrap_or(DEFAULT_HANDSHAKE_TIMEOUT_SECS);
    }

    DEFAULT_HANDSHAKE_TIMEOUT_SECS
}

pub fn get_stop_timeout_ms() -> u64 {
    if let Ok(ms) = std::env::var("CHESSDEMO_STOP_TIMEOUT_MS") {
        return ms.parse().unwrap_or(DEFAULT_STOP_TIMEOUT_MS);
    }

    DEFAULT_STOP_TIMEOUT_MS
}

/// Get the log file path. Logs go to stderr when unset.
pub fn get_log_path() -> Option<PathBuf> {
    std::env::var("CHESSDEMO_LOG_PATH").ok().map(PathBuf::from)
}

/// Get the prediction API base URL.
///
/// Priority:
/// 1. `CHESSDEMO_PREDICT_URL` env variable if set
/// 2. `http://localhost:8000` as fallback
pub fn get_predict_url() -> String {
    std::env::var("CHESSDEMO_PREDICT_URL").unwrap_or_else(|_| DEFAULT_PREDICT_URL.to_string())
}
