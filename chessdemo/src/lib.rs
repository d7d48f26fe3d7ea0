//! Chess demo coordinator.
//!
//! Owns a game with navigable history, drives a "player" engine for the
//! computer's moves and an "analysis" engine for evaluation and candidate
//! lines, and derives everything a board front-end needs to draw.

pub mod config;
pub mod display;
pub mod forecast;
pub mod input;
pub mod session;
pub mod sound;

pub use session::{
    spawn_session, SessionEngines, SessionError, SessionEvent, SessionHandle, SessionOptions,
    SessionSnapshot,
};
