//! UCI wire format: engine output parsing and move text.

pub mod parser;

pub use parser::{format_uci_move, parse_uci_message, parse_uci_move, UciMessage};

/// Failure to talk to an engine or to understand what it said.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    #[error("Engine I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The child process was spawned without the named pipe.
    #[error("Engine {0} is not piped")]
    MissingPipe(&'static str),
    #[error("Malformed UCI line: {0}")]
    MalformedMessage(String),
    #[error("Unknown UCI line: {0}")]
    UnknownMessage(String),
    #[error("Invalid UCI move: {0}")]
    InvalidMove(String),
    #[error("Invalid square: {0}")]
    InvalidSquare(String),
    #[error("Invalid promotion piece in: {0}")]
    InvalidPromotion(String),
}
