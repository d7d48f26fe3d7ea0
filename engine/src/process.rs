use crate::UciError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;

/// Capacity of the inbound line channel.
const LINE_BUFFER: usize = 256;

/// Line-oriented connection to a UCI engine.
///
/// Outbound lines go to `tx` without a trailing newline; inbound lines
/// arrive trimmed on `rx`. The connection is either a child process or an
/// in-memory [`EnginePeer`].
pub struct EngineIo {
    pub tx: mpsc::UnboundedSender<String>,
    pub rx: mpsc::Receiver<String>,
    pub(crate) process: Option<Child>,
}

/// The engine's end of an in-memory [`EngineIo`]: reads what the session
/// sends and answers with engine output lines.
pub struct EnginePeer {
    pub commands: mpsc::UnboundedReceiver<String>,
    pub replies: mpsc::Sender<String>,
}

impl EngineIo {
    /// Connected in-memory pair with no process behind it.
    pub fn pipe() -> (EngineIo, EnginePeer) {
        let (tx, commands) = mpsc::unbounded_channel();
        let (replies, rx) = mpsc::channel(LINE_BUFFER);
        (
            EngineIo {
                tx,
                rx,
                process: None,
            },
            EnginePeer { commands, replies },
        )
    }
}

impl EnginePeer {
    /// Send one line of engine output.
    pub async fn reply(&self, line: &str) {
        let _ = self.replies.send(line.to_string()).await;
    }

    /// Every command received so far.
    pub fn drain(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = self.commands.try_recv() {
            lines.push(line);
        }
        lines
    }

    /// Wait for the next command.
    pub async fn next_command(&mut self) -> Option<String> {
        self.commands.recv().await
    }
}

/// Spawn an engine executable and connect its stdin/stdout to an [`EngineIo`].
#[tracing::instrument(level = "info")]
pub fn spawn_engine_process(path: &Path) -> Result<EngineIo, UciError> {
    tracing::debug!("Spawning engine process");
    let mut process = tokio::process::Command::new(path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            tracing::error!("Failed to spawn engine: {}", e);
            UciError::Io(e)
        })?;

    let mut stdin = process.stdin.take().ok_or(UciError::MissingPipe("stdin"))?;
    let stdout = process.stdout.take().ok_or(UciError::MissingPipe("stdout"))?;

    let (tx, mut stdin_rx) = mpsc::unbounded_channel::<String>();
    let (line_tx, rx) = mpsc::channel::<String>(LINE_BUFFER);

    // Output reader task
    tokio::spawn(async move {
        let mut reader = BufReader::new(stdout);
        let mut line = String::new();

        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) => {
                    tracing::warn!("Engine stdout EOF - engine closed");
                    break;
                }
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    if line_tx.send(trimmed.to_string()).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Error reading from engine stdout: {}", e);
                    break;
                }
            }
        }
        tracing::debug!("Output reader task exiting");
    });

    // Stdin writer task
    tokio::spawn(async move {
        while let Some(cmd) = stdin_rx.recv().await {
            if let Err(e) = stdin.write_all(format!("{}\n", cmd).as_bytes()).await {
                tracing::error!("Failed to write to stdin: {}", e);
                break;
            }
            if let Err(e) = stdin.flush().await {
                tracing::error!("Failed to flush stdin: {}", e);
                break;
            }
        }
        tracing::debug!("Stdin writer task exiting");
    });

    tracing::info!("Engine process spawned");
    Ok(EngineIo {
        tx,
        rx,
        process: Some(process),
    })
}

/// Find a UCI engine executable.
///
/// An explicit path wins when it exists; otherwise Stockfish is looked up
/// in common install locations and then on `PATH`.
pub fn find_engine_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    let paths = [
        "/usr/local/bin/stockfish",
        "/usr/bin/stockfish",
        "/opt/homebrew/bin/stockfish",
        "/usr/games/stockfish",
    ];
    if let Some(found) = paths.iter().map(Path::new).find(|p| p.exists()) {
        return Some(found.to_path_buf());
    }

    let search_path = std::env::var_os("PATH")?;
    std::env::split_paths(&search_path)
        .map(|dir| dir.join("stockfish"))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pipe_carries_lines_both_ways() {
        let (mut io, mut peer) = EngineIo::pipe();
        io.tx.send("uci".to_string()).unwrap();
        io.tx.send("isready".to_string()).unwrap();
        assert_eq!(peer.drain(), vec!["uci", "isready"]);

        peer.reply("readyok").await;
        assert_eq!(io.rx.recv().await.as_deref(), Some("readyok"));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let missing = Path::new("/definitely/not/an/engine");
        assert!(find_engine_path(Some(missing)).is_none());
    }
}
