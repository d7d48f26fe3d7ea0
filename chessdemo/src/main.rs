//! Terminal front-end for the chess demo.
//!
//! Starts both engine workers, spawns the coordinator and runs a line
//! oriented prompt on stdin. The `predict` subcommand queries the stock
//! prediction API instead.

mod render;
mod repl;

use std::path::{Path, PathBuf};

use anyhow::Context;
use chess::GameMode;
use chessdemo::config::{DemoConfig, MAX_SKILL_LEVEL};
use chessdemo::session::{spawn_session, SessionEngines, SessionOptions};
use chessdemo::sound::BellSink;
use chessdemo::{SessionError, SessionEvent, SessionHandle, SessionSnapshot};
use clap::{Parser, Subcommand, ValueEnum};
use cozy_chess::Color;
use chessdemo::forecast::forecast_report;
use predict_client::{
    Period, PredictClient, PredictionRequest, DEFAULT_PREDICT_DAYS, DEFAULT_TIME_STEPS,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use repl::UserInput;

#[derive(Parser)]
#[command(name = "chessdemo", about = "Play and analyse chess against a UCI engine")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Opponent for the first game.
    #[arg(long, value_enum, default_value_t = ModeArg::Computer)]
    mode: ModeArg,

    /// Your colour against the computer.
    #[arg(long, value_enum, default_value_t = ColorArg::White)]
    color: ColorArg,

    /// Engine skill level (0-20). Overrides CHESSDEMO_SKILL_LEVEL.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=MAX_SKILL_LEVEL as i64))]
    skill: Option<u8>,

    /// UCI engine executable. Overrides CHESSDEMO_ENGINE_PATH.
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Starting position.
    #[arg(long)]
    fen: Option<String>,

    /// Print snapshots as JSON lines instead of a board diagram.
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch historical and predicted closing prices for a ticker.
    Predict {
        ticker: String,

        /// Historical window: 1d, 5d, 1m, 6m, 1y, 5y, ytd, max or all.
        #[arg(long, default_value = "1y")]
        period: Period,

        /// Business days to predict.
        #[arg(long, default_value_t = DEFAULT_PREDICT_DAYS)]
        days: u32,

        /// Length of the input window the model looks back over.
        #[arg(long, default_value_t = DEFAULT_TIME_STEPS)]
        time_steps: u32,

        /// API base URL. Overrides CHESSDEMO_PREDICT_URL.
        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Computer,
    Pvp,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorArg {
    White,
    Black,
}

impl Cli {
    fn game_mode(&self) -> GameMode {
        match (self.mode, self.color) {
            (ModeArg::Pvp, _) => GameMode::VsPlayer,
            (ModeArg::Computer, ColorArg::White) => GameMode::VsComputer {
                human: Color::White,
            },
            (ModeArg::Computer, ColorArg::Black) => GameMode::VsComputer {
                human: Color::Black,
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = DemoConfig::from_env();
    let _guard = init_tracing(config.log_path.as_deref())?;

    match cli.command {
        Some(Commands::Predict {
            ref ticker,
            period,
            days,
            time_steps,
            ref url,
        }) => {
            let url = url.clone().unwrap_or_else(|| config.predict_url.clone());
            let request = PredictionRequest::new(ticker)
                .with_period(period)
                .with_predict_days(days)
                .with_time_steps(time_steps);
            run_predict(&url, &request).await
        }
        None => {
            if let Some(ref engine) = cli.engine {
                config.engine_path = Some(engine.clone());
            }
            if let Some(skill) = cli.skill {
                config.skill_level = skill;
            }
            run_game(&cli, &config).await
        }
    }
}

/// Log to `log_path` when given, to stderr otherwise. `RUST_LOG` overrides
/// the default `info` filter.
fn init_tracing(log_path: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(path) = log_path else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("log path has no file name: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();
    Ok(Some(guard))
}

async fn run_predict(url: &str, request: &PredictionRequest) -> anyhow::Result<()> {
    let client = PredictClient::new(url)?;
    let report = forecast_report(&client, request)
        .await
        .with_context(|| format!("prediction for {} failed", request.ticker))?;
    print!("{}", report);
    Ok(())
}

async fn run_game(cli: &Cli, config: &DemoConfig) -> anyhow::Result<()> {
    let options = SessionOptions {
        mode: cli.game_mode(),
        fen: cli.fen.clone(),
        settings: config.search,
        skill_level: config.skill_level,
    };
    let engines = SessionEngines::start(config);
    let handle = spawn_session(options, engines, Box::new(BellSink))?;

    let (snapshot, mut events) = handle.subscribe().await?;
    print_snapshot(&snapshot, cli.json);
    if !cli.json {
        println!("Type 'help' for commands.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_analysis = String::new();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match repl::parse_line(&line) {
                    Ok(UserInput::Quit) => break,
                    Ok(input) => {
                        if let Err(e) = run_input(&handle, input).await {
                            println!("{}", e);
                        }
                    }
                    Err(e) => println!("{}", e),
                }
            }

            event = events.recv() => {
                match event {
                    Ok(SessionEvent::StateChanged(snapshot)) => {
                        last_analysis.clear();
                        print_snapshot(&snapshot, cli.json);
                    }
                    Ok(SessionEvent::AnalysisChanged(analysis)) => {
                        let line = render::analysis_line(&analysis);
                        if line != last_analysis {
                            if cli.json {
                                println!("{}", serde_json::to_string(&analysis)?);
                            } else {
                                println!("{}", line);
                            }
                            last_analysis = line;
                        }
                    }
                    Ok(SessionEvent::EngineUnavailable(role)) => {
                        println!("The {} engine is unavailable.", role);
                    }
                    Ok(SessionEvent::Error(e)) => println!("error: {}", e),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::debug!("Skipped {} session events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

/// Run one command. State changes are printed from the event stream.
async fn run_input(handle: &SessionHandle, input: UserInput) -> Result<(), SessionError> {
    match input {
        UserInput::Move {
            from,
            to,
            promotion,
        } => handle.make_move(from, to, promotion).await.map(drop),
        UserInput::Click(square) => handle.click(square).await.map(drop),
        UserInput::Back => handle.step_back().await.map(drop),
        UserInput::Next => handle.step_forward().await.map(drop),
        UserInput::Goto(index) => handle.jump_to(index).await.map(drop),
        UserInput::NewGame(mode) => handle.new_game(mode).await.map(drop),
        UserInput::Flip => handle.flip_board().await.map(drop),
        UserInput::ToggleBestMove => {
            let current = handle.get_snapshot().await?;
            handle
                .set_show_best_move(!current.show_best_move)
                .await
                .map(drop)
        }
        UserInput::Skill(level) => handle.set_skill_level(level).await.map(drop),
        UserInput::ShowFen => {
            println!("{}", handle.get_snapshot().await?.fen);
            Ok(())
        }
        UserInput::LoadFen(fen) => handle.load_fen(fen).await.map(drop),
        UserInput::Help => {
            println!("{}", repl::HELP);
            Ok(())
        }
        UserInput::Quit => Ok(()),
    }
}

fn print_snapshot(snapshot: &SessionSnapshot, json: bool) {
    if json {
        match serde_json::to_string(snapshot) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::error!("Failed to serialize snapshot: {}", e),
        }
    } else {
        print!("{}", render::snapshot(snapshot));
    }
}
