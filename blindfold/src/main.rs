//! Blindfold CLI - one-shot conversations with a UCI chess engine.
//!
//! Each invocation spawns the engine, completes the `uci` handshake, runs a
//! single subcommand and closes the session again:
//!
//! - **`info`**: print the engine's identity and advertised options.
//! - **`ready`**: liveness probe (`isready` / `readyok`).
//! - **`bestmove`**: apply options, set a position and search it.
//!
//! Engine selection and timeouts come from [`config`] (environment) and can
//! be overridden by flags. Logs go to stderr; stdout carries only results.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use engine::{SearchFilter, SessionConfig, UciError, UciSession};

mod config;
mod output;
mod resolve;

/// Top-level CLI arguments.
#[derive(Parser)]
#[command(name = "blindfold", version, about = "Talk to a UCI chess engine")]
struct Cli {
    /// Engine executable name or path. Defaults to `BLINDFOLD_ENGINE` or `stockfish`.
    #[arg(short, long, global = true)]
    engine: Option<String>,

    /// Seconds the engine gets to finish the handshake.
    #[arg(long, global = true)]
    handshake_timeout: Option<u64>,

    /// Seconds a search or readiness probe may take before the engine is abandoned.
    #[arg(long, global = true)]
    search_timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the engine's identity and options.
    Info {
        /// Print JSON instead of UCI-style lines.
        #[arg(long)]
        json: bool,
    },
    /// Check that the engine answers `isready`.
    Ready,
    /// Search a position and print the engine's best move.
    Bestmove {
        /// Position as a FEN string. Defaults to the start position.
        #[arg(long, conflicts_with = "moves")]
        fen: Option<String>,

        /// Moves from the start position in coordinate notation.
        #[arg(long, num_args = 1..)]
        moves: Vec<String>,

        /// Search depth. Defaults to `BLINDFOLD_DEPTH` or 10.
        #[arg(short, long, allow_negative_numbers = true)]
        depth: Option<i32>,

        /// Engine option as NAME=VALUE. Repeatable.
        #[arg(short = 'o', long = "option", value_parser = parse_assignment)]
        options: Vec<(String, String)>,

        /// Also print the info lines of the deepest completed iteration.
        #[arg(long)]
        multi_info: bool,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Error type for CLI operations.
#[derive(Debug, thiserror::Error)]
enum CliError {
    /// The engine session failed.
    #[error("{0}")]
    Engine(#[from] UciError),

    /// The engine answered `isready` with something other than `readyok`.
    #[error("engine is not ready")]
    NotReady,

    /// JSON output could not be produced.
    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Split `NAME=VALUE` at the first `=`. A bare name is a button press.
fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw.split_once('=').unwrap_or((raw, ""));
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing option name in '{}'", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn session_config(cli: &Cli) -> SessionConfig {
    let handshake_secs = cli
        .handshake_timeout
        .unwrap_or_else(config::get_handshake_timeout_secs);
    let search_secs = cli.search_timeout.or_else(config::get_search_timeout_secs);
    SessionConfig::default()
        .with_handshake_timeout(Duration::from_secs(handshake_secs))
        .with_response_timeout(search_secs.map(Duration::from_secs))
}

/// Apply `NAME=VALUE` pairs, converting each value by the option's kind.
async fn apply_options(
    session: &mut UciSession,
    options: &[(String, String)],
) -> Result<(), CliError> {
    for (name, raw) in options {
        let Some(option) = session.option(name) else {
            tracing::warn!("Engine has no option '{}', skipping", name);
            continue;
        };
        let value = option.value_from_str(raw)?;
        session.set_option(name, value).await?;
    }
    Ok(())
}

async fn execute(session: &mut UciSession, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Info { json } => {
            let report = output::EngineReport {
                identity: session.identity(),
                options: session.options(),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", output::format_report(&report));
            }
        }
        Commands::Ready => {
            if !session.is_ready().await? {
                return Err(CliError::NotReady);
            }
            println!("readyok");
        }
        Commands::Bestmove {
            fen,
            moves,
            depth,
            options,
            multi_info,
            json,
        } => {
            if !options.is_empty() {
                apply_options(session, &options).await?;
                if !session.is_ready().await? {
                    return Err(CliError::NotReady);
                }
            }

            match fen.as_deref() {
                Some(fen) => session.set_position(fen).await?,
                None => session.set_position_moves(None, &moves).await?,
            }

            let filter = if multi_info || json {
                SearchFilter::highest_depth_only()
            } else {
                SearchFilter::default()
            };
            let depth = depth.unwrap_or_else(config::get_depth);
            let result = session.search(depth, filter).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                for line in &result.infos {
                    println!("{}", output::format_info(line));
                }
                println!("{}", output::format_bestmove(&result));
            }
        }
    }
    Ok(())
}

/// Entry point.
///
/// The session is always closed before returning, whichever way the
/// subcommand ends.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let engine_name = cli.engine.clone().unwrap_or_else(config::get_engine);
    let engine_path: PathBuf = resolve::resolve_engine_path(&engine_name);
    tracing::info!("Using engine {:?}", engine_path);

    let mut session = UciSession::spawn(&engine_path, session_config(&cli)).await?;
    let outcome = execute(&mut session, cli.command).await;
    session.close().await;

    outcome
}
