//! Command-line host for prepkit sessions.
//!
//! ```bash
//! # Interactive: one JSON command per line on stdin
//! prepkit --db ./app.db
//!
//! # Single command
//! prepkit --db ./app.db -c '["map", "SELECT * FROM users"]'
//! ```

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use eyre::{Result, WrapErr};
use prepkit_core::{Session, SessionConfig};
use tracing_subscriber::EnvFilter;

mod command;
mod dispatch;

/// Runs prep/exec/query commands against an embedded `SQLite` database.
#[derive(Parser, Debug)]
#[command(name = "prepkit", version, about)]
struct Args {
    /// Database file
    #[arg(long, default_value = prepkit_core::config::DEFAULT_DB_PATH, env = "PREPKIT_DB")]
    db: PathBuf,

    /// Open the database without write access
    #[arg(long, env = "PREPKIT_READ_ONLY")]
    read_only: bool,

    /// Maximum number of cached statements, capped at 10000
    #[arg(long, default_value_t = 10_000, env = "PREPKIT_MAX_STATEMENTS")]
    max_statements: u64,

    /// Maximum records printed per query (0 for all)
    #[arg(short = 'l', long, default_value_t = 0)]
    limit: i64,

    /// Run a single command and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = SessionConfig {
        read_only: args.read_only,
        max_statements: args.max_statements,
        ..SessionConfig::at(&args.db)
    };
    let session = Session::open(config)
        .wrap_err_with(|| format!("failed to open {}", args.db.display()))?;
    tracing::info!(db = %args.db.display(), "session opened");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match args.command {
        Some(line) => dispatch::run_line(&session, &line, &mut out, args.limit)?,
        None => dispatch::run_lines(&session, io::stdin().lock(), &mut out, args.limit)?,
    }
    out.flush().wrap_err("failed to flush output")
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .try_init();
}
