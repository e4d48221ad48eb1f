//! Binary entrypoint for autocast.
use std::{fs, path::Path, process::ExitCode, time::Duration};

use clap::Parser;
use logtail::{Classifier, parse_line, wall_now};
use time::UtcOffset;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*};

/// Run-mode wiring.
mod app;
/// Command-line definitions.
mod cli;
/// Stdin command console.
mod console;

use crate::cli::{Cli, Command, RunArgs};

/// Failures that end the process.
#[derive(Debug, thiserror::Error)]
enum Error {
    /// Settings could not be read, parsed, or written.
    #[error("{}", .0.pretty())]
    Config(#[from] config::Error),
    /// The actuator socket could not be set up.
    #[error("actuator: {0}")]
    Osc(#[from] oscpress::Error),
    /// The log source could not be set up.
    #[error("log source: {0}")]
    Tail(#[from] logtail::Error),
    /// Runtime or file I/O failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// `check`: strict load, optionally dumping the effective settings.
fn check(path: &Path, dump: bool) -> Result<(), Error> {
    let settings = config::load_from_path(path)?;
    if dump {
        match serde_json::to_string_pretty(&settings) {
            Ok(json) => println!("{json}"),
            Err(e) => println!("failed to serialize settings: {e}"),
        }
    } else {
        println!("OK");
    }
    Ok(())
}

/// `scan`: print every recognized signal in `file`.
fn scan(path: &Path, file: &Path, offset: UtcOffset) -> Result<(), Error> {
    let settings = config::load_or_default(path);
    let classifier = Classifier::new(&settings.patterns)?;
    let text = fs::read(file)?;
    let text = String::from_utf8_lossy(&text);
    let read_at = wall_now(offset);
    let mut count = 0usize;
    for line in text.lines() {
        if let Some(ev) = parse_line(&classifier, line, read_at) {
            count += 1;
            let mark = if ev.stamped_on_read { "~" } else { " " };
            println!("{:<6} {}{} {}", ev.kind, ev.timestamp, mark, ev.raw_line);
        }
    }
    println!("{count} signals");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Must be read while the process is still single-threaded.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    tracing_subscriber::registry()
        .with(logging::env_filter_from_spec(&cli.log.spec()))
        .with(fmt::layer().compact())
        .try_init()
        .ok();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);

    let result = match cli.command {
        Some(Command::Check { dump }) => check(&config_path, dump),
        Some(Command::Scan { file }) => scan(&config_path, &file, offset),
        Some(Command::Run(args)) => run(args, &config_path, offset),
        None => run(RunArgs::default(), &config_path, offset),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Build the runtime and hand off to [`app::run`].
fn run(args: RunArgs, config_path: &Path, offset: UtcOffset) -> Result<(), Error> {
    let settings = config::load_or_default(config_path);
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = rt.block_on(app::run(args, config_path, settings, offset));
    // A pending stdin read cannot be cancelled; don't wait on it.
    rt.shutdown_timeout(Duration::from_millis(250));
    result
}
