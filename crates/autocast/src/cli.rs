//! Command-line interface definitions for autocast.

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use logging::LogArgs;

/// Command-line interface for the `autocast` binary.
#[derive(Parser, Debug)]
#[command(
    name = "autocast",
    about = "Automates the cast/wait/reel cycle from a tailed application log",
    version
)]
pub struct Cli {
    /// Logging controls.
    #[command(flatten)]
    pub log: LogArgs,

    /// Path to the settings file (defaults to ./config.json).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Optional subcommand; defaults to `run`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the controller with a stdin command console.
    Run(RunArgs),
    /// Load and validate the settings file, then exit.
    Check {
        /// Print the effective (clamped) settings as JSON.
        #[arg(long)]
        dump: bool,
    },
    /// Classify every line of a log file and print recognized signals.
    Scan {
        /// Log file to read.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Arguments for `run`.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Override the directory holding `output_log_*.txt`.
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Start cycling immediately instead of waiting for `start`.
    #[arg(long)]
    pub start: bool,

    /// Interval between status lines.
    #[arg(
        long,
        value_parser = humantime::parse_duration,
        default_value = "1s",
        value_name = "DURATION"
    )]
    pub status_every: Duration,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            log_dir: None,
            start: false,
            status_every: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "autocast",
            "--debug",
            "run",
            "--start",
            "--status-every",
            "250ms",
        ])
        .expect("parse");
        assert!(cli.log.debug);
        match cli.command {
            Some(Command::Run(args)) => {
                assert!(args.start);
                assert_eq!(args.status_every, Duration::from_millis(250));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bare_invocation_has_no_subcommand() {
        let cli = Cli::try_parse_from(["autocast", "--config", "x.json"]).expect("parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.config, Some(PathBuf::from("x.json")));
    }
}
