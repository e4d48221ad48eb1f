//! Line-oriented command console on stdin.
//!
//! Stands in for global hotkeys: each line is one command.

use autocast_engine::Controller;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Help text printed for `help` and unknown commands.
const HELP: &str = "commands: start | stop | restart | toggle | status | set <key> <value> | help | quit";

/// One console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Begin cycling.
    Start,
    /// Stop cycling.
    Stop,
    /// Stop, pause, start.
    Restart,
    /// Flip run state.
    Toggle,
    /// Print a status line.
    Status,
    /// Change a setting by persisted key name.
    Set {
        /// Key, e.g. `castTime`.
        key: String,
        /// Raw value.
        value: String,
    },
    /// Print the command list.
    Help,
    /// Shut down.
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let cmd = match head.to_ascii_lowercase().as_str() {
        "start" => ConsoleCommand::Start,
        "stop" => ConsoleCommand::Stop,
        "restart" => ConsoleCommand::Restart,
        "toggle" => ConsoleCommand::Toggle,
        "status" => ConsoleCommand::Status,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        "set" => {
            let (Some(key), Some(value)) = (words.next(), words.next()) else {
                return Err("usage: set <key> <value>".to_string());
            };
            ConsoleCommand::Set {
                key: key.to_string(),
                value: value.to_string(),
            }
        }
        other => return Err(format!("unknown command {other:?}")),
    };
    if words.next().is_some() {
        return Err(format!("unexpected arguments after {head:?}"));
    }
    Ok(Some(cmd))
}

/// Apply a command. Returns false when the console should exit.
async fn apply(controller: &Controller, cmd: ConsoleCommand) -> bool {
    match cmd {
        ConsoleCommand::Start => {
            if !controller.start() {
                info!("already running");
            }
        }
        ConsoleCommand::Stop => {
            if !controller.stop() {
                info!("not running");
            }
        }
        ConsoleCommand::Restart => controller.restart().await,
        ConsoleCommand::Toggle => {
            controller.toggle();
        }
        ConsoleCommand::Status => {
            println!("{}", controller.snapshot());
        }
        ConsoleCommand::Set { key, value } => match controller.set_field(&key, &value) {
            Ok(()) => info!(key, value, "setting_updated"),
            Err(e) => warn!("{e}"),
        },
        ConsoleCommand::Help => println!("{HELP}"),
        ConsoleCommand::Quit => return false,
    }
    true
}

/// Read commands from stdin until `quit`, EOF, or `shutdown` is cancelled.
/// Cancels `shutdown` on exit so the rest of the app follows.
pub async fn run(controller: Controller, shutdown: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line,
        };
        let line = match line {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "console_read_failed");
                break;
            }
        };
        match parse(&line) {
            Ok(Some(cmd)) => {
                if !apply(&controller, cmd).await {
                    break;
                }
            }
            Ok(None) => {}
            Err(msg) => println!("{msg}\n{HELP}"),
        }
    }
    shutdown.cancel();
}
