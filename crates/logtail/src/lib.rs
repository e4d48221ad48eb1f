//! logtail: follow an append-only application log and emit signal events.
//!
//! The log is an external artifact that may buffer, burst, rotate, or be
//! truncated. This crate only reports what it sees:
//! - [`Tail`] incrementally reads the newest `output_log_*.txt` in a directory.
//! - [`Classifier`] maps lines onto [`SignalKind`]s using configured patterns.
//! - [`LogTailer`] runs a `Tail` on a dedicated thread and implements
//!   [`EventSource`], pushing [`LogEvent`]s into a tokio channel.
//!
//! Deciding whether an event matters is left to the consumer.

mod error;
mod event;
mod parse;
mod source;
mod tail;

pub use error::{Error, Result};
pub use event::{LogEvent, SignalKind};
pub use parse::{Classifier, parse_line, parse_timestamp, wall_now};
pub use source::{EventSource, LogTailer};
pub use tail::{MAX_READ_BYTES, Tail, default_log_dir, find_latest_log};
