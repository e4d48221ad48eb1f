//! Event types emitted by the log tailer.

use std::fmt;

use time::PrimitiveDateTime;

/// Which recognized signal a log line carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// A bite. After a confirmed catch the same line also marks the container save.
    Hook,
    /// The catch was attached to the rod.
    Pickup,
    /// An explicit save-to-container line.
    Save,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hook => "hook",
            Self::Pickup => "pickup",
            Self::Save => "save",
        })
    }
}

/// A recognized log line.
///
/// Semantics:
/// - `timestamp` is local wall-clock time. It is taken from the line prefix
///   when present and otherwise from the moment the line was read
///   (`stamped_on_read = true`).
/// - Events are immutable and consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Signal classification.
    pub kind: SignalKind,
    /// Local wall-clock time of the line.
    pub timestamp: PrimitiveDateTime,
    /// The line without its trailing newline.
    pub raw_line: String,
    /// True when the line had no parseable timestamp prefix.
    pub stamped_on_read: bool,
}
