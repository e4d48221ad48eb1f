//! Line classification and timestamp parsing.

use time::{
    OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::{Error, LogEvent, Result, SignalKind};

/// Layout of the timestamp prefix, e.g. `2025.07.03 21:14:05`.
const STAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year].[month].[day] [hour]:[minute]:[second]");

/// Byte length of the timestamp prefix.
const STAMP_LEN: usize = 19;

/// Substring classifier built from configured patterns.
#[derive(Debug, Clone)]
pub struct Classifier {
    /// Bite pattern.
    hook: String,
    /// Pickup pattern.
    pickup: String,
    /// Save pattern.
    save: String,
}

impl Classifier {
    /// Build a classifier, rejecting empty patterns.
    pub fn new(patterns: &config::Patterns) -> Result<Self> {
        for (name, p) in [
            ("hook", &patterns.hook),
            ("pickup", &patterns.pickup),
            ("save", &patterns.save),
        ] {
            if p.trim().is_empty() {
                return Err(Error::EmptyPattern(name));
            }
        }
        Ok(Self {
            hook: patterns.hook.clone(),
            pickup: patterns.pickup.clone(),
            save: patterns.save.clone(),
        })
    }

    /// Classify a single line. Pickup and save are checked before the broader hook pattern.
    pub fn classify(&self, line: &str) -> Option<SignalKind> {
        if line.contains(&self.pickup) {
            Some(SignalKind::Pickup)
        } else if line.contains(&self.save) {
            Some(SignalKind::Save)
        } else if line.contains(&self.hook) {
            Some(SignalKind::Hook)
        } else {
            None
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        let p = config::Patterns::default();
        Self {
            hook: p.hook,
            pickup: p.pickup,
            save: p.save,
        }
    }
}

/// Parse the `YYYY.MM.DD HH:MM:SS` prefix of a line.
pub fn parse_timestamp(line: &str) -> Option<PrimitiveDateTime> {
    let prefix = line.get(..STAMP_LEN)?;
    PrimitiveDateTime::parse(prefix, STAMP_FORMAT).ok()
}

/// Classify `line` and attach its timestamp, falling back to `read_at`.
pub fn parse_line(
    classifier: &Classifier,
    line: &str,
    read_at: PrimitiveDateTime,
) -> Option<LogEvent> {
    let line = line.trim_end_matches(['\r', '\n']);
    let kind = classifier.classify(line)?;
    let (timestamp, stamped_on_read) = match parse_timestamp(line) {
        Some(ts) => (ts, false),
        None => (read_at, true),
    };
    Some(LogEvent {
        kind,
        timestamp,
        raw_line: line.to_string(),
        stamped_on_read,
    })
}

/// Current wall-clock time expressed in `offset`, without the offset attached.
pub fn wall_now(offset: UtcOffset) -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc().to_offset(offset);
    PrimitiveDateTime::new(now.date(), now.time())
}
