//! Follow the newest log file in a directory.

use std::{
    fs::{self, File},
    io::{Read, Seek, SeekFrom},
    path::{Path, PathBuf},
    time::SystemTime,
};

use time::PrimitiveDateTime;
use tracing::{debug, info, trace, warn};

use crate::{Classifier, LogEvent, parse::parse_line};

/// File name prefix of candidate logs.
const LOG_PREFIX: &str = "output_log_";
/// File name suffix of candidate logs.
const LOG_SUFFIX: &str = ".txt";
/// Largest backlog read in one poll; anything bigger is skipped.
pub const MAX_READ_BYTES: u64 = 10 * 1024 * 1024;

/// Platform default log directory (`<LocalLow>/VRChat/VRChat`).
pub fn default_log_dir() -> Option<PathBuf> {
    let local = dirs::data_local_dir()?;
    let base = local.parent().map(|p| p.join("LocalLow")).unwrap_or(local);
    Some(base.join("VRChat").join("VRChat"))
}

/// Find the most recently modified `output_log_*.txt` in `dir`.
pub fn find_latest_log(dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.starts_with(LOG_PREFIX) && name.ends_with(LOG_SUFFIX)
        })
        .filter_map(|e| {
            let meta = e.metadata().ok()?;
            if !meta.is_file() {
                return None;
            }
            let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            Some((mtime, e.path()))
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, p)| p)
}

/// Incremental reader over the newest log file.
///
/// Semantics:
/// - The first file found is followed from its current end; older content is
///   not replayed.
/// - A newer file (rotation) is followed from its start.
/// - A file that shrinks below the read position is re-read from 0.
/// - Partial trailing lines are buffered until their newline arrives.
#[derive(Debug)]
pub struct Tail {
    /// Directory scanned for candidate logs.
    dir: PathBuf,
    /// Line classifier.
    classifier: Classifier,
    /// File currently followed.
    current: Option<PathBuf>,
    /// Byte offset of the next read.
    position: u64,
    /// Bytes of an incomplete trailing line.
    partial: Vec<u8>,
    /// Whether any file has been opened yet.
    opened_once: bool,
}

impl Tail {
    /// Follow logs in `dir`; nothing is opened until the first poll.
    pub fn new(dir: PathBuf, classifier: Classifier) -> Self {
        Self {
            dir,
            classifier,
            current: None,
            position: 0,
            partial: Vec::new(),
            opened_once: false,
        }
    }

    /// Path of the file currently followed.
    pub fn current(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// Switch to the newest file if it changed. Returns true on a switch.
    fn refresh_file(&mut self) -> bool {
        let Some(latest) = find_latest_log(&self.dir) else {
            return false;
        };
        if self.current.as_deref() == Some(latest.as_path()) {
            return false;
        }
        let start = if self.opened_once {
            0
        } else {
            fs::metadata(&latest).map(|m| m.len()).unwrap_or(0)
        };
        info!(path = %latest.display(), start, "log_file_switched");
        self.current = Some(latest);
        self.position = start;
        self.partial.clear();
        self.opened_once = true;
        true
    }

    /// Read appended bytes from the current file.
    fn read_new(&mut self) -> Vec<u8> {
        let Some(path) = self.current.clone() else {
            return Vec::new();
        };
        let mut file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "log_open_failed");
                return Vec::new();
            }
        };
        let size = match file.metadata() {
            Ok(m) => m.len(),
            Err(_) => return Vec::new(),
        };
        if self.position > size {
            debug!(path = %path.display(), "log_truncated");
            self.position = 0;
            self.partial.clear();
        }
        if self.position >= size {
            return Vec::new();
        }
        let pending = size - self.position;
        if pending > MAX_READ_BYTES {
            warn!(bytes = pending, "log_backlog_skipped");
            self.position = size;
            self.partial.clear();
            return Vec::new();
        }
        if file.seek(SeekFrom::Start(self.position)).is_err() {
            return Vec::new();
        }
        let mut buf = Vec::with_capacity(pending as usize);
        match file.take(pending).read_to_end(&mut buf) {
            Ok(n) => {
                self.position += n as u64;
                buf
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "log_read_failed");
                Vec::new()
            }
        }
    }

    /// Poll once: follow rotation, read appended bytes, and return recognized events.
    pub fn poll(&mut self, read_at: PrimitiveDateTime) -> Vec<LogEvent> {
        self.refresh_file();
        let fresh = self.read_new();
        if fresh.is_empty() {
            return Vec::new();
        }
        self.partial.extend_from_slice(&fresh);
        let Some(last_nl) = self.partial.iter().rposition(|b| *b == b'\n') else {
            return Vec::new();
        };
        let complete: Vec<u8> = self.partial.drain(..=last_nl).collect();
        let text = String::from_utf8_lossy(&complete);
        let events: Vec<LogEvent> = text
            .lines()
            .filter_map(|line| parse_line(&self.classifier, line, read_at))
            .collect();
        if !events.is_empty() {
            trace!(count = events.len(), "log_events_parsed");
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use std::{fs::OpenOptions, io::Write};

    use time::macros::datetime;

    use super::*;
    use crate::SignalKind;

    const NOW: PrimitiveDateTime = datetime!(2025-07-03 21:00);

    fn append(path: &Path, text: &str) {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .expect("open");
        f.write_all(text.as_bytes()).expect("write");
    }

    #[test]
    fn first_file_starts_at_end() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = dir.path().join("output_log_1.txt");
        append(&log, "2025.07.03 20:00:00 Log - SAVED DATA old\n");
        let mut tail = Tail::new(dir.path().to_path_buf(), Classifier::default());
        assert!(tail.poll(NOW).is_empty());
        append(&log, "2025.07.03 21:00:01 Log - SAVED DATA new\n");
        let evs = tail.poll(NOW);
        assert_eq!(evs.len(), 1);
        assert!(evs[0].raw_line.ends_with("new"));
    }

    #[test]
    fn partial_lines_wait_for_newline() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = dir.path().join("output_log_1.txt");
        append(&log, "");
        let mut tail = Tail::new(dir.path().to_path_buf(), Classifier::default());
        tail.poll(NOW);
        append(&log, "2025.07.03 21:00:01 Log - Fish Pickup attached");
        assert!(tail.poll(NOW).is_empty());
        append(&log, " to rod Toggles(True)\nunrelated\n");
        let evs = tail.poll(NOW);
        assert_eq!(evs.len(), 1);
        assert_eq!(evs[0].kind, SignalKind::Pickup);
    }

    #[test]
    fn truncation_rewinds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = dir.path().join("output_log_1.txt");
        append(&log, "padding line that is fairly long\n");
        let mut tail = Tail::new(dir.path().to_path_buf(), Classifier::default());
        tail.poll(NOW);
        fs::write(&log, "SAVED DATA\n").expect("truncate");
        let evs = tail.poll(NOW);
        assert_eq!(evs.len(), 1);
        assert!(evs[0].stamped_on_read);
    }

    #[test]
    fn ignores_non_log_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("notes.txt"), "x").expect("write");
        fs::write(dir.path().join("output_log_a.log"), "x").expect("write");
        assert_eq!(find_latest_log(dir.path()), None);
        fs::write(dir.path().join("output_log_a.txt"), "x").expect("write");
        assert!(find_latest_log(dir.path()).is_some());
    }
}
