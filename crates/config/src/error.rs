//! Error types for settings loading, validation, and persistence.

use std::{
    cmp::{max, min},
    fmt::Write as _,
    path::{Path, PathBuf},
};

use thiserror::Error;

#[derive(Debug, Error, Clone)]
/// Errors produced while loading, parsing, validating, or saving settings.
pub enum Error {
    #[error("{message}")]
    /// I/O or filesystem read error.
    Read {
        /// Optional path associated with the read error.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
    #[error("{message}")]
    /// JSON parse error with a concrete line/column location and excerpt.
    Parse {
        /// Optional path associated with the parse error.
        path: Option<PathBuf>,
        /// 1-based line number.
        line: usize,
        /// 1-based column number.
        col: usize,
        /// Human-readable error message.
        message: String,
        /// Rendered excerpt including a caret at the error location.
        excerpt: String,
    },
    #[error("{message}")]
    /// Failure writing settings back to disk.
    Write {
        /// Destination path.
        path: PathBuf,
        /// Human-readable error message.
        message: String,
    },
    #[error("invalid value for {field}: {message}")]
    /// A field holds a value that cannot be clamped into range (NaN, infinity).
    Invalid {
        /// Name of the offending field, as it appears in the settings file.
        field: &'static str,
        /// Human-readable error message.
        message: String,
    },
}

impl Error {
    /// Build a parse error from a `serde_json` failure over `source`.
    pub(crate) fn from_json(path: Option<&Path>, source: &str, err: &serde_json::Error) -> Self {
        let line = err.line().max(1);
        let col = err.column().max(1);
        Self::Parse {
            path: path.map(Path::to_path_buf),
            line,
            col,
            message: err.to_string(),
            excerpt: excerpt_at(source, line, col),
        }
    }

    /// Render a human-friendly error message including location and an excerpt when available.
    pub fn pretty(&self) -> String {
        match self {
            Self::Read { path, message } => match path {
                Some(p) => format!("Read error at {}: {}", p.display(), message),
                None => format!("Read error: {}", message),
            },
            Self::Parse {
                path,
                line,
                col,
                message,
                excerpt,
            } => match path {
                Some(p) => format!(
                    "Settings parse error at {}:{}:{}\n{}\n{}",
                    p.display(),
                    line,
                    col,
                    message,
                    excerpt
                ),
                None => format!(
                    "Settings parse error at line {}, column {}\n{}\n{}",
                    line, col, message, excerpt
                ),
            },
            Self::Write { path, message } => {
                format!("Write error at {}: {}", path.display(), message)
            }
            Self::Invalid { field, message } => {
                format!("Invalid setting {}: {}", field, message)
            }
        }
    }

    /// Access the optional path attached to this error.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } => path.as_deref(),
            Self::Write { path, .. } => Some(path),
            Self::Invalid { .. } => None,
        }
    }
}

/// Build a small 2-3 line excerpt with a caret at `(line_no, col_no)`.
pub fn excerpt_at(source: &str, line_no: usize, col_no: usize) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let total = lines.len();
    let start = max(1usize, line_no.saturating_sub(2));
    let end = min(total, line_no + 1);

    let mut out = String::new();
    for n in start..=end {
        let text = lines.get(n - 1).copied().unwrap_or("");
        let _ignored = writeln!(out, " {:>4} | {}", n, text);
        if n == line_no {
            let prefix = format!(" {:>4} | ", n);
            let _ignored = writeln!(
                out,
                "{}{}^",
                " ".repeat(prefix.len()),
                " ".repeat(col_no.saturating_sub(1))
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_marks_column() {
        let src = "{\n  \"castTime\": ,\n}";
        let ex = excerpt_at(src, 2, 15);
        assert!(ex.contains("   2 |   \"castTime\": ,"));
        let caret_line = ex.lines().nth(2).expect("caret line");
        assert_eq!(caret_line.find('^'), Some(8 + 14));
    }

    #[test]
    fn parse_error_carries_location() {
        let src = "{ \"castTime\": oops }";
        let err = serde_json::from_str::<serde_json::Value>(src).expect_err("invalid json");
        let e = Error::from_json(Some(Path::new("config.json")), src, &err);
        match &e {
            Error::Parse { line, col, .. } => {
                assert_eq!(*line, 1);
                assert!(*col > 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(e.pretty().starts_with("Settings parse error at config.json:1:"));
    }
}
