use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Convenient result type for the logtail crate.
pub type Result<T> = StdResult<T, Error>;

/// Errors surfaced while locating or following the log.
#[derive(Debug, Error)]
pub enum Error {
    /// No log directory was configured and none could be derived from the platform.
    #[error("no log directory configured and no platform default available")]
    NoLogDir,

    /// The background reader thread could not be started.
    #[error("failed to spawn tail thread: {0}")]
    Spawn(#[source] io::Error),

    /// A signal pattern is empty and would match every line.
    #[error("empty {0} pattern")]
    EmptyPattern(&'static str),
}
