use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Errors surfaced by the controller's configuration surface.
///
/// Cycle execution itself never fails: stale signals and transport errors are
/// discarded where they occur.
#[derive(Debug, Error)]
pub enum Error {
    /// A setter received a value that cannot be used.
    #[error("invalid value for {name}: {value}")]
    InvalidSetting {
        /// Setting name, using the persisted key.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// A settings update was rejected by the config layer.
    #[error(transparent)]
    Config(#[from] config::Error),
}
