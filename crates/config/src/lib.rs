//! Persisted settings and timing policy for the autocast cycle.
//!
//! - [`Settings`]: user-editable cycle timings and modes, stored as flat JSON
//! - [`Policy`]: admission windows and recovery budgets, nested in the same file
//! - [`load_or_default`] / [`save_to_path`]: persistence that never blocks startup
#![allow(missing_docs)]

mod defaults;
mod error;
mod loader;
mod policy;
mod settings;

pub use error::{Error, excerpt_at};
pub use loader::{
    DEFAULT_FILE_NAME, default_config_path, load_from_path, load_from_str, load_or_default,
    save_to_path,
};
pub use policy::Policy;
pub use settings::{MIN_CAST_TIME, OscTarget, Patterns, Settings};
