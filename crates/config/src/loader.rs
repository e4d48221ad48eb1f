//! Load and save the persisted settings file.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{Error, Settings};

/// File name used when no explicit path is given.
pub const DEFAULT_FILE_NAME: &str = "config.json";

/// Determine the default settings path (`./config.json`).
pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_FILE_NAME)
}

/// Strictly load settings from `path`, returning parse and read failures.
///
/// The result is sanitized.
pub fn load_from_path(path: &Path) -> Result<Settings, Error> {
    let source = fs::read_to_string(path).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    load_from_str(&source, Some(path))
}

/// Parse settings from JSON text.
pub fn load_from_str(source: &str, path: Option<&Path>) -> Result<Settings, Error> {
    let settings: Settings =
        serde_json::from_str(source).map_err(|e| Error::from_json(path, source, &e))?;
    Ok(settings.sanitized())
}

/// Load settings, never failing.
///
/// - A missing file yields defaults, which are written back so the user has a
///   file to edit.
/// - An unreadable or malformed file is reported and replaced by defaults in
///   memory only.
pub fn load_or_default(path: &Path) -> Settings {
    match load_from_path(path) {
        Ok(settings) => {
            debug!(path = %path.display(), "settings_loaded");
            settings
        }
        Err(Error::Read { .. }) if !path.exists() => {
            let settings = Settings::default();
            if let Err(e) = save_to_path(&settings, path) {
                warn!("{}", e.pretty());
            }
            settings
        }
        Err(e) => {
            warn!("{}; using default settings", e.pretty());
            Settings::default()
        }
    }
}

/// Write settings as pretty-printed JSON (4-space indent).
pub fn save_to_path(settings: &Settings, path: &Path) -> Result<(), Error> {
    let write_err = |e: io::Error| Error::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut buf = Vec::new();
    let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
    serde::Serialize::serialize(settings, &mut ser).map_err(|e| Error::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    buf.push(b'\n');
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, buf).map_err(write_err)
}
