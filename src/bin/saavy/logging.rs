//! Log output for the TUI binary
//!
//! ratatui owns the terminal while the app runs, so anything written to
//! stdout or stderr lands on top of the UI. Logs go to a file instead.

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use std::{
    ffi::OsString,
    fs::File,
    path::PathBuf,
    sync::Mutex,
};

/// Overrides the log file location
pub const LOG_PATH_VAR: &str = "SAAVY_LOG";

const DEFAULT_LOG_FILE: &str = "saavy.log";

/// `override_path` wins when set and non-empty; otherwise the log lands in
/// the system temp directory.
pub fn log_path(override_path: Option<OsString>) -> PathBuf {
    match override_path {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => std::env::temp_dir().join(DEFAULT_LOG_FILE),
    }
}

/// Install the global subscriber, truncating the log file. Returns the path
/// written to.
pub fn init() -> EyreResult<PathBuf> {
    let path = log_path(std::env::var_os(LOG_PATH_VAR));
    let file = File::create(&path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .init();

    Ok(path)
}
