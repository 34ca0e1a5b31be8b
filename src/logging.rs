// Logging setup and conditional logging macros

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

const DEFAULT_FILTER: &str = "warn";
const LOG_FILE_NAME: &str = "password-prowler.log";

/// Initialise `env_logger`. `RUST_LOG` overrides the default `warn` filter.
///
/// When `log_file` is given, records go there instead of stderr, which keeps
/// the terminal UI's alternate screen clean.
///
/// # Errors
///
/// Returns an error if the log file or its directory cannot be created.
pub fn init(log_file: Option<&Path>) -> io::Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_FILTER));

    if let Some(path) = log_file {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    // A second init (e.g. from tests) leaves the first logger in place
    if let Err(e) = builder.try_init() {
        log::debug!("Logger already initialised: {e}");
    }
    Ok(())
}

/// Log file location for TUI mode, under the user's cache directory.
#[must_use]
pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("password-prowler").join(LOG_FILE_NAME))
}

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{}};
}

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        log::info!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{}};
}
