//! Log output setup for the terminal front end.
//!
//! The terminal is owned by the user interface while a game runs, so records only go to stderr
//! when `RUST_LOG` asks for them explicitly. With a log file they are appended there at `info`
//! unless `RUST_LOG` says otherwise.

use std::{fs::OpenOptions, path::Path};

use color_eyre::eyre::{Result, WrapErr as _};
use env_logger::{Builder, Env, Target};

/// Installs the global logger.
///
/// # Errors
///
/// This function returns an error if the log file cannot be opened or if a logger is already
/// installed.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let default_filter = if log_file.is_some() { "info" } else { "off" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter));

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .wrap_err_with(|| format!("failed to open log file {}", path.display()))?;
        let _ = builder.target(Target::Pipe(Box::new(file)));
    }

    builder
        .try_init()
        .wrap_err("failed to install the logger")
}
