//! Logging initialisation.
//!
//! Log output goes to a daily-rolling file (`edpanel.log.YYYY-MM-DD`) and,
//! optionally, to the console. `RUST_LOG` overrides the configured level.

use std::io;
use std::path::{Path, PathBuf};

use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Prefix of the rolling log file names.
pub const LOG_FILE_PREFIX: &str = "edpanel.log";

/// Keeps the non-blocking log writers alive. Drop it last.
#[must_use = "logging stops when the guard is dropped"]
pub struct LoggingGuard {
    _guards: Vec<WorkerGuard>,
    directory: PathBuf,
}

impl LoggingGuard {
    /// Directory the log files are written to.
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// Normalise a path for display: forward slashes on every platform.
pub fn clean_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Initialise the global subscriber.
///
/// `level` is an `EnvFilter` directive such as `info` or `edpanel=debug`.
/// Fails if the log directory cannot be created or a subscriber is already
/// installed.
pub fn init_logging(level: &str, directory: &Path, console: bool) -> io::Result<LoggingGuard> {
    std::fs::create_dir_all(directory)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ));

    let mut guards = Vec::new();

    let file_appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    guards.push(guard);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_timer(timer.clone());

    let console_layer = if console {
        let (writer, guard) = tracing_appender::non_blocking(io::stderr());
        guards.push(guard);
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(false)
                .with_timer(timer),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e.to_string()))?;

    Ok(LoggingGuard {
        _guards: guards,
        directory: directory.to_path_buf(),
    })
}
