use crate::error::{Result as ServerErrorResult, ServerError};

use std::fmt::{self, Display};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use fern::{Dispatch, FormatCallback};
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

/// Dependencies that log every connection and request below info
const NOISY_TARGETS: [&str; 4] = ["hyper", "hyper_util", "h2", "reqwest"];

/// Destination chosen from the logging config
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    /// Append to a file; never colored
    File(PathBuf),
    Stdout { colored: bool },
}

impl LogSink {
    pub fn new(log_file: Option<PathBuf>, colored: bool) -> Self {
        match log_file {
            Some(path) => Self::File(path),
            None => Self::Stdout { colored },
        }
    }
}

impl Display for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file {}", path.display()),
            Self::Stdout { colored: true } => write!(f, "stdout (colored)"),
            Self::Stdout { colored: false } => write!(f, "stdout"),
        }
    }
}

/// Install the global logger. Call once, before anything logs.
pub fn initialize(
    log_level: parley_config::LogLevel,
    log_file: Option<PathBuf>,
    colored: bool,
) -> ServerErrorResult<()> {
    let level = log_level.0;
    let sink = LogSink::new(log_file, colored);

    let base = NOISY_TARGETS
        .iter()
        .fold(Dispatch::new().level(level), |dispatch, target| {
            dispatch.level_for(*target, level.min(LevelFilter::Info))
        });

    let dispatch = match &sink {
        LogSink::File(path) => base.format(plain_format).chain(open_log_file(path)?),
        LogSink::Stdout { colored: true } => {
            let palette = ColoredLevelConfig::new()
                .trace(Color::Magenta)
                .debug(Color::Blue)
                .info(Color::Green)
                .warn(Color::Yellow)
                .error(Color::Red);
            base.format(move |out, message, record| {
                let level = palette.color(record.level());
                out.finish(format_args!(
                    "{}",
                    format_line(SystemTime::now(), level, message, record)
                ))
            })
            .chain(std::io::stdout())
        }
        LogSink::Stdout { colored: false } => base.format(plain_format).chain(std::io::stdout()),
    };

    dispatch.apply().map_err(|e| ServerError::Logger {
        message: format!("Failed to initialize logger: {e}"),
    })?;

    log::info!("Logging at {level} to {sink}");
    Ok(())
}

fn plain_format(out: FormatCallback<'_>, message: &fmt::Arguments<'_>, record: &log::Record<'_>) {
    out.finish(format_args!(
        "{}",
        format_line(SystemTime::now(), record.level(), message, record)
    ))
}

/// `[timestamp - LEVEL] message [file:line]`
pub(crate) fn format_line(
    at: SystemTime,
    level: impl Display,
    message: &fmt::Arguments<'_>,
    record: &log::Record<'_>,
) -> String {
    format!(
        "[{} - {level}] {message} [{}:{}]",
        humantime::format_rfc3339(at),
        record.file().unwrap_or("unknown"),
        record.line().unwrap_or(0),
    )
}

pub(crate) fn open_log_file(path: &Path) -> ServerErrorResult<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ServerError::Logger {
            message: format!("Failed to open log file {}: {e}", path.display()),
        })
}
