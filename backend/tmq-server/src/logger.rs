use crate::error::{Result as ServerErrorResult, ServerError};

use tmq_config::LogLevel;

use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::{Level, Record, info};

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Append to a file, never colored
    File(PathBuf),
    /// Stdout with ANSI level colors
    ColoredStdout,
    /// Stdout without colors (systemd, docker logs)
    PlainStdout,
}

impl LogTarget {
    pub fn from_config(log_file: Option<PathBuf>, colored: bool) -> Self {
        match log_file {
            Some(path) => Self::File(path),
            None if colored => Self::ColoredStdout,
            None => Self::PlainStdout,
        }
    }
}

/// `[<rfc3339> - <LEVEL>] <message> [<module>]`
pub fn format_line(level: impl fmt::Display, message: &fmt::Arguments, record: &Record) -> String {
    format!(
        "[{} - {}] {} [{}]",
        humantime::format_rfc3339(SystemTime::now()),
        level,
        message,
        record.target()
    )
}

/// Install the global `log` dispatcher.
#[track_caller]
pub fn initialize(level: LogLevel, target: LogTarget) -> ServerErrorResult<()> {
    let level_filter = level.0;

    let output = match &target {
        LogTarget::File(path) => {
            let file = fern::log_file(path).map_err(|e| ServerError::Logger {
                message: format!("Failed to open log file {}: {}", path.display(), e),
            })?;
            Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!("{}", format_line(record.level(), message, record)))
                })
                .chain(file)
        }
        LogTarget::ColoredStdout => {
            let colors = ColoredLevelConfig::new()
                .trace(Color::Magenta)
                .debug(Color::Blue)
                .info(Color::Green)
                .warn(Color::Yellow)
                .error(Color::Red);
            Dispatch::new()
                .format(move |out, message, record| {
                    out.finish(format_args!(
                        "{}",
                        format_line(colors.color(record.level()), message, record)
                    ))
                })
                .chain(std::io::stdout())
        }
        LogTarget::PlainStdout => Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!("{}", format_line(record.level(), message, record)))
            })
            .chain(std::io::stdout()),
    };

    Dispatch::new()
        .level(level_filter)
        // sqlx logs every statement at info
        .level_for("sqlx", level_filter.min(Level::Warn.to_level_filter()))
        .chain(output)
        .apply()
        .map_err(|e| ServerError::Logger {
            message: format!("Failed to initialize logger: {e}"),
        })?;

    match &target {
        LogTarget::File(path) => info!(
            "Logger initialized: level={:?}, file={}",
            level_filter,
            path.display()
        ),
        _ => info!("Logger initialized: level={:?}, stdout", level_filter),
    }

    Ok(())
}
