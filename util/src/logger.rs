//! Logging setup for the simulator executables
//!
//! Records go to the terminal and to the session's log file. Per-cycle trace
//! output is only ever written to the log file so the terminal stays readable
//! while a simulation runs.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{info, Level, Record};
use std::fmt::Arguments;
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Most verbose level ever written to the terminal.
pub const MAX_TERMINAL_LEVEL: LevelFilter = LevelFilter::Debug;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The minimum log level must include info messages, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// `min_level` must be at least as verbose as `Info`. This must only be
/// called once per process.
pub fn logger_init(min_level: LevelFilter, session: &Session) -> Result<(), LoggerInitError> {
    if min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let log_file = fern::log_file(session.log_file_path.clone())
        .map_err(LoggerInitError::LogFileInitError)?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                format_record(session::get_elapsed_seconds(), record, message)
            ))
        })
        .level(min_level)
        .chain(
            fern::Dispatch::new()
                .level(terminal_level(min_level))
                .chain(std::io::stdout()),
        )
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?} (terminal {:?})", min_level, terminal_level(min_level));
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

/// Level used for the terminal output given the requested minimum level.
pub fn terminal_level(min_level: LevelFilter) -> LevelFilter {
    min_level.min(MAX_TERMINAL_LEVEL)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Format a record, including the target for debug and trace records.
fn format_record(elapsed_s: f64, record: &Record, message: &Arguments) -> String {
    if record.level() > Level::Info {
        format!(
            "[{:10.6} {}] {}: {}",
            elapsed_s,
            level_to_str(record.level()),
            record.target(),
            message
        )
    } else {
        format!(
            "[{:10.6} {}] {}",
            elapsed_s,
            level_to_str(record.level()),
            message
        )
    }
}

/// Get the string representation of a log level
fn level_to_str(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info => "INF".normal(),
        Level::Warn => "WRN".yellow(),
        Level::Error => "ERR".red().bold(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_terminal_level() {
        assert_eq!(terminal_level(LevelFilter::Trace), LevelFilter::Debug);
        assert_eq!(terminal_level(LevelFilter::Debug), LevelFilter::Debug);
        assert_eq!(terminal_level(LevelFilter::Info), LevelFilter::Info);
    }

    #[test]
    fn test_format_record() {
        colored::control::set_override(false);

        let record = Record::builder()
            .args(format_args!("pose updated"))
            .level(Level::Debug)
            .target("sim_lib::sim_loop")
            .build();
        assert_eq!(
            format_record(1.5, &record, record.args()),
            "[  1.500000 DBG] sim_lib::sim_loop: pose updated"
        );

        let record = Record::builder()
            .args(format_args!("cycle overran"))
            .level(Level::Warn)
            .target("sim_exec")
            .build();
        assert_eq!(
            format_record(0.25, &record, record.args()),
            "[  0.250000 WRN] cycle overran"
        );
    }
}
