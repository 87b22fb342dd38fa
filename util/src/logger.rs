//! Generic logger utility functions
//!
//! Logs go to stdout with coloured level tags, and to the session's log file with plain tags.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{self, info, Level, Record};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

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
/// `module_levels` overrides `min_level` for the given module paths, for example to keep the
/// mission tree's edit traces out of a trace level log.
///
/// # Notes
///
/// - `min_level` must include `log::Level::Info`.
///
/// # Safety
///
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    min_level: LevelFilter,
    module_levels: &[(&'static str, LevelFilter)],
    session: &session::Session,
) -> Result<(), LoggerInitError> {
    if min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let log_file = fern::log_file(session.log_file_path.clone())
        .map_err(LoggerInitError::LogFileInitError)?;

    let mut dispatch = fern::Dispatch::new().level(min_level);
    for &(module, level) in module_levels {
        dispatch = dispatch.level_for(module, level);
    }

    dispatch
        .chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{}",
                        format_line(record, message, level_to_str(record.level()))
                    ))
                })
                .chain(std::io::stdout()),
        )
        .chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{}",
                        format_line(record, message, level_tag(record.level()))
                    ))
                })
                .chain(log_file),
        )
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Some(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log level: {:?}", min_level);
    for (module, level) in module_levels {
        info!("    Log level for {}: {:?}", module, level);
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Format a single log line.
///
/// Debug and trace lines include their target, info and above don't.
fn format_line<T: std::fmt::Display>(
    record: &Record,
    message: &std::fmt::Arguments,
    tag: T,
) -> String {
    if record.level() > Level::Info {
        format!(
            "[{:10.6} {}] {}: {}",
            session::get_elapsed_seconds(),
            tag,
            record.target(),
            message
        )
    }
    else {
        format!(
            "[{:10.6} {}] {}",
            session::get_elapsed_seconds(),
            tag,
            message
        )
    }
}

/// Get the three letter tag of a log level
fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Trace => "TRC",
        Level::Debug => "DBG",
        Level::Info => "INF",
        Level::Warn => "WRN",
        Level::Error => "ERR",
    }
}

/// Get the coloured tag of a log level
fn level_to_str(level: Level) -> ColoredString {
    let tag = level_tag(level);

    match level {
        Level::Trace => tag.dimmed().italic(),
        Level::Debug => tag.dimmed(),
        Level::Info => tag.normal(),
        Level::Warn => tag.yellow(),
        Level::Error => tag.red().bold(),
    }
}
