//! Process-wide logging bootstrap.
//!
//! Ledger code emits `key=value` messages through the `log` facade
//! (`event=... module=... status=...`). This module wires the facade to
//! `flexi_logger`, writing either to stderr or to rotating files.
//!
//! Initialization is idempotent for the same settings, rejects attempts to
//! switch level or destination afterwards, and never panics.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use once_cell::sync::OnceCell;
use std::path::PathBuf;

use crate::config::LoggingConfig;

const LOG_FILE_BASENAME: &str = "pos_ledger";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    directory: Option<PathBuf>,
    _logger: LoggerHandle,
}

/// Starts the logger described by `config`.
///
/// # Errors
/// - Unsupported level names.
/// - A log directory that cannot be created.
/// - A second call with a different level or directory.
pub fn init_logging(config: &LoggingConfig) -> Result<(), String> {
    let level = normalize_level(&config.level)?;
    let directory = config.directory.clone();

    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState, String> {
        let logger = Logger::try_with_str(level)
            .map_err(|err| format!("invalid log level `{level}`: {err}"))?;

        let logger = match &directory {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(|err| {
                    format!("failed to create log directory `{}`: {err}", dir.display())
                })?;
                logger
                    .log_to_file(
                        FileSpec::default()
                            .directory(dir.as_path())
                            .basename(LOG_FILE_BASENAME),
                    )
                    .rotate(
                        Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                        Naming::Numbers,
                        Cleanup::KeepLogFiles(MAX_LOG_FILES),
                    )
                    .write_mode(WriteMode::BufferAndFlush)
                    .append()
                    .format_for_files(flexi_logger::detailed_format)
                    .start()
            }
            None => logger.log_to_stderr().start(),
        }
        .map_err(|err| format!("failed to start logger: {err}"))?;

        info!(
            "event=logging_init module=logging status=ok level={} destination={} version={}",
            level,
            directory
                .as_ref()
                .map(|dir| dir.display().to_string())
                .unwrap_or_else(|| "stderr".to_string()),
            env!("CARGO_PKG_VERSION")
        );

        Ok(LoggingState {
            level,
            directory: directory.clone(),
            _logger: logger,
        })
    })?;

    if state.directory != directory {
        return Err(format!(
            "logging already initialized at `{}`; refusing to switch",
            describe(&state.directory)
        ));
    }
    if state.level != level {
        return Err(format!(
            "logging already initialized with level `{}`; refusing to switch to `{}`",
            state.level, level
        ));
    }

    Ok(())
}

/// `(level, directory)` of the active logger, or `None` before init.
pub fn logging_status() -> Option<(&'static str, Option<PathBuf>)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.directory.clone()))
}

fn describe(directory: &Option<PathBuf>) -> String {
    directory
        .as_ref()
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|| "stderr".to_string())
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" => Ok("off"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error|off"
        )),
    }
}
