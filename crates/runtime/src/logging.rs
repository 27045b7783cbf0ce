use std::sync::OnceLock;

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::config::{PROGRAM_LOG_LEVEL, PROGRAM_NAME};

/// Stderr logger shared by every batchsplit binary.
pub struct Logger {
    level: Level,
}

impl Logger {
    fn line(&self, record: &Record<'_>) -> String {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        format!(
            "{} {} {} [{}] {}",
            timestamp,
            PROGRAM_NAME,
            record.level(),
            short_target(record.target()),
            record.args()
        )
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", self.line(record));
        }
    }

    fn flush(&self) {}
}

/// `batchsplit_engine::builder` -> `engine::builder`
fn short_target(target: &str) -> &str {
    target
        .strip_prefix(PROGRAM_NAME)
        .and_then(|rest| rest.strip_prefix('_'))
        .unwrap_or(target)
}

fn level_from_env() -> Level {
    std::env::var(PROGRAM_LOG_LEVEL)
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .and_then(|filter| filter.to_level())
        .unwrap_or(Level::Warn)
}

/// Install the logger, honouring `BATCHSPLIT_LOG_LEVEL` (default `warn`).
pub fn init() -> Result<(), SetLoggerError> {
    init_with_level(level_from_env())
}

/// Install the logger at a fixed level. Only the first call has any effect.
pub fn init_with_level(level: Level) -> Result<(), SetLoggerError> {
    static LOGGER: OnceLock<Logger> = OnceLock::new();

    // The level handed to the first call wins; later calls must not touch
    // the global max level or it would disagree with the installed logger.
    let first_call = LOGGER.get().is_none();

    let logger = LOGGER.get_or_init(|| Logger { level });

    if first_call {
        log::set_logger(logger)?;
        log::set_max_level(level.to_level_filter());
    }

    Ok(())
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
