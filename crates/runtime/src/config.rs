use thiserror::Error;

pub const PROGRAM_NAME: &str = "batchsplit";
pub const PROGRAM_LOG_LEVEL: &str = "BATCHSPLIT_LOG_LEVEL";

/// Environment overrides for the batching thresholds.
pub const MAX_BATCH_BYTES_ENV: &str = "BATCHSPLIT_MAX_BATCH_BYTES";
pub const MAX_RECORDS_ENV: &str = "BATCHSPLIT_MAX_RECORDS";
pub const MAX_RECORD_BYTES_ENV: &str = "BATCHSPLIT_MAX_RECORD_BYTES";

/// Soft ceiling on the encoded size of one batch (5 MB).
pub const DEFAULT_MAX_BATCH_BYTES: usize = 5_000_000;
/// Hard ceiling on the number of records in one batch.
pub const DEFAULT_MAX_RECORDS_PER_BATCH: usize = 500;
/// Records larger than this are discarded (1 MB).
pub const DEFAULT_MAX_RECORD_BYTES: usize = 1_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{var}={value:?} is not a non-negative integer")]
pub struct EnvValueError {
    pub var: &'static str,
    pub value: String,
}

/// Read an unsigned integer from the environment.
///
/// Unset and empty variables yield `Ok(None)`. Surrounding whitespace and `_`
/// digit separators are accepted, so `5_000_000` works.
pub fn env_usize(var: &'static str) -> Result<Option<usize>, EnvValueError> {
    let Some(raw) = std::env::var_os(var) else {
        return Ok(None);
    };

    let value = raw.to_string_lossy();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .replace('_', "")
        .parse::<usize>()
        .map(Some)
        .map_err(|_| EnvValueError {
            var,
            value: value.into_owned(),
        })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
