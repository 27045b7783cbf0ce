mod config;
pub mod logging;

pub use config::{
    DEFAULT_MAX_BATCH_BYTES, DEFAULT_MAX_RECORD_BYTES, DEFAULT_MAX_RECORDS_PER_BATCH,
    MAX_BATCH_BYTES_ENV, MAX_RECORD_BYTES_ENV, MAX_RECORDS_ENV, PROGRAM_LOG_LEVEL, PROGRAM_NAME,
    EnvValueError, env_usize,
};

pub use logging::init;
