use batchsplit_fs::SourceError;
use batchsplit_runtime::EnvValueError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    /// The record source could not be opened or read.
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("invalid {name}: {value} (expected a positive integer)")]
    InvalidLimit { name: &'static str, value: String },
}

impl From<EnvValueError> for BatchError {
    fn from(err: EnvValueError) -> Self {
        BatchError::InvalidLimit {
            name: err.var,
            value: err.value,
        }
    }
}
