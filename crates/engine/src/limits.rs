use batchsplit_runtime::{
    DEFAULT_MAX_BATCH_BYTES, DEFAULT_MAX_RECORD_BYTES, DEFAULT_MAX_RECORDS_PER_BATCH,
    MAX_BATCH_BYTES_ENV, MAX_RECORD_BYTES_ENV, MAX_RECORDS_ENV, env_usize,
};

use crate::BatchError;

/// Capacity thresholds for one batching run. Every field is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    max_batch_bytes: usize,
    max_records_per_batch: usize,
    max_record_bytes: usize,
}

impl BatchLimits {
    pub fn new(
        max_batch_bytes: usize,
        max_records_per_batch: usize,
        max_record_bytes: usize,
    ) -> Result<Self, BatchError> {
        Ok(Self {
            max_batch_bytes: positive("max_batch_bytes", max_batch_bytes)?,
            max_records_per_batch: positive("max_records_per_batch", max_records_per_batch)?,
            max_record_bytes: positive("max_record_bytes", max_record_bytes)?,
        })
    }

    /// Defaults overridden by `BATCHSPLIT_MAX_BATCH_BYTES`,
    /// `BATCHSPLIT_MAX_RECORDS` and `BATCHSPLIT_MAX_RECORD_BYTES`.
    pub fn from_env() -> Result<Self, BatchError> {
        let mut limits = Self::default();

        if let Some(v) = env_usize(MAX_BATCH_BYTES_ENV)? {
            limits.max_batch_bytes = positive(MAX_BATCH_BYTES_ENV, v)?;
        }
        if let Some(v) = env_usize(MAX_RECORDS_ENV)? {
            limits.max_records_per_batch = positive(MAX_RECORDS_ENV, v)?;
        }
        if let Some(v) = env_usize(MAX_RECORD_BYTES_ENV)? {
            limits.max_record_bytes = positive(MAX_RECORD_BYTES_ENV, v)?;
        }

        Ok(limits)
    }

    pub fn with_max_batch_bytes(self, value: usize) -> Result<Self, BatchError> {
        Self::new(value, self.max_records_per_batch, self.max_record_bytes)
    }

    pub fn with_max_records_per_batch(self, value: usize) -> Result<Self, BatchError> {
        Self::new(self.max_batch_bytes, value, self.max_record_bytes)
    }

    pub fn with_max_record_bytes(self, value: usize) -> Result<Self, BatchError> {
        Self::new(self.max_batch_bytes, self.max_records_per_batch, value)
    }

    pub fn max_batch_bytes(&self) -> usize {
        self.max_batch_bytes
    }

    pub fn max_records_per_batch(&self) -> usize {
        self.max_records_per_batch
    }

    pub fn max_record_bytes(&self) -> usize {
        self.max_record_bytes
    }
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            max_batch_bytes: DEFAULT_MAX_BATCH_BYTES,
            max_records_per_batch: DEFAULT_MAX_RECORDS_PER_BATCH,
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
        }
    }
}

fn positive(name: &'static str, value: usize) -> Result<usize, BatchError> {
    if value == 0 {
        return Err(BatchError::InvalidLimit {
            name,
            value: value.to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
#[path = "limits_tests.rs"]
mod tests;
