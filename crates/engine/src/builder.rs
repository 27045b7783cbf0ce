use std::{iter::FusedIterator, mem, path::Path};

use batchsplit_fs::{LineSource, Pulled, RecordSource};
use log::{debug, info, warn};

use crate::{Batch, BatchError, BatchLimits, BatchStats};

/// Outcome of one [`BatchBuilder::next_batch`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Batch(Batch),
    EndOfInput,
}

/// Lazily partitions a record source into bounded batches.
///
/// Nothing is read until the first call to [`next_batch`](Self::next_batch)
/// (or [`Iterator::next`]). Each call pulls records until the in-progress
/// batch cannot admit the next one, then hands the full batch back and keeps
/// the rejected record as the start of the following batch.
///
/// A record is admitted when the batch holds fewer than
/// `max_records_per_batch` records and its bytes plus the record's stay
/// within `max_batch_bytes`. Records longer than `max_record_bytes` are
/// dropped and counted in [`BatchStats::discarded`]. A record that fits the
/// per-record limit but not `max_batch_bytes` is emitted on its own.
///
/// Source errors are returned from the pull that hit them. Records buffered
/// for the in-progress batch at that point are dropped, and the builder is
/// finished from then on.
pub struct BatchBuilder<S> {
    source: S,
    limits: BatchLimits,
    records: Vec<String>,
    bytes: usize,
    stats: BatchStats,
    finished: bool,
}

/// Batch the lines of the file at `path`.
///
/// The file is opened on the first pull, so a missing file surfaces as the
/// first item of the sequence rather than here.
pub fn build_batches<P: AsRef<Path>>(path: P, limits: BatchLimits) -> BatchBuilder<LineSource> {
    BatchBuilder::new(LineSource::new(path), limits)
}

impl<S: RecordSource> BatchBuilder<S> {
    pub fn new(source: S, limits: BatchLimits) -> Self {
        Self {
            source,
            limits,
            records: Vec::new(),
            bytes: 0,
            stats: BatchStats::default(),
            finished: false,
        }
    }

    /// Produce the next batch, or [`Step::EndOfInput`] once the source is
    /// exhausted. After an error every further call returns `EndOfInput`.
    pub fn next_batch(&mut self) -> Result<Step, BatchError> {
        if self.finished {
            return Ok(Step::EndOfInput);
        }

        loop {
            let pulled = self.source.next_record_within(self.limits.max_record_bytes());
            let record = match pulled {
                Ok(Some(Pulled::Record(record))) => record,
                Ok(Some(Pulled::Oversized { bytes })) => {
                    self.stats.discarded += 1;
                    debug!(
                        "[builder] discarding record {}: {} bytes > max_record_bytes {}",
                        self.source.position(),
                        bytes,
                        self.limits.max_record_bytes()
                    );
                    continue;
                }
                Ok(None) => return Ok(self.finish()),
                Err(err) => {
                    self.abandon();
                    return Err(err.into());
                }
            };

            let size = record.len();

            if self.admits(size) {
                self.push(record, size);
                continue;
            }

            // Rollover: `admits` accepts anything into an empty batch, so the
            // batch being closed here holds at least one record.
            let full = self.take();
            self.push(record, size);
            return Ok(Step::Batch(full));
        }
    }

    pub fn limits(&self) -> &BatchLimits {
        &self.limits
    }

    pub fn stats(&self) -> &BatchStats {
        &self.stats
    }

    /// Records dropped so far for exceeding `max_record_bytes`.
    pub fn discarded(&self) -> u64 {
        self.stats.discarded
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn admits(&self, size: usize) -> bool {
        if self.records.is_empty() {
            return true;
        }
        self.records.len() < self.limits.max_records_per_batch()
            && self.bytes.saturating_add(size) <= self.limits.max_batch_bytes()
    }

    fn push(&mut self, record: String, size: usize) {
        if self.records.is_empty() && size > self.limits.max_batch_bytes() {
            warn!(
                "[builder] record {} is {} bytes, over max_batch_bytes {}; emitting it alone",
                self.source.position(),
                size,
                self.limits.max_batch_bytes()
            );
        }
        self.records.push(record);
        self.bytes += size;
    }

    fn take(&mut self) -> Batch {
        let records = mem::take(&mut self.records);
        let bytes = mem::replace(&mut self.bytes, 0);
        let batch = Batch::new(records, bytes);

        self.stats.record_emitted(&batch);
        debug!(
            "[builder] batch {} closed: {} records, {} bytes",
            self.stats.batches,
            batch.len(),
            batch.byte_size()
        );

        batch
    }

    fn finish(&mut self) -> Step {
        self.finished = true;

        let step = if self.records.is_empty() {
            Step::EndOfInput
        } else {
            Step::Batch(self.take())
        };

        info!(
            "[builder] source exhausted after {} records: {} batches, {} records emitted, {} discarded",
            self.source.position(),
            self.stats.batches,
            self.stats.records,
            self.stats.discarded
        );

        step
    }

    fn abandon(&mut self) {
        self.finished = true;
        if !self.records.is_empty() {
            debug!(
                "[builder] dropping {} buffered records after source error",
                self.records.len()
            );
        }
        self.records = Vec::new();
        self.bytes = 0;
    }
}

impl<S: RecordSource> Iterator for BatchBuilder<S> {
    type Item = Result<Batch, BatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_batch() {
            Ok(Step::Batch(batch)) => Some(Ok(batch)),
            Ok(Step::EndOfInput) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

impl<S: RecordSource> FusedIterator for BatchBuilder<S> {}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
