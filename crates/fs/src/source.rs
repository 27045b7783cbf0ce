use crate::SourceError;

/// One pull from a source that was told the largest record worth keeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pulled {
    Record(String),
    /// A record over the limit. Its content was skipped, only its size kept.
    Oversized { bytes: usize },
}

/// Pull-based producer of text records.
///
/// A source is consumed exactly once, front to back. Once it has returned
/// `Ok(None)` or an error it is finished and keeps returning `Ok(None)`.
pub trait RecordSource {
    /// Next record with its line terminator removed, `Ok(None)` at end of input.
    fn next_record(&mut self) -> Result<Option<String>, SourceError>;

    /// Like [`next_record`](Self::next_record), but records longer than
    /// `max_bytes` come back as [`Pulled::Oversized`]. Sources that can skip
    /// such a record without buffering it should override this.
    fn next_record_within(&mut self, max_bytes: usize) -> Result<Option<Pulled>, SourceError> {
        Ok(self.next_record()?.map(|record| {
            if record.len() > max_bytes {
                Pulled::Oversized {
                    bytes: record.len(),
                }
            } else {
                Pulled::Record(record)
            }
        }))
    }

    /// 1-based position of the last record returned, 0 before the first pull.
    fn position(&self) -> u64;
}

impl<S: RecordSource + ?Sized> RecordSource for &mut S {
    fn next_record(&mut self) -> Result<Option<String>, SourceError> {
        (**self).next_record()
    }

    fn next_record_within(&mut self, max_bytes: usize) -> Result<Option<Pulled>, SourceError> {
        (**self).next_record_within(max_bytes)
    }

    fn position(&self) -> u64 {
        (**self).position()
    }
}

impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    fn next_record(&mut self) -> Result<Option<String>, SourceError> {
        (**self).next_record()
    }

    fn next_record_within(&mut self, max_bytes: usize) -> Result<Option<Pulled>, SourceError> {
        (**self).next_record_within(max_bytes)
    }

    fn position(&self) -> u64 {
        (**self).position()
    }
}
