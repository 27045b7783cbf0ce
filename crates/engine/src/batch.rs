use serde::Serialize;

/// Records emitted together, in source order.
///
/// A batch produced by [`BatchBuilder`](crate::BatchBuilder) is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    records: Vec<String>,
    bytes: usize,
}

impl Batch {
    pub(crate) fn new(records: Vec<String>, bytes: usize) -> Self {
        debug_assert_eq!(bytes, records.iter().map(String::len).sum::<usize>());
        Self { records, bytes }
    }

    pub fn records(&self) -> &[String] {
        &self.records
    }

    pub fn into_records(self) -> Vec<String> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of the UTF-8 lengths of the records.
    pub fn byte_size(&self) -> usize {
        self.bytes
    }
}

impl IntoIterator for Batch {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Running totals for one batching run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    /// Batches emitted so far.
    pub batches: u64,
    /// Records emitted so far.
    pub records: u64,
    /// Bytes emitted so far.
    pub bytes: u64,
    /// Records dropped for exceeding the per-record limit.
    pub discarded: u64,
}

impl BatchStats {
    pub(crate) fn record_emitted(&mut self, batch: &Batch) {
        self.batches += 1;
        self.records += batch.len() as u64;
        self.bytes += batch.byte_size() as u64;
    }
}
