use super::*;

use std::{
    fs::write,
    io::{self, ErrorKind},
    path::PathBuf,
};

use batchsplit_fs::SourceError;
use serde_json::json;

/// In-memory source that can be told to fail on a given pull.
struct VecSource {
    records: std::vec::IntoIter<String>,
    fail_on_pull: Option<u64>,
    pulled: u64,
    done: bool,
}

impl VecSource {
    fn new(records: &[&str]) -> Self {
        Self {
            records: records
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .into_iter(),
            fail_on_pull: None,
            pulled: 0,
            done: false,
        }
    }

    /// Fail on the `n`th pull (1-based).
    fn failing_on(mut self, n: u64) -> Self {
        self.fail_on_pull = Some(n);
        self
    }
}

impl RecordSource for VecSource {
    fn next_record(&mut self) -> Result<Option<String>, SourceError> {
        if self.done {
            return Ok(None);
        }
        if self.fail_on_pull == Some(self.pulled + 1) {
            self.done = true;
            return Err(SourceError::Read {
                path: PathBuf::from("<memory>"),
                line: self.pulled + 1,
                source: io::Error::other("disk on fire"),
            });
        }
        match self.records.next() {
            Some(record) => {
                self.pulled += 1;
                Ok(Some(record))
            }
            None => {
                self.done = true;
                Ok(None)
            }
        }
    }

    fn position(&self) -> u64 {
        self.pulled
    }
}

fn limits(max_batch_bytes: usize, max_records: usize, max_record_bytes: usize) -> BatchLimits {
    BatchLimits::new(max_batch_bytes, max_records, max_record_bytes).expect("valid limits")
}

fn records_limit(max_records: usize) -> BatchLimits {
    BatchLimits::default()
        .with_max_records_per_batch(max_records)
        .expect("valid limits")
}

fn items(prefix: &str, range: std::ops::Range<usize>) -> Vec<String> {
    range.map(|i| format!("{prefix}{i}")).collect()
}

fn write_lines(dir: &tempfile::TempDir, name: &str, lines: &[String]) -> PathBuf {
    let path = dir.path().join(name);
    let mut body = lines.join("\n");
    body.push('\n');
    write(&path, body).expect("write fixture");
    path
}

fn collect<S: RecordSource>(builder: BatchBuilder<S>) -> Vec<Vec<String>> {
    builder
        .map(|batch| batch.expect("batch ok").into_records())
        .collect()
}

#[test]
fn ten_records_fit_one_batch() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = write_lines(&tmp, "ten.txt", &items("item_", 0..10));

    let batches = collect(build_batches(&path, records_limit(10)));
    assert_eq!(batches, vec![items("item_", 0..10)]);
}

#[test]
fn oversized_first_line_is_discarded() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let long_line = "this_line_is_26_bytes_long".to_string();
    assert_eq!(long_line.len(), 26);

    let mut lines = vec![long_line.clone()];
    lines.extend(items("item_", 0..10));
    let path = write_lines(&tmp, "long_line.txt", &lines);

    let limits = records_limit(10)
        .with_max_record_bytes(10)
        .expect("valid limits");
    let mut builder = build_batches(&path, limits);

    let first = builder.next().expect("one batch").expect("batch ok");
    assert_eq!(first.records(), items("item_", 0..10).as_slice());
    assert!(builder.next().is_none());

    assert_eq!(builder.discarded(), 1);
    assert_eq!(builder.stats().records, 10);
}

#[test]
fn batch_may_end_exactly_at_byte_limit() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = write_lines(&tmp, "overflow_batch.txt", &items("item_", 0..10));

    let limits = limits(6 * 9, 10, 1_000_000);
    let mut builder = build_batches(&path, limits);

    let first = builder.next().expect("first batch").expect("ok");
    assert_eq!(first.records(), items("item_", 0..9).as_slice());
    assert_eq!(first.byte_size(), 54);

    let second = builder.next().expect("second batch").expect("ok");
    assert_eq!(second.records(), ["item_9"]);
    assert_eq!(second.byte_size(), 6);

    assert!(builder.next().is_none());
}

#[test]
fn missing_file_fails_on_first_pull_and_yields_nothing() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("does_not_exist.txt");

    let mut builder = build_batches(&path, BatchLimits::default());
    assert!(!builder.is_finished());

    match builder.next() {
        Some(Err(BatchError::Source(err @ SourceError::Unavailable { .. }))) => {
            assert_eq!(err.io_kind(), ErrorKind::NotFound);
        }
        other => panic!("expected Unavailable, got {other:?}"),
    }

    assert!(builder.next().is_none());
    assert_eq!(*builder.stats(), BatchStats::default());
}

#[test]
fn hundred_records_split_into_ten_ordered_batches() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let lines: Vec<String> = (0..10)
        .flat_map(|b| (0..10).map(move |i| format!("batch_{b}_item_{i}")))
        .collect();
    let path = write_lines(&tmp, "long_array.txt", &lines);

    let batches = collect(build_batches(&path, records_limit(10)));
    assert_eq!(batches.len(), 10);

    for (b, batch) in batches.iter().enumerate() {
        let expected: Vec<String> = (0..10).map(|i| format!("batch_{b}_item_{i}")).collect();
        assert_eq!(batch, &expected, "batch {b}");
    }
}

#[test]
fn empty_source_yields_no_batches() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("empty.txt");
    write(&path, "").expect("write fixture");

    let mut builder = build_batches(&path, BatchLimits::default());
    assert_eq!(builder.next_batch().expect("ok"), Step::EndOfInput);
    assert!(builder.is_finished());
    assert_eq!(builder.stats().batches, 0);

    let builder = BatchBuilder::new(VecSource::new(&[]), BatchLimits::default());
    assert!(collect(builder).is_empty());
}

#[test]
fn record_limit_rolls_over_on_the_next_record() {
    let cases: &[(&[&str], usize, &[&[&str]])] = &[
        (&["a", "b", "c"], 3, &[&["a", "b", "c"]]),
        (&["a", "b", "c", "d"], 3, &[&["a", "b", "c"], &["d"]]),
        (&["a", "b", "c"], 1, &[&["a"], &["b"], &["c"]]),
        (&["a"], 500, &[&["a"]]),
    ];

    for (input, max_records, expected) in cases {
        let builder = BatchBuilder::new(VecSource::new(input), records_limit(*max_records));
        let got = collect(builder);
        let want: Vec<Vec<String>> = expected
            .iter()
            .map(|b| b.iter().map(|r| r.to_string()).collect())
            .collect();
        assert_eq!(got, want, "input {input:?}, max_records {max_records}");
    }
}

#[test]
fn record_over_batch_budget_is_emitted_alone() {
    let cases: &[(&[&str], &[&[&str]])] = &[
        (&["ab", "abcdefgh", "cd"], &[&["ab"], &["abcdefgh"], &["cd"]]),
        (&["abcdefgh", "a"], &[&["abcdefgh"], &["a"]]),
        (&["abcdefgh", "ijklmnop"], &[&["abcdefgh"], &["ijklmnop"]]),
    ];

    for (input, expected) in cases {
        let builder = BatchBuilder::new(VecSource::new(input), limits(5, 10, 100));
        let got = collect(builder);
        let want: Vec<Vec<String>> = expected
            .iter()
            .map(|b| b.iter().map(|r| r.to_string()).collect())
            .collect();
        assert_eq!(got, want, "input {input:?}");
    }
}

#[test]
fn sizes_are_utf8_byte_lengths() {
    // "é" is two bytes, "e" is one.
    let builder = BatchBuilder::new(VecSource::new(&["é", "é", "é"]), limits(4, 10, 100));
    assert_eq!(collect(builder), vec![vec!["é", "é"], vec!["é"]]);

    let mut builder = BatchBuilder::new(VecSource::new(&["é", "e", "é"]), limits(100, 10, 1));
    let only = builder.next().expect("batch").expect("ok");
    assert_eq!(only.records(), ["e"]);
    assert!(builder.next().is_none());
    assert_eq!(builder.discarded(), 2);
}

#[test]
fn discard_counter_accumulates_across_batches() {
    let input = ["toolong", "a", "b", "toolong", "c", "toolong"];
    let mut builder = BatchBuilder::new(VecSource::new(&input), limits(100, 2, 3));

    let first = builder.next().expect("batch").expect("ok");
    assert_eq!(first.records(), ["a", "b"]);
    // The second oversized record was read while looking for the rollover.
    assert_eq!(builder.discarded(), 2);

    let second = builder.next().expect("batch").expect("ok");
    assert_eq!(second.records(), ["c"]);
    assert!(builder.next().is_none());

    assert_eq!(
        *builder.stats(),
        BatchStats {
            batches: 2,
            records: 3,
            bytes: 3,
            discarded: 3,
        }
    );
}

#[test]
fn read_failure_abandons_in_progress_batch() {
    let source = VecSource::new(&["a", "b", "c", "d"]).failing_on(4);
    let mut builder = BatchBuilder::new(source, records_limit(2));

    let first = builder.next().expect("batch").expect("ok");
    assert_eq!(first.records(), ["a", "b"]);

    // "c" was buffered when the fourth pull failed; it must not surface.
    match builder.next() {
        Some(Err(BatchError::Source(SourceError::Read { line, .. }))) => assert_eq!(line, 4),
        other => panic!("expected Read error, got {other:?}"),
    }

    assert!(builder.next().is_none());
    assert_eq!(builder.next_batch().expect("finished"), Step::EndOfInput);
    assert_eq!(builder.stats().batches, 1);
    assert_eq!(builder.stats().records, 2);
}

#[test]
fn failure_on_first_pull_produces_no_batch() {
    let source = VecSource::new(&["a"]).failing_on(1);
    let mut builder = BatchBuilder::new(source, BatchLimits::default());

    assert!(matches!(builder.next_batch(), Err(BatchError::Source(_))));
    assert!(builder.is_finished());
    assert!(builder.next().is_none());
}

#[test]
fn invalid_utf8_mid_file_releases_the_handle() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("bad.txt");
    write(&path, b"a\nb\n\xff\nc\n").expect("write fixture");

    let mut builder = build_batches(&path, BatchLimits::default());

    match builder.next() {
        Some(Err(BatchError::Source(err @ SourceError::Read { .. }))) => {
            assert_eq!(err.io_kind(), ErrorKind::InvalidData);
        }
        other => panic!("expected Read error, got {other:?}"),
    }
    assert!(!builder.source().is_open());
    assert!(builder.next().is_none());
}

#[test]
fn handle_is_held_between_pulls_and_released_at_end() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = write_lines(&tmp, "three.txt", &items("item_", 0..3));

    let mut builder = build_batches(&path, records_limit(1));
    assert!(!builder.source().is_open(), "no work before the first pull");

    builder.next().expect("batch").expect("ok");
    assert!(builder.source().is_open(), "suspended mid-file");

    let rest = collect(builder);
    assert_eq!(rest, vec![vec!["item_1"], vec!["item_2"]]);
}

#[test]
fn exhausted_builder_closes_its_source() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = write_lines(&tmp, "two.txt", &items("item_", 0..2));

    let mut builder = build_batches(&path, BatchLimits::default());
    while let Some(batch) = builder.next() {
        batch.expect("ok");
    }
    assert!(!builder.source().is_open());
}

#[test]
fn blank_lines_are_zero_byte_records() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("blank.txt");
    write(&path, "a\n\nb\n").expect("write fixture");

    let batches: Vec<Batch> = build_batches(&path, records_limit(2))
        .collect::<Result<_, _>>()
        .expect("ok");

    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].records(), ["a", ""]);
    assert_eq!(batches[0].byte_size(), 1);
    assert_eq!(batches[1].records(), ["b"]);
}

#[test]
fn same_input_and_limits_give_same_batches() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = write_lines(&tmp, "again.txt", &items("record_", 0..37));
    let limits = limits(40, 4, 9);

    let first = collect(build_batches(&path, limits));
    let second = collect(build_batches(&path, limits));
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn batch_accessors_and_iteration() {
    let mut builder = BatchBuilder::new(VecSource::new(&["x", "yy"]), BatchLimits::default());
    let batch = match builder.next_batch().expect("ok") {
        Step::Batch(batch) => batch,
        Step::EndOfInput => panic!("expected a batch"),
    };

    assert_eq!(batch.len(), 2);
    assert!(!batch.is_empty());
    assert_eq!(batch.byte_size(), 3);

    let borrowed: Vec<&String> = (&batch).into_iter().collect();
    assert_eq!(borrowed, ["x", "yy"]);

    let owned: Vec<String> = batch.into_iter().collect();
    assert_eq!(owned, ["x", "yy"]);

    assert_eq!(builder.next_batch().expect("ok"), Step::EndOfInput);
    assert_eq!(builder.limits(), &BatchLimits::default());
}

#[test]
fn stats_serialize_as_flat_object() {
    let stats = BatchStats {
        batches: 2,
        records: 19,
        bytes: 114,
        discarded: 1,
    };

    assert_eq!(
        serde_json::to_value(stats).expect("serialize"),
        json!({ "batches": 2, "records": 19, "bytes": 114, "discarded": 1 })
    );
}

#[test]
fn carriage_returns_end_records_like_newlines() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("mixed_endings.txt");
    write(&path, b"a\rb\nc\r\nd\n").expect("write fixture");

    let batches = collect(build_batches(&path, BatchLimits::default()));
    assert_eq!(batches, vec![vec!["a", "b", "c", "d"]]);

    // Joined on "\r" the two items would be 13 bytes and get discarded.
    let path = tmp.path().join("cr_items.txt");
    write(&path, b"item_0\ritem_1\n").expect("write fixture");

    let mut builder = build_batches(&path, limits(100, 10, 10));
    let batch = builder.next().expect("batch").expect("ok");
    assert_eq!(batch.records(), ["item_0", "item_1"]);
    assert_eq!(batch.byte_size(), 12);
    assert!(builder.next().is_none());
    assert_eq!(builder.discarded(), 0);
}

#[test]
fn very_long_line_is_discarded_between_kept_records() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("huge_line.txt");
    let huge = "z".repeat(2_000_000);
    write(&path, format!("item_0\n{huge}\nitem_1\n")).expect("write fixture");

    let mut builder = build_batches(&path, BatchLimits::default());
    let batch = builder.next().expect("batch").expect("ok");
    assert_eq!(batch.records(), ["item_0", "item_1"]);
    assert!(builder.next().is_none());

    assert_eq!(builder.discarded(), 1);
    assert_eq!(builder.source().position(), 3);
}
