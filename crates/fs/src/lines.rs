use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use log::debug;

use crate::{Pulled, RecordSource, SourceError};

const READ_BUFFER_BYTES: usize = 64 * 1024;

enum State {
    /// Path recorded, file not touched yet.
    Pending,
    Open(BufReader<File>),
    /// End of input or error; the handle has been dropped.
    Closed,
}

/// Line-delimited file read one record at a time.
///
/// `\n`, `\r\n` and a lone `\r` all end a line. The file is opened on the
/// first pull, not on construction, and the handle is dropped as soon as end
/// of input or a read error is reached. Dropping the source early releases
/// it as well.
pub struct LineSource {
    path: PathBuf,
    state: State,
    line: u64,
    /// The last line ended in `\r`; a `\n` right after it belongs to it.
    after_cr: bool,
}

/// Raw bytes of one line. Only the first `cap + 1` bytes are stored.
#[derive(Debug, PartialEq, Eq)]
struct RawLine {
    bytes: Vec<u8>,
    len: usize,
}

impl LineSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            state: State::Pending,
            line: 0,
            after_cr: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the underlying file handle is currently held.
    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open(_))
    }

    fn open(&mut self) -> Result<(), SourceError> {
        match File::open(&self.path) {
            Ok(file) => {
                debug!("[lines] opened {}", self.path.display());
                self.state = State::Open(BufReader::with_capacity(READ_BUFFER_BYTES, file));
                Ok(())
            }
            Err(source) => {
                self.state = State::Closed;
                Err(SourceError::Unavailable {
                    path: self.path.clone(),
                    source,
                })
            }
        }
    }

    fn close(&mut self) {
        if self.is_open() {
            debug!(
                "[lines] closed {} after {} lines",
                self.path.display(),
                self.line
            );
        }
        self.state = State::Closed;
    }

    fn read_error(&mut self, source: io::Error) -> SourceError {
        let line = self.line + 1;
        self.close();
        SourceError::Read {
            path: self.path.clone(),
            line,
            source,
        }
    }

    fn pull(&mut self, cap: usize) -> Result<Option<Pulled>, SourceError> {
        if matches!(self.state, State::Pending) {
            self.open()?;
        }

        let State::Open(reader) = &mut self.state else {
            return Ok(None);
        };

        let raw = match read_line(reader, cap, &mut self.after_cr) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.close();
                return Ok(None);
            }
            Err(source) => return Err(self.read_error(source)),
        };

        if raw.len > cap {
            self.line += 1;
            return Ok(Some(Pulled::Oversized { bytes: raw.len }));
        }

        match String::from_utf8(raw.bytes) {
            Ok(record) => {
                self.line += 1;
                Ok(Some(Pulled::Record(record)))
            }
            Err(err) => Err(self.read_error(io::Error::new(io::ErrorKind::InvalidData, err))),
        }
    }
}

impl RecordSource for LineSource {
    fn next_record(&mut self) -> Result<Option<String>, SourceError> {
        match self.pull(usize::MAX)? {
            Some(Pulled::Record(record)) => Ok(Some(record)),
            // Nothing is longer than usize::MAX.
            Some(Pulled::Oversized { .. }) | None => Ok(None),
        }
    }

    /// Lines over `max_bytes` are skipped through without being buffered and
    /// without UTF-8 validation.
    fn next_record_within(&mut self, max_bytes: usize) -> Result<Option<Pulled>, SourceError> {
        self.pull(max_bytes)
    }

    fn position(&self) -> u64 {
        self.line
    }
}

/// Read one line, terminator excluded, keeping at most `cap + 1` bytes.
///
/// `Ok(None)` only at end of input with nothing read. `after_cr` carries a
/// trailing `\r` across calls so that `\r\n` counts as one terminator even
/// when it straddles a buffer refill.
fn read_line<R: BufRead>(
    reader: &mut R,
    cap: usize,
    after_cr: &mut bool,
) -> io::Result<Option<RawLine>> {
    let keep = cap.saturating_add(1);
    let mut line = RawLine {
        bytes: Vec::new(),
        len: 0,
    };
    let mut started = false;

    loop {
        let available = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        if available.is_empty() {
            return Ok(started.then_some(line));
        }

        if std::mem::take(after_cr) && available[0] == b'\n' {
            reader.consume(1);
            continue;
        }

        started = true;
        let end = available.iter().position(|&b| b == b'\n' || b == b'\r');
        let chunk = &available[..end.unwrap_or(available.len())];

        let room = keep.saturating_sub(line.bytes.len());
        line.bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
        line.len += chunk.len();

        match end {
            Some(i) => {
                *after_cr = available[i] == b'\r';
                reader.consume(i + 1);
                return Ok(Some(line));
            }
            None => {
                let n = chunk.len();
                reader.consume(n);
            }
        }
    }
}

#[cfg(test)]
#[path = "lines_tests.rs"]
mod tests;
