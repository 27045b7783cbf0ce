use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    /// The source could not be opened; no record was ever produced.
    #[error("cannot open {}: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A read failed after the source was opened.
    #[error("read failed at {}:{line}: {source}", path.display())]
    Read {
        path: PathBuf,
        line: u64,
        #[source]
        source: io::Error,
    },
}

impl SourceError {
    pub fn io_kind(&self) -> io::ErrorKind {
        match self {
            SourceError::Unavailable { source, .. } | SourceError::Read { source, .. } => {
                source.kind()
            }
        }
    }
}
