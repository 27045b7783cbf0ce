mod error;
mod lines;
mod source;

pub use error::SourceError;
pub use lines::LineSource;
pub use source::{Pulled, RecordSource};
