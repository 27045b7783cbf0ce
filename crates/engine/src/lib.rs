mod batch;
mod builder;
mod error;
mod limits;

pub use batch::{Batch, BatchStats};
pub use builder::{BatchBuilder, Step, build_batches};
pub use error::BatchError;
pub use limits::BatchLimits;

pub use batchsplit_fs::{LineSource, Pulled, RecordSource, SourceError};
