pub mod split;
pub mod stats;

use std::{path::Path, process::ExitCode};

use batchsplit_engine::{BatchError, BatchLimits, BatchStats, build_batches};
use clap::{Args, Subcommand};
use log::{debug, error};

use crate::printer::{
    BatchPrinter, ColorChoice, HumanPrinter, JsonPrinter, OutputFormat, PrinterConfig, RunContext,
};
pub use split::SplitArgs;
pub use stats::StatsArgs;

/// Error type for command handlers.
pub type CommandResult<T> = anyhow::Result<T>;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every batch of a line-delimited file.
    ///
    /// Example:
    ///   batchsplit split records.txt --max-records 100
    ///   batchsplit split --json --max-batch-bytes 1048576 records.txt
    Split(SplitArgs),

    /// Batch a file and print only the totals.
    Stats(StatsArgs),
}

/// Batching thresholds. Unset flags fall back to the environment, then to
/// the built-in defaults.
#[derive(Debug, Args, Default)]
pub struct LimitArgs {
    /// Maximum total bytes per batch [env: BATCHSPLIT_MAX_BATCH_BYTES]
    #[arg(long, value_name = "BYTES")]
    pub max_batch_bytes: Option<usize>,

    /// Maximum records per batch [env: BATCHSPLIT_MAX_RECORDS]
    #[arg(long = "max-records", value_name = "N")]
    pub max_records_per_batch: Option<usize>,

    /// Records longer than this are discarded [env: BATCHSPLIT_MAX_RECORD_BYTES]
    #[arg(long, value_name = "BYTES")]
    pub max_record_bytes: Option<usize>,
}

impl LimitArgs {
    pub fn resolve(&self) -> Result<BatchLimits, BatchError> {
        let mut limits = BatchLimits::from_env()?;

        if let Some(v) = self.max_batch_bytes {
            limits = limits.with_max_batch_bytes(v)?;
        }
        if let Some(v) = self.max_records_per_batch {
            limits = limits.with_max_records_per_batch(v)?;
        }
        if let Some(v) = self.max_record_bytes {
            limits = limits.with_max_record_bytes(v)?;
        }

        Ok(limits)
    }
}

#[derive(Debug, Args)]
pub struct OutputOptions {
    /// Output NDJSON (one JSON object per batch)
    #[arg(long)]
    pub json: bool,

    /// When to use colors: auto, always, never
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: String,
}

impl OutputOptions {
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Drive the builder for `file` to completion, handing each batch to `printer`.
pub fn run_batches(
    kind: &str,
    file: &Path,
    limits: BatchLimits,
    printer: &mut dyn BatchPrinter,
) -> CommandResult<BatchStats> {
    let display = file.display().to_string();
    let ctx = RunContext {
        kind,
        file: &display,
        limits: &limits,
    };

    let mut builder = build_batches(file, limits);
    let mut index = 0u64;

    for batch in builder.by_ref() {
        let batch = batch?;
        index += 1;
        printer.print_batch(index, &batch, &ctx)?;
    }

    let stats = *builder.stats();
    printer.finish(&stats, &ctx)?;

    Ok(stats)
}

/// Printer writing batches to stdout and the summary to `summary`.
pub fn make_printer<E: std::io::Write + 'static>(
    format: OutputFormat,
    color: &str,
    summary: E,
    show_batches: bool,
    show_summary: bool,
) -> Box<dyn BatchPrinter> {
    let cfg = PrinterConfig {
        color: ColorChoice::parse(color),
        show_batches,
        show_summary,
    };

    match format {
        OutputFormat::Human => Box::new(HumanPrinter::stdout(summary, cfg)),
        OutputFormat::Json => Box::new(JsonPrinter::new(std::io::stdout(), summary, cfg)),
    }
}

/// 1 for source errors, 2 for bad configuration or anything else.
pub fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<BatchError>() {
        Some(BatchError::Source(_)) => ExitCode::from(1),
        Some(BatchError::InvalidLimit { .. }) => ExitCode::from(2),
        None if err.downcast_ref::<std::io::Error>().is_some() => ExitCode::from(1),
        None => ExitCode::from(2),
    }
}

/// The reader of our output went away, e.g. `batchsplit split f | head`.
fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::BrokenPipe)
}

pub fn report(kind: &str, err: anyhow::Error) -> ExitCode {
    if is_broken_pipe(&err) {
        debug!("[{kind}] output closed early: {err:#}");
        return ExitCode::SUCCESS;
    }

    error!("[{kind}] {err:#}");
    eprintln!("[{kind}] {err:#}");
    exit_code(&err)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
