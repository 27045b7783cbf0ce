use std::{io, path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Args;

use super::{CommandResult, LimitArgs, OutputOptions, make_printer, report, run_batches};

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Input file, one record per line
    pub file: PathBuf,

    #[command(flatten)]
    pub limits: LimitArgs,

    #[command(flatten)]
    pub output: OutputOptions,
}

pub fn run(args: StatsArgs) -> ExitCode {
    match execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report("stats", e),
    }
}

fn execute(args: &StatsArgs) -> CommandResult<()> {
    let limits = args.limits.resolve()?;
    // Summary is the only output, so it goes to stdout.
    let mut printer = make_printer(
        args.output.format(),
        &args.output.color,
        io::stdout(),
        false,
        true,
    );

    run_batches("stats", &args.file, limits, printer.as_mut())
        .with_context(|| format!("batching {}", args.file.display()))?;

    Ok(())
}
