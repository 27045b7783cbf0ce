use std::{io, path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Args;

use super::{CommandResult, LimitArgs, OutputOptions, make_printer, report, run_batches};

#[derive(Debug, Args)]
pub struct SplitArgs {
    /// Input file, one record per line
    pub file: PathBuf,

    #[command(flatten)]
    pub limits: LimitArgs,

    #[command(flatten)]
    pub output: OutputOptions,

    /// Suppress the summary on stderr
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

pub fn run(args: SplitArgs) -> ExitCode {
    match execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report("split", e),
    }
}

fn execute(args: &SplitArgs) -> CommandResult<()> {
    let limits = args.limits.resolve()?;
    let mut printer = make_printer(
        args.output.format(),
        &args.output.color,
        io::stderr(),
        true,
        !args.quiet,
    );

    run_batches("split", &args.file, limits, printer.as_mut())
        .with_context(|| format!("splitting {}", args.file.display()))?;

    Ok(())
}
