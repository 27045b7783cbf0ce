use std::process::ExitCode;

use clap::Parser;

mod commands;
mod printer;

use batchsplit_runtime::logging;
use commands::Command;

#[derive(Debug, Parser)]
#[command(
    name = "batchsplit",
    version,
    about = "Split a line-delimited file into bounded batches",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

fn main() -> ExitCode {
    logging::init().ok();

    let cli = Cli::parse();
    match cli.command {
        Command::Split(args) => commands::split::run(args),
        Command::Stats(args) => commands::stats::run(args),
    }
}
