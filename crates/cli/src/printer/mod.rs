use batchsplit_engine::{Batch, BatchLimits, BatchStats};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output with optional colors.
    #[default]
    Human,
    /// NDJSON (newline-delimited JSON) for machine consumption.
    Json,
}

/// Color handling strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorChoice {
    /// Enable colors when stdout is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn parse(value: &str) -> Self {
        match value {
            "always" => ColorChoice::Always,
            "never" => ColorChoice::Never,
            _ => ColorChoice::Auto,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrinterConfig {
    pub color: ColorChoice,
    /// Print every batch. `stats` turns this off.
    pub show_batches: bool,
    /// Print the run summary to the summary writer.
    pub show_summary: bool,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            color: ColorChoice::Auto,
            show_batches: true,
            show_summary: true,
        }
    }
}

/// Static context about a batching run.
#[derive(Debug)]
pub struct RunContext<'a> {
    /// Subcommand label, e.g. `split`.
    pub kind: &'a str,
    /// Input file as given on the command line.
    pub file: &'a str,
    pub limits: &'a BatchLimits,
}

/// Receives batches as the builder produces them, then the final totals.
pub trait BatchPrinter {
    /// `index` is 1-based.
    fn print_batch(&mut self, index: u64, batch: &Batch, ctx: &RunContext) -> io::Result<()>;

    fn finish(&mut self, stats: &BatchStats, ctx: &RunContext) -> io::Result<()>;
}

pub struct HumanPrinter<W: Write, E: Write> {
    out: W,
    summary: E,
    cfg: PrinterConfig,
    use_color: bool,
}

impl<W: Write, E: Write> HumanPrinter<W, E> {
    /// `Auto` color means no color here, since arbitrary writers can't be probed.
    pub fn new(out: W, summary: E, cfg: PrinterConfig) -> Self {
        let use_color = cfg.color == ColorChoice::Always;
        Self {
            out,
            summary,
            cfg,
            use_color,
        }
    }

    #[inline]
    fn header(&self, text: &str) -> String {
        if self.use_color {
            format!("\x1b[1;36m{}\x1b[0m", text)
        } else {
            text.to_owned()
        }
    }
}

impl<E: Write> HumanPrinter<io::Stdout, E> {
    /// Batches to stdout, with TTY detection for `Auto` color.
    pub fn stdout(summary: E, cfg: PrinterConfig) -> Self {
        use std::io::IsTerminal;

        let use_color = match cfg.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => io::stdout().is_terminal(),
        };

        HumanPrinter {
            out: io::stdout(),
            summary,
            cfg,
            use_color,
        }
    }
}

impl<W: Write, E: Write> BatchPrinter for HumanPrinter<W, E> {
    fn print_batch(&mut self, index: u64, batch: &Batch, _ctx: &RunContext) -> io::Result<()> {
        if !self.cfg.show_batches {
            return Ok(());
        }

        let header = self.header(&format!(
            "batch {}: {} records, {} bytes",
            index,
            batch.len(),
            batch.byte_size()
        ));
        writeln!(self.out, "{}", header)?;
        for record in batch {
            writeln!(self.out, "  {}", record)?;
        }
        Ok(())
    }

    fn finish(&mut self, stats: &BatchStats, ctx: &RunContext) -> io::Result<()> {
        self.out.flush()?;

        if !self.cfg.show_summary {
            return Ok(());
        }

        writeln!(
            self.summary,
            "[{}] {}: {} batches, {} records, {} bytes, {} discarded",
            ctx.kind, ctx.file, stats.batches, stats.records, stats.bytes, stats.discarded
        )?;
        writeln!(
            self.summary,
            "[{}] limits: max_batch_bytes={} max_records_per_batch={} max_record_bytes={}",
            ctx.kind,
            ctx.limits.max_batch_bytes(),
            ctx.limits.max_records_per_batch(),
            ctx.limits.max_record_bytes()
        )?;
        self.summary.flush()
    }
}

pub struct JsonPrinter<W: Write, E: Write> {
    out: W,
    summary: E,
    cfg: PrinterConfig,
}

impl<W: Write, E: Write> JsonPrinter<W, E> {
    pub fn new(out: W, summary: E, cfg: PrinterConfig) -> Self {
        Self { out, summary, cfg }
    }
}

impl<W: Write, E: Write> BatchPrinter for JsonPrinter<W, E> {
    fn print_batch(&mut self, index: u64, batch: &Batch, _ctx: &RunContext) -> io::Result<()> {
        if !self.cfg.show_batches {
            return Ok(());
        }

        let obj = serde_json::json!({
            "batch": index,
            "records": batch.records(),
            "bytes": batch.byte_size(),
        });
        writeln!(self.out, "{}", obj)
    }

    fn finish(&mut self, stats: &BatchStats, ctx: &RunContext) -> io::Result<()> {
        self.out.flush()?;

        if !self.cfg.show_summary {
            return Ok(());
        }

        let obj = serde_json::json!({
            "type": "summary",
            "kind": ctx.kind,
            "file": ctx.file,
            "stats": stats,
            "limits": {
                "max_batch_bytes": ctx.limits.max_batch_bytes(),
                "max_records_per_batch": ctx.limits.max_records_per_batch(),
                "max_record_bytes": ctx.limits.max_record_bytes(),
            }
        });
        writeln!(self.summary, "{}", obj)?;
        self.summary.flush()
    }
}

#[cfg(test)]
#[path = "printer_tests.rs"]
mod tests;
