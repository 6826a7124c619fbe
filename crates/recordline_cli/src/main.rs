//! recordline - convert record-literal log lines to JSON

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use recordline::config::MAX_DEPTH_CEILING;
use recordline::host::handle_line_with;
use recordline::{convert_with, format_record, FormatOptions, Options, RecordParser};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Interpret `Name{field=value, ...}` log lines
#[derive(Parser)]
#[command(name = "recordline", version, about)]
struct Cli {
    /// Read lines from this file instead of stdin
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Maximum record nesting, at most 128 (defaults to $RECORDLINE_MAX_DEPTH, then 64)
    #[arg(
        long,
        global = true,
        value_parser = clap::value_parser!(u64).range(1..=MAX_DEPTH_CEILING as u64)
    )]
    max_depth: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print one boundary JSON map per line
    Parse {
        /// Indent the JSON output
        #[arg(long)]
        pretty_json: bool,
    },

    /// Reformat each line as an indented record literal
    Pretty {
        /// Spaces per nesting level
        #[arg(long, default_value_t = 2)]
        indent: usize,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let options = match cli.max_depth {
        Some(max) => Options::default().with_max_depth(max as usize),
        None => Options::from_env(),
    };
    debug!(max_depth = options.max_depth, "options resolved");

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Parse { pretty_json } => {
            let lines = run_parse(reader, &mut out, &options, pretty_json)?;
            info!(lines, "converted");
        }
        Command::Pretty { indent } => {
            let format = FormatOptions::indented(indent);
            let failed = run_pretty(reader, &mut out, &mut io::stderr(), &options, &format)?;
            if failed > 0 {
                bail!("{} line(s) could not be parsed", failed);
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Write one JSON map per non-blank line; failures become `{"Error": ..}`
fn run_parse<R: BufRead, W: Write>(
    reader: R,
    out: &mut W,
    options: &Options,
    pretty_json: bool,
) -> Result<usize> {
    let mut count = 0;
    for line in reader.lines() {
        let line = line.context("reading input")?;
        if line.trim().is_empty() {
            continue;
        }

        let map = serde_json::Value::Object(handle_line_with(&RecordParser, &line, options));
        let text = if pretty_json {
            serde_json::to_string_pretty(&map)?
        } else {
            serde_json::to_string(&map)?
        };
        writeln!(out, "{}", text)?;
        count += 1;
    }
    Ok(count)
}

/// Write formatted records to `out` and diagnostics to `err`; returns the
/// number of lines that failed
fn run_pretty<R: BufRead, W: Write, E: Write>(
    reader: R,
    out: &mut W,
    err: &mut E,
    options: &Options,
    format: &FormatOptions,
) -> Result<usize> {
    let mut failed = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line.context("reading input")?;
        if line.trim().is_empty() {
            continue;
        }

        match convert_with(&RecordParser, &line, options) {
            Ok(record) => writeln!(out, "{}", format_record(&record, format))?,
            Err(e) => {
                writeln!(err, "line {}: {}", index + 1, e.format_with_source(&line))?;
                failed += 1;
            }
        }
    }
    Ok(failed)
}
