//! Walls - Cave Survey Data Parser
//!
//! Reads a Walls `.srv` file and writes every parsed construct as one JSON
//! object per line. Lines that fail to parse are reported on stderr as
//! `file:line:column: message`.
//!
//! # Usage
//!
//! ```bash
//! walls cave.srv | jq 'select(.event == "vector")'
//! ```

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use walls_core::walls::{self, EventCollector, ParserConfig, DEFAULT_MAX_UNITS_STACK_DEPTH};

/// Walls survey file parser
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the survey file (.srv)
    #[arg(value_name = "SURVEY_FILE")]
    survey_file: PathBuf,

    /// Maximum number of outstanding `#UNITS SAVE`s
    #[arg(long, default_value_t = DEFAULT_MAX_UNITS_STACK_DEPTH)]
    max_units_stack_depth: usize,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}

/// Parse the file and print its events; returns the number of bad lines.
fn run(args: &Args) -> Result<usize, Box<dyn std::error::Error>> {
    let config = ParserConfig::new().with_max_units_stack_depth(args.max_units_stack_depth);
    let mut events = EventCollector::new();
    let errors = walls::parse_file(&args.survey_file, config, &mut events)?;

    if !args.quiet {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        for event in &events.events {
            serde_json::to_writer(&mut out, event)?;
            writeln!(out)?;
        }
        out.flush()?;
    }

    for error in &errors {
        eprintln!("{}", error);
    }
    Ok(errors.len())
}
