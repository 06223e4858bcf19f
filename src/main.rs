//! # Marquee command line
//!
//! ```text
//! main()
//!   │
//!   ├─> Initialize logging (stderr + rotating files)
//!   ├─> Parse CLI arguments (clap)
//!   └─> Execute the command: run | dashboard | export
//! ```
//!
//! ```bash
//! marquee run --movies movies.csv --credits credits.csv --output-dir data
//! marquee run --output-dir data --resume-from 9
//! marquee dashboard --input data/output_df10.csv --years 2012 2015
//! marquee export --movies movies.csv --credits credits.csv --output movies.ndjson
//! ```
//!
//! A failed command exits non-zero; pipeline failures name the stage.

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout, clippy::print_stderr)] // Allow println! in main binary

mod cli;

use anyhow::Result;
use clap::Parser as _;

fn main() -> Result<()> {
    // Set RUST_LOG=debug to see per-record parse failures
    if let Err(e) = marquee::logging::init() {
        eprintln!("File logging unavailable: {e:#}");
    }

    let cli = cli::Cli::parse();
    cli::run_command(cli.command).inspect_err(|e| tracing::error!("{e:#}"))
}
