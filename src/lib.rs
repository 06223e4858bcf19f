//! # Marquee - movie metadata analytics
//!
//! Marquee joins a movies table with a credits table and runs them through a
//! numbered, checkpointed pipeline: projection, cleaning, derived metrics,
//! decoding of nested list fields, category aggregation with top-N + `Others`
//! bucketing, release-date sorting and top-K selection.
//!
//! ## Quick Start
//!
//! ```no_run
//! use marquee::config::PipelineConfig;
//! use marquee::pipeline::run_pipeline;
//!
//! # fn example() -> marquee::error::Result<()> {
//! let config = PipelineConfig::default();
//! let report = run_pipeline(&config, None)?;
//! for bucket in &report.genres.counts {
//!     println!("{}: {}", bucket.name, bucket.count);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`analyser`]: Table operations and the staged pipeline
//!   - [`analyser::logic`]: Join, projection, cleaning, parsing, aggregation, sorting
//!   - [`analyser::lifecycle`]: Pipeline stages and their checkpoints
//! - [`pipeline`]: Whole-batch execution and run reports
//! - [`dashboard`]: Chart data for the dashboard
//! - [`export`]: Newline-delimited JSON documents for bulk import
//! - [`config`]: Pipeline configuration
//! - [`error`]: Error types and handling utilities
//! - [`logging`]: Console and rotating-file logging
//!
//! ## Tables
//!
//! Every operation takes a polars [`DataFrame`](polars::prelude::DataFrame)
//! and returns a new one, leaving its input untouched. Stages only see the
//! previous stage's table, so any stage can be re-run from the checkpoint
//! before it.

pub mod analyser;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod logging;
pub mod pipeline;
