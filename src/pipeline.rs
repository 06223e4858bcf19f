//! End-to-end batch execution.
//!
//! [`run_pipeline`] drives the ten lifecycle stages from the raw movies and
//! credits tables, checkpointing every stage, and then computes the
//! summaries taken from the final table: the titles with the largest casts
//! and the genre and country distributions.
//!
//! # Example
//!
//! ```no_run
//! use marquee::config::PipelineConfig;
//! use marquee::pipeline::run_pipeline;
//!
//! let config = PipelineConfig::from_file("marquee.json")?;
//! let report = run_pipeline(&config, None)?;
//! println!("{}", report.summary());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod executor;

pub use executor::{RunReport, StageReport, resume_point, run_pipeline, stage_executor};
