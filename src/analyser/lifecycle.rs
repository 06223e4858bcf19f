//! Staged pipeline lifecycle
//!
//! The batch runs ten numbered stages. Each stage:
//! - consumes only the previous stage's table,
//! - fully materialises its own output table,
//! - persists that table as a checkpoint (`output_df{N}.csv`).
//!
//! Because a stage needs nothing but its predecessor's checkpoint, a failed
//! run can resume at the failing stage without repeating earlier work.
//!
//! ## Example Usage
//!
//! ```no_run
//! use marquee::analyser::lifecycle::{CheckpointStore, PipelineStage, StageExecutor};
//! use marquee::analyser::lifecycle::stages::RescaleStageExecutor;
//! use std::path::PathBuf;
//!
//! # fn example() -> marquee::error::Result<()> {
//! let store = CheckpointStore::new(PathBuf::from("data"))?;
//!
//! // Re-run stage 6 from stage 5's checkpoint
//! let input = store.load(PipelineStage::ImpactDerived)?;
//! let executor = RescaleStageExecutor::new("popularity", 100.0);
//! let output = executor.execute(input)?;
//! store.save(executor.stage(), &output)?;
//! # Ok(())
//! # }
//! ```

pub mod stages;
pub mod storage;

pub use stages::{PipelineStage, StageExecutor};
pub use storage::CheckpointStore;
