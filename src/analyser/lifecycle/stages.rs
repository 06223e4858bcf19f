//! Numbered stages of the batch pipeline.

pub mod cast;
pub mod clean;
pub mod join;
pub mod project;
pub mod sort;

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

pub use cast::{CastCountStageExecutor, CastFormatStageExecutor};
pub use clean::{
    DeriveStageExecutor, FilterStageExecutor, NarrowStageExecutor, RescaleStageExecutor,
};
pub use join::JoinStageExecutor;
pub use project::{KeyStageExecutor, ProjectStageExecutor};
pub use sort::ReleaseSortStageExecutor;

/// Pipeline stages, in execution order. The number is the checkpoint suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    /// Movies and credits inner-joined on the identifier
    Joined,
    /// Only the analysis fields retained
    Projected,
    /// Identifier moved first and checked unique
    Keyed,
    /// Rows without a positive budget dropped
    BudgetFiltered,
    /// `success_impact` added
    ImpactDerived,
    /// Popularity min-max rescaled into [0, 100]
    PopularityRescaled,
    /// Popularity narrowed to 16-bit integers
    PopularityNarrowed,
    /// Cast decoded into sorted, comma separated names
    CastFormatted,
    /// `num_characters` added from the cast
    CastCounted,
    /// Sorted by release date, newest first
    ReleaseSorted,
}

impl PipelineStage {
    pub const ALL: [Self; 10] = [
        Self::Joined,
        Self::Projected,
        Self::Keyed,
        Self::BudgetFiltered,
        Self::ImpactDerived,
        Self::PopularityRescaled,
        Self::PopularityNarrowed,
        Self::CastFormatted,
        Self::CastCounted,
        Self::ReleaseSorted,
    ];

    pub fn number(&self) -> u8 {
        match self {
            Self::Joined => 1,
            Self::Projected => 2,
            Self::Keyed => 3,
            Self::BudgetFiltered => 4,
            Self::ImpactDerived => 5,
            Self::PopularityRescaled => 6,
            Self::PopularityNarrowed => 7,
            Self::CastFormatted => 8,
            Self::CastCounted => 9,
            Self::ReleaseSorted => 10,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == n)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Joined => "Joined",
            Self::Projected => "Projected",
            Self::Keyed => "Keyed",
            Self::BudgetFiltered => "BudgetFiltered",
            Self::ImpactDerived => "ImpactDerived",
            Self::PopularityRescaled => "PopularityRescaled",
            Self::PopularityNarrowed => "PopularityNarrowed",
            Self::CastFormatted => "CastFormatted",
            Self::CastCounted => "CastCounted",
            Self::ReleaseSorted => "ReleaseSorted",
        }
    }

    pub fn parse_stage(s: &str) -> Option<Self> {
        if let Ok(n) = s.parse::<u8>() {
            return Self::from_number(n);
        }
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s))
    }

    pub fn next_stage(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous_stage(&self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    /// Label used in logs and error messages, e.g. `4 (BudgetFiltered)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.number(), self.as_str())
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of the pipeline: consumes the previous table and materialises the next.
pub trait StageExecutor {
    /// Execute this stage on the previous stage's output
    fn execute(&self, df: DataFrame) -> Result<DataFrame>;

    /// Get the stage this executor handles
    fn stage(&self) -> PipelineStage;

    /// Get a description of what this stage does
    fn description(&self) -> String;
}
