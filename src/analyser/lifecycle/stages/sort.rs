//! Sort stage - newest releases first

use super::{PipelineStage, StageExecutor};
use crate::analyser::logic::sort_by_date_desc;
use crate::error::Result;
use polars::prelude::*;

pub struct ReleaseSortStageExecutor {
    pub field: String,
}

impl ReleaseSortStageExecutor {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl StageExecutor for ReleaseSortStageExecutor {
    fn execute(&self, df: DataFrame) -> Result<DataFrame> {
        sort_by_date_desc(&df, &self.field)
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::ReleaseSorted
    }

    fn description(&self) -> String {
        format!("Sort by {} descending, missing dates last", self.field)
    }
}
