//! Join stage - merges the credits table into the movies table

use super::{PipelineStage, StageExecutor};
use crate::analyser::logic::inner_join;
use crate::error::Result;
use polars::prelude::*;

/// Inner-joins the incoming table (movies) with a fixed right-hand table (credits).
pub struct JoinStageExecutor {
    pub right: DataFrame,
    pub key: String,
}

impl JoinStageExecutor {
    pub fn new(right: DataFrame, key: impl Into<String>) -> Self {
        Self {
            right,
            key: key.into(),
        }
    }
}

impl StageExecutor for JoinStageExecutor {
    fn execute(&self, df: DataFrame) -> Result<DataFrame> {
        inner_join(&df, &self.right, &self.key)
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::Joined
    }

    fn description(&self) -> String {
        format!(
            "Inner join with {} credit rows on '{}'",
            self.right.height(),
            self.key
        )
    }
}
