//! Cast stages - flatten the cast list and count its entries

use super::{PipelineStage, StageExecutor};
use crate::analyser::logic::types::CAST_SEPARATOR;
use crate::analyser::logic::{add_segment_count, format_cast_field};
use crate::error::Result;
use polars::prelude::*;

pub struct CastFormatStageExecutor {
    pub field: String,
}

impl CastFormatStageExecutor {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl StageExecutor for CastFormatStageExecutor {
    fn execute(&self, df: DataFrame) -> Result<DataFrame> {
        format_cast_field(&df, &self.field)
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::CastFormatted
    }

    fn description(&self) -> String {
        format!("Decode {} into sorted names", self.field)
    }
}

pub struct CastCountStageExecutor {
    pub field: String,
    pub target: String,
}

impl CastCountStageExecutor {
    pub fn new(field: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            target: target.into(),
        }
    }
}

impl StageExecutor for CastCountStageExecutor {
    fn execute(&self, df: DataFrame) -> Result<DataFrame> {
        add_segment_count(&df, &self.field, &self.target, CAST_SEPARATOR)
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::CastCounted
    }

    fn description(&self) -> String {
        format!("Count entries of {} into {}", self.field, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_then_count() -> anyhow::Result<()> {
        let df = df![
            "cast" => [r#"[{"name": "Zed"}, {"name": "Amy"}]"#, "not json"],
        ]?;

        let df = CastFormatStageExecutor::new("cast").execute(df)?;
        let df = CastCountStageExecutor::new("cast", "num_characters").execute(df)?;

        let counts: Vec<Option<u32>> = df
            .column("num_characters")?
            .as_materialized_series()
            .u32()?
            .into_iter()
            .collect();
        assert_eq!(counts, vec![Some(2), Some(0)]);
        Ok(())
    }
}
