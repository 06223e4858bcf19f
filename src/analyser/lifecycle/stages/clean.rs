//! Clean stages - filter, derive, rescale and narrow numeric fields

use super::{PipelineStage, StageExecutor};
use crate::analyser::logic::{Derivation, IntWidth, derive, filter_greater_than, narrow, rescale};
use crate::error::Result;
use polars::prelude::*;

/// Drops rows whose field is not strictly above a threshold.
pub struct FilterStageExecutor {
    pub field: String,
    pub threshold: f64,
}

impl FilterStageExecutor {
    pub fn new(field: impl Into<String>, threshold: f64) -> Self {
        Self {
            field: field.into(),
            threshold,
        }
    }
}

impl StageExecutor for FilterStageExecutor {
    fn execute(&self, df: DataFrame) -> Result<DataFrame> {
        let before = df.height();
        let filtered = filter_greater_than(&df, &self.field, self.threshold)?;
        tracing::debug!(
            "Dropped {} rows with {} <= {}",
            before - filtered.height(),
            self.field,
            self.threshold
        );
        Ok(filtered)
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::BudgetFiltered
    }

    fn description(&self) -> String {
        format!("Keep rows where {} > {}", self.field, self.threshold)
    }
}

/// Adds a computed field.
pub struct DeriveStageExecutor {
    pub derivation: Derivation,
}

impl DeriveStageExecutor {
    pub fn new(derivation: Derivation) -> Self {
        Self { derivation }
    }
}

impl StageExecutor for DeriveStageExecutor {
    fn execute(&self, df: DataFrame) -> Result<DataFrame> {
        derive(&df, &self.derivation)
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::ImpactDerived
    }

    fn description(&self) -> String {
        format!("Derive {}", self.derivation.name)
    }
}

/// Min-max rescales a field into `[0, upper]`.
pub struct RescaleStageExecutor {
    pub field: String,
    pub upper: f64,
}

impl RescaleStageExecutor {
    pub fn new(field: impl Into<String>, upper: f64) -> Self {
        Self {
            field: field.into(),
            upper,
        }
    }
}

impl StageExecutor for RescaleStageExecutor {
    fn execute(&self, df: DataFrame) -> Result<DataFrame> {
        rescale(&df, &self.field, self.upper)
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::PopularityRescaled
    }

    fn description(&self) -> String {
        format!("Rescale {} into [0, {}]", self.field, self.upper)
    }
}

/// Casts a field to a fixed-width integer.
pub struct NarrowStageExecutor {
    pub field: String,
    pub width: IntWidth,
}

impl NarrowStageExecutor {
    pub fn new(field: impl Into<String>, width: IntWidth) -> Self {
        Self {
            field: field.into(),
            width,
        }
    }
}

impl StageExecutor for NarrowStageExecutor {
    fn execute(&self, df: DataFrame) -> Result<DataFrame> {
        narrow(&df, &self.field, self.width)
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::PopularityNarrowed
    }

    fn description(&self) -> String {
        format!("Narrow {} to {}", self.field, self.width.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_executors_chain() -> anyhow::Result<()> {
        let df = df![
            "budget" => [0_i64, 100, 200],
            "revenue" => [10_i64, 300, 100],
            "popularity" => [1.5, 3.0, 9.0],
        ]?;

        let df = FilterStageExecutor::new("budget", 0.0).execute(df)?;
        let df = DeriveStageExecutor::new(Derivation::success_impact()).execute(df)?;
        let df = RescaleStageExecutor::new("popularity", 100.0).execute(df)?;
        let df = NarrowStageExecutor::new("popularity", IntWidth::I16).execute(df)?;

        assert_eq!(df.height(), 2);
        let popularity: Vec<Option<i16>> = df
            .column("popularity")?
            .as_materialized_series()
            .i16()?
            .into_iter()
            .collect();
        assert_eq!(popularity, vec![Some(0), Some(100)]);
        Ok(())
    }

    #[test]
    fn test_executor_stages() {
        assert_eq!(
            FilterStageExecutor::new("budget", 0.0).stage(),
            PipelineStage::BudgetFiltered
        );
        assert_eq!(
            NarrowStageExecutor::new("popularity", IntWidth::I16).stage(),
            PipelineStage::PopularityNarrowed
        );
    }
}
