//! Projection stages - retain the analysis fields and key rows by identifier

use super::{PipelineStage, StageExecutor};
use crate::analyser::logic::{key_by, project};
use crate::error::Result;
use polars::prelude::*;

pub struct ProjectStageExecutor {
    pub fields: Vec<String>,
}

impl ProjectStageExecutor {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }
}

impl StageExecutor for ProjectStageExecutor {
    fn execute(&self, df: DataFrame) -> Result<DataFrame> {
        project(&df, &self.fields)
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::Projected
    }

    fn description(&self) -> String {
        format!("Retain {} fields", self.fields.len())
    }
}

pub struct KeyStageExecutor {
    pub key: String,
}

impl KeyStageExecutor {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl StageExecutor for KeyStageExecutor {
    fn execute(&self, df: DataFrame) -> Result<DataFrame> {
        key_by(&df, &self.key)
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::Keyed
    }

    fn description(&self) -> String {
        format!("Key rows by '{}'", self.key)
    }
}
