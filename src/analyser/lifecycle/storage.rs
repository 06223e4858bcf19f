//! Checkpoint storage for stage outputs
//!
//! Every stage writes its table as `{prefix}{N}.csv` in one directory, so
//! any stage can be re-run from the previous stage's file alone.

use super::stages::PipelineStage;
use crate::analyser::logic::{load_df, save_df};
use crate::error::{PipelineError, Result, ResultExt as _};
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PREFIX: &str = "output_df";

/// Directory of stage checkpoints
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    base_path: PathBuf,
    prefix: String,
}

impl CheckpointStore {
    pub fn new(base_path: PathBuf) -> Result<Self> {
        Self::with_prefix(base_path, DEFAULT_PREFIX)
    }

    pub fn with_prefix(base_path: PathBuf, prefix: impl Into<String>) -> Result<Self> {
        fs::create_dir_all(&base_path).context("Failed to create checkpoint directory")?;
        Ok(Self {
            base_path,
            prefix: prefix.into(),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the path of a stage's checkpoint file
    pub fn path(&self, stage: PipelineStage) -> PathBuf {
        self.base_path
            .join(format!("{}{}.csv", self.prefix, stage.number()))
    }

    pub fn exists(&self, stage: PipelineStage) -> bool {
        self.path(stage).exists()
    }

    /// Persist a stage's output table
    pub fn save(&self, stage: PipelineStage, df: &DataFrame) -> Result<PathBuf> {
        let path = self.path(stage);
        save_df(df, &path).with_context(|| format!("Failed to save checkpoint {}", stage.label()))?;
        tracing::info!(
            "Saved stage {} checkpoint to {}",
            stage.label(),
            path.display()
        );
        Ok(path)
    }

    /// Re-load a stage's output table
    pub fn load(&self, stage: PipelineStage) -> Result<DataFrame> {
        let path = self.path(stage);
        if !path.exists() {
            return Err(PipelineError::Config(format!(
                "No checkpoint for stage {} at {}",
                stage.label(),
                path.display()
            )));
        }
        load_df(&path).with_context(|| format!("Failed to load checkpoint {}", stage.label()))
    }

    /// The furthest stage whose checkpoint is on disk
    pub fn latest(&self) -> Option<PipelineStage> {
        PipelineStage::ALL
            .into_iter()
            .rev()
            .find(|stage| self.exists(*stage))
    }

    /// Remove every checkpoint after `stage` so a resumed run cannot mix outputs
    pub fn clear_after(&self, stage: PipelineStage) -> Result<usize> {
        let mut removed = 0;
        for later in PipelineStage::ALL.into_iter().filter(|s| *s > stage) {
            let path = self.path(later);
            if path.exists() {
                fs::remove_file(&path).context("Failed to remove stale checkpoint")?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_checkpoint_paths() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let store = CheckpointStore::new(temp.path().to_path_buf())?;

        assert_eq!(
            store.path(PipelineStage::Joined),
            temp.path().join("output_df1.csv")
        );
        assert_eq!(
            store.path(PipelineStage::ReleaseSorted),
            temp.path().join("output_df10.csv")
        );
        Ok(())
    }

    #[test]
    fn test_save_load_and_latest() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let store = CheckpointStore::new(temp.path().to_path_buf())?;
        assert_eq!(store.latest(), None);

        let df = df!["id" => [1_i64, 2], "budget" => [5.0, 6.0]]?;
        store.save(PipelineStage::Keyed, &df)?;
        store.save(PipelineStage::BudgetFiltered, &df)?;

        assert_eq!(store.latest(), Some(PipelineStage::BudgetFiltered));
        assert!(store.load(PipelineStage::Keyed)?.equals(&df));

        assert_eq!(store.clear_after(PipelineStage::Keyed)?, 1);
        assert_eq!(store.latest(), Some(PipelineStage::Keyed));
        Ok(())
    }

    #[test]
    fn test_missing_checkpoint_is_reported() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let store = CheckpointStore::new(temp.path().to_path_buf())?;
        let err = store.load(PipelineStage::CastCounted).expect_err("nothing saved");
        assert!(err.to_string().contains("No checkpoint for stage 9"));
        Ok(())
    }
}
