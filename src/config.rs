use crate::analyser::lifecycle::storage::DEFAULT_PREFIX;
use crate::analyser::logic::IntWidth;
use crate::analyser::logic::types::{ID_FIELD, SELECTED_FIELDS};
use crate::error::{PipelineError, Result, ResultExt as _};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Settings of one batch run. Every field has a default, so a config file
/// only needs the values it changes.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    /// Movies table (left side of the join)
    pub movies_path: PathBuf,
    /// Credits table (right side of the join)
    pub credits_path: PathBuf,
    /// Directory receiving the stage checkpoints
    pub output_dir: PathBuf,
    /// Checkpoint file name prefix, followed by the stage number
    pub checkpoint_prefix: String,
    pub join_key: String,
    /// Fields retained by the projection stage, in order
    pub selected_fields: Vec<String>,
    /// Rows need a budget strictly above this to survive
    pub budget_threshold: f64,
    /// Upper bound of the rescaled popularity range
    pub popularity_upper: f64,
    pub popularity_width: IntWidth,
    /// Titles reported for the largest casts
    pub cast_top_k: usize,
    pub genre_top_n: usize,
    pub country_top_n: usize,
    /// Buckets shown by the dashboard charts
    pub dashboard_top_n: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            movies_path: PathBuf::from("movies.csv"),
            credits_path: PathBuf::from("credits.csv"),
            output_dir: PathBuf::from("data"),
            checkpoint_prefix: DEFAULT_PREFIX.to_owned(),
            join_key: ID_FIELD.to_owned(),
            selected_fields: SELECTED_FIELDS.iter().map(|f| (*f).to_owned()).collect(),
            budget_threshold: 0.0,
            popularity_upper: 100.0,
            popularity_width: IntWidth::I16,
            cast_top_k: 10,
            genre_top_n: 15,
            country_top_n: 13,
            dashboard_top_n: 10,
        }
    }
}

impl PipelineConfig {
    /// Load a config from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the config as pretty JSON
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.join_key.is_empty() {
            return Err(PipelineError::Config("join_key must not be empty".to_owned()));
        }
        if self.selected_fields.is_empty() {
            return Err(PipelineError::Config(
                "selected_fields must name at least one field".to_owned(),
            ));
        }
        if !self.selected_fields.contains(&self.join_key) {
            return Err(PipelineError::Config(format!(
                "selected_fields must include the join key '{}'",
                self.join_key
            )));
        }
        if !(self.popularity_upper.is_finite() && self.popularity_upper > 0.0) {
            return Err(PipelineError::Config(
                "popularity_upper must be a positive number".to_owned(),
            ));
        }
        if self.cast_top_k == 0 {
            return Err(PipelineError::Config("cast_top_k must be at least 1".to_owned()));
        }
        self.genre_top_n()?;
        self.country_top_n()?;
        self.dashboard_top_n()?;
        Ok(())
    }

    pub fn genre_top_n(&self) -> Result<NonZeroUsize> {
        non_zero("genre_top_n", self.genre_top_n)
    }

    pub fn country_top_n(&self) -> Result<NonZeroUsize> {
        non_zero("country_top_n", self.country_top_n)
    }

    pub fn dashboard_top_n(&self) -> Result<NonZeroUsize> {
        non_zero("dashboard_top_n", self.dashboard_top_n)
    }
}

fn non_zero(name: &str, value: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(value)
        .ok_or_else(|| PipelineError::Config(format!("{name} must be at least 1")))
}
