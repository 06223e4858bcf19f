//! Pipeline execution engine.
//!
//! Runs the lifecycle stages in order, saving each output as a checkpoint,
//! and produces a [`RunReport`].

use crate::analyser::lifecycle::stages::{
    CastCountStageExecutor, CastFormatStageExecutor, DeriveStageExecutor, FilterStageExecutor,
    JoinStageExecutor, KeyStageExecutor, NarrowStageExecutor, ProjectStageExecutor,
    ReleaseSortStageExecutor, RescaleStageExecutor,
};
use crate::analyser::lifecycle::{CheckpointStore, PipelineStage, StageExecutor};
use crate::analyser::logic::types::{
    BUDGET_FIELD, CAST_COUNT_FIELD, CAST_FIELD, COUNTRIES_FIELD, GENRES_FIELD,
    POPULARITY_FIELD, RELEASE_DATE_FIELD, TITLE_FIELD,
};
use crate::analyser::logic::{
    AggregateOptions, Aggregation, BucketOrder, Derivation, NoDataWarning, aggregate_field,
    load_df, shape, top_k_titles,
};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Names of the summary steps that run after the last stage
pub const TOP_K_STEP: &str = "top-K selection";
pub const AGGREGATION_STEP: &str = "aggregation";

/// Shape and checkpoint of one executed stage
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: PipelineStage,
    pub rows: usize,
    pub columns: usize,
    pub path: PathBuf,
}

/// Report generated after pipeline execution
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Stages executed by this run, in order
    pub stages: Vec<StageReport>,

    /// Titles of the movies with the most cast entries
    pub top_cast_titles: Vec<String>,

    pub genres: Aggregation,

    /// Country buckets, ordered by name
    pub countries: Aggregation,

    pub warnings: Vec<NoDataWarning>,

    /// Time taken for execution
    pub duration: Duration,
}

impl RunReport {
    /// Create a summary message
    pub fn summary(&self) -> String {
        let final_shape = self
            .stages
            .last()
            .map(|s| format!("{} rows x {} columns", s.rows, s.columns))
            .unwrap_or_else(|| "no stages run".to_owned());
        format!(
            "Pipeline completed: {} stages, final table {}, {} genre buckets, {} country buckets, {} warnings, {:.2}s",
            self.stages.len(),
            final_shape,
            self.genres.counts.len(),
            self.countries.counts.len(),
            self.warnings.len(),
            self.duration.as_secs_f64()
        )
    }
}

/// Execute the batch, optionally resuming at `resume_from`.
///
/// A fresh run loads the movies and credits tables named by `config`. A
/// resumed run re-loads the checkpoint of the stage before `resume_from`
/// instead. Any failure is reported as [`PipelineError::Stage`] naming the
/// stage that failed.
pub fn run_pipeline(
    config: &PipelineConfig,
    resume_from: Option<PipelineStage>,
) -> Result<RunReport> {
    let start = Instant::now();
    config.validate()?;

    let store =
        CheckpointStore::with_prefix(config.output_dir.clone(), config.checkpoint_prefix.clone())?;
    let first = resume_from.unwrap_or(PipelineStage::Joined);
    tracing::info!("Checkpoints in {}", store.base_path().display());

    let (mut df, mut credits) = match first.previous_stage() {
        None => {
            let movies = load_input(&config.movies_path, first)?;
            let credits = load_input(&config.credits_path, first)?;
            (movies, Some(credits))
        }
        Some(previous) => {
            tracing::info!("Resuming at stage {} from checkpoint {}", first.label(), previous.label());
            let df = store.load(previous).map_err(|e| failed_in(e, &first.label()))?;
            store.clear_after(previous)?;
            (df, None)
        }
    };

    let mut stages = Vec::new();
    for stage in PipelineStage::ALL.into_iter().filter(|s| *s >= first) {
        let executor = stage_executor(stage, config, &mut credits)?;
        tracing::info!("Stage {}: {}", stage.label(), executor.description());

        df = executor
            .execute(df)
            .map_err(|e| failed_in(e, &stage.label()))?;
        let path = store
            .save(stage, &df)
            .map_err(|e| failed_in(e, &stage.label()))?;

        let (rows, columns) = shape(&df);
        tracing::info!("Stage {} shape: ({}, {})", stage.label(), rows, columns);
        stages.push(StageReport {
            stage,
            rows,
            columns,
            path,
        });
    }

    let top_cast_titles = top_k_titles(&df, CAST_COUNT_FIELD, TITLE_FIELD, config.cast_top_k)
        .map_err(|e| failed_in(e, TOP_K_STEP))?;
    tracing::info!("Top {} titles by cast size: {:?}", config.cast_top_k, top_cast_titles);

    let genres = aggregate_field(&df, GENRES_FIELD, &AggregateOptions::new(config.genre_top_n()?))
        .map_err(|e| failed_in(e, AGGREGATION_STEP))?;
    let countries = aggregate_field(
        &df,
        COUNTRIES_FIELD,
        &AggregateOptions::new(config.country_top_n()?).ordered_by(BucketOrder::NameAscending),
    )
    .map_err(|e| failed_in(e, AGGREGATION_STEP))?;

    let warnings = [&genres, &countries]
        .into_iter()
        .filter_map(|a| a.warning.clone())
        .collect();

    let report = RunReport {
        stages,
        top_cast_titles,
        genres,
        countries,
        warnings,
        duration: start.elapsed(),
    };
    tracing::info!("{}", report.summary());
    Ok(report)
}

/// The stage after the furthest checkpoint on disk, if the last run stopped early.
pub fn resume_point(config: &PipelineConfig) -> Result<Option<PipelineStage>> {
    let store =
        CheckpointStore::with_prefix(config.output_dir.clone(), config.checkpoint_prefix.clone())?;
    Ok(store.latest().and_then(|stage| stage.next_stage()))
}

fn load_input(path: &std::path::Path, stage: PipelineStage) -> Result<DataFrame> {
    let df = load_df(path).map_err(|e| failed_in(e, &stage.label()))?;
    let (rows, columns) = shape(&df);
    tracing::info!("Loaded {}: ({}, {})", path.display(), rows, columns);
    Ok(df)
}

/// Logs the underlying cause and tags `err` with the step that was running.
fn failed_in(err: PipelineError, step: &str) -> PipelineError {
    tracing::error!("{} failed: {}", step, err.root());
    err.in_stage(step)
}

/// The executor for `stage` as configured.
///
/// The join stage consumes `credits`, which is only available on a fresh run.
pub fn stage_executor(
    stage: PipelineStage,
    config: &PipelineConfig,
    credits: &mut Option<DataFrame>,
) -> Result<Box<dyn StageExecutor>> {
    Ok(match stage {
        PipelineStage::Joined => {
            let right = credits.take().ok_or_else(|| {
                PipelineError::Config("The join stage needs the credits table".to_owned())
                    .in_stage(stage.label())
            })?;
            Box::new(JoinStageExecutor::new(right, config.join_key.clone()))
        }
        PipelineStage::Projected => {
            Box::new(ProjectStageExecutor::new(config.selected_fields.clone()))
        }
        PipelineStage::Keyed => Box::new(KeyStageExecutor::new(config.join_key.clone())),
        PipelineStage::BudgetFiltered => Box::new(FilterStageExecutor::new(
            BUDGET_FIELD,
            config.budget_threshold,
        )),
        PipelineStage::ImpactDerived => {
            Box::new(DeriveStageExecutor::new(Derivation::success_impact()))
        }
        PipelineStage::PopularityRescaled => Box::new(RescaleStageExecutor::new(
            POPULARITY_FIELD,
            config.popularity_upper,
        )),
        PipelineStage::PopularityNarrowed => Box::new(NarrowStageExecutor::new(
            POPULARITY_FIELD,
            config.popularity_width,
        )),
        PipelineStage::CastFormatted => Box::new(CastFormatStageExecutor::new(CAST_FIELD)),
        PipelineStage::CastCounted => {
            Box::new(CastCountStageExecutor::new(CAST_FIELD, CAST_COUNT_FIELD))
        }
        PipelineStage::ReleaseSorted => {
            Box::new(ReleaseSortStageExecutor::new(RELEASE_DATE_FIELD))
        }
    })
}
