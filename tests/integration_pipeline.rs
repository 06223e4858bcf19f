//! Integration tests for the full pipeline
//!
//! These tests run every stage over the fixture tables in `testdata/` and
//! verify the checkpoints, the summaries and the dashboard data end to end.

#![expect(clippy::unwrap_used, clippy::indexing_slicing)]

use marquee::analyser::lifecycle::{CheckpointStore, PipelineStage};
use marquee::analyser::logic::load_df;
use marquee::analyser::logic::types::text_values;
use marquee::config::PipelineConfig;
use marquee::dashboard::{DashboardData, DashboardOptions};
use marquee::error::PipelineError;
use marquee::export::movie_documents;
use marquee::pipeline::run_pipeline;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata").join(name)
}

fn config_in(dir: &Path) -> PipelineConfig {
    PipelineConfig {
        movies_path: fixture("movies.csv"),
        credits_path: fixture("credits.csv"),
        output_dir: dir.to_path_buf(),
        ..Default::default()
    }
}

fn titles(df: &polars::prelude::DataFrame) -> Vec<String> {
    text_values(df, "title")
        .unwrap()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect()
}

#[test]
fn test_full_run_writes_every_checkpoint() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let report = run_pipeline(&config_in(temp.path()), None)?;

    assert_eq!(report.stages.len(), 10);
    for number in 1..=10 {
        let path = temp.path().join(format!("output_df{number}.csv"));
        assert!(path.exists(), "missing checkpoint {}", path.display());
    }

    // 107 has no credits and 999 no movie
    assert_eq!(report.stages[0].rows, 6);
    // Projection keeps exactly the analysis fields
    assert_eq!(report.stages[1].columns, 16);
    // The zero-budget movie is dropped
    assert_eq!(report.stages[3].rows, 5);
    assert_eq!(report.stages[4].columns, 17);
    assert_eq!(report.stages[8].columns, 18);
    Ok(())
}

#[test]
fn test_summaries_match_fixture() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let report = run_pipeline(&config_in(temp.path()), None)?;

    assert_eq!(
        report.top_cast_titles,
        vec!["Toy Story", "Skyfall", "Paprika", "Spectre", "Amélie"]
    );

    let genres = &report.genres.counts;
    assert_eq!(genres.total(), 13);
    assert_eq!(genres.get("Action"), Some(2));
    assert_eq!(genres.get("Animation"), Some(2));
    assert_eq!(genres.get("Drama"), None);
    assert_eq!(genres.get("Others"), None);

    let countries = &report.countries.counts;
    assert_eq!(
        countries.names(),
        vec![
            "France",
            "Germany",
            "Japan",
            "United Kingdom",
            "United States of America"
        ]
    );
    assert_eq!(countries.get("United States of America"), Some(3));
    assert!(report.warnings.is_empty());
    Ok(())
}

#[test]
fn test_final_table_contents() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    run_pipeline(&config_in(temp.path()), None)?;
    let store = CheckpointStore::new(temp.path().to_path_buf())?;
    let df = store.load(PipelineStage::ReleaseSorted)?;

    // Newest first, the undated film last
    assert_eq!(
        titles(&df),
        vec!["Spectre", "Skyfall", "Amélie", "Toy Story", "Paprika"]
    );

    let popularity: Vec<Option<i64>> = df
        .column("popularity")?
        .as_materialized_series()
        .i64()?
        .into_iter()
        .collect();
    assert_eq!(
        popularity,
        vec![Some(100), Some(86), Some(14), Some(0), Some(4)]
    );

    let cast = text_values(&df, "cast")?;
    assert_eq!(
        cast[1].as_deref(),
        Some("Daniel Craig, Javier Bardem, Judi Dench, Ralph Fiennes")
    );

    let impact = df.column("success_impact")?.as_materialized_series().f64()?.get(1);
    let expected = (1_108_561_013.0 - 200_000_000.0) / 200_000_000.0;
    assert!((impact.unwrap() - expected).abs() < 1e-9);

    assert_eq!(df.get_column_names_str()[0], "id");
    Ok(())
}

#[test]
fn test_resume_from_checkpoint() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let config = config_in(temp.path());
    let full = run_pipeline(&config, None)?;

    let resumed = run_pipeline(&config, Some(PipelineStage::CastCounted))?;
    let resumed_stages: Vec<PipelineStage> = resumed.stages.iter().map(|s| s.stage).collect();
    assert_eq!(
        resumed_stages,
        vec![PipelineStage::CastCounted, PipelineStage::ReleaseSorted]
    );
    assert_eq!(resumed.top_cast_titles, full.top_cast_titles);
    assert_eq!(resumed.genres, full.genres);
    assert_eq!(resumed.countries, full.countries);
    Ok(())
}

#[test]
fn test_missing_input_names_first_stage() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let config = PipelineConfig {
        movies_path: temp.path().join("absent.csv"),
        ..config_in(temp.path())
    };

    let err = run_pipeline(&config, None).unwrap_err();
    assert!(matches!(err, PipelineError::Stage { .. }));
    assert!(err.to_string().starts_with("Stage 1 (Joined) failed"), "{err}");
    Ok(())
}

#[test]
fn test_aggregation_failure_names_step() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let base = config_in(temp.path());
    let config = PipelineConfig {
        selected_fields: base
            .selected_fields
            .iter()
            .filter(|f| f.as_str() != "genres")
            .cloned()
            .collect(),
        ..base
    };

    let err = run_pipeline(&config, None).unwrap_err();
    assert!(err.to_string().starts_with("Stage aggregation failed"), "{err}");
    assert!(matches!(err.root(), PipelineError::MissingField(f) if f == "genres"));
    // Every numbered stage still ran
    assert!(temp.path().join("output_df10.csv").exists());
    Ok(())
}

#[test]
fn test_dashboard_over_final_table() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    run_pipeline(&config_in(temp.path()), None)?;
    let df = load_df(&temp.path().join("output_df10.csv"))?;

    let all = DashboardData::build(&df, &DashboardOptions::default())?;
    assert_eq!(all.available_years, vec![1995, 2001, 2012, 2015]);
    assert_eq!(all.movie_count, 5);
    assert_eq!(all.score_vs_impact.len(), 5);
    assert_eq!(all.releases_per_year.values().sum::<usize>(), 4);

    let recent = DashboardData::build(&df, &DashboardOptions::default().with_years([2012, 2015]))?;
    assert_eq!(recent.movie_count, 2);
    assert_eq!(recent.genre_distribution.counts.get("Action"), Some(2));
    assert_eq!(
        recent.country_distribution.counts.names(),
        vec!["United Kingdom", "United States of America"]
    );
    Ok(())
}

#[test]
fn test_export_documents_from_fixtures() -> anyhow::Result<()> {
    let movies = load_df(&fixture("movies.csv"))?;
    let credits = load_df(&fixture("credits.csv"))?;

    let documents = movie_documents(&movies, &credits, "id")?;
    assert_eq!(documents.height(), 6);
    assert!(documents.get_column_index("cast").is_some());
    Ok(())
}
