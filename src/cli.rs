use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use marquee::analyser::lifecycle::{CheckpointStore, PipelineStage};
use marquee::analyser::logic::load_df;
use marquee::analyser::logic::types::ID_FIELD;
use marquee::config::PipelineConfig;
use marquee::dashboard::{DashboardData, DashboardOptions};
use marquee::export::{movie_documents, write_documents};
use marquee::pipeline::{RunReport, resume_point, run_pipeline};
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "marquee", about = "Movie metadata analytics pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the staged pipeline and print the summaries
    Run {
        /// Path to a JSON pipeline configuration file
        #[arg(short, long, env = "MARQUEE_CONFIG")]
        config: Option<PathBuf>,

        /// Movies table. Overrides the config file.
        #[arg(long)]
        movies: Option<PathBuf>,

        /// Credits table. Overrides the config file.
        #[arg(long)]
        credits: Option<PathBuf>,

        /// Directory for stage checkpoints. Overrides the config file.
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Resume at this stage (number or name) from the previous checkpoint
        #[arg(long, value_parser = parse_stage)]
        resume_from: Option<PipelineStage>,

        /// Resume after the furthest checkpoint already in the output directory
        #[arg(long, conflicts_with = "resume_from")]
        resume: bool,
    },
    /// Build the dashboard chart data from the final table
    Dashboard {
        /// Path to a JSON pipeline configuration file
        #[arg(short, long, env = "MARQUEE_CONFIG")]
        config: Option<PathBuf>,

        /// Final pipeline table. Defaults to the last checkpoint of the configured output directory.
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Release years to include. All years when omitted.
        #[arg(long, num_args = 1..)]
        years: Vec<i32>,

        /// Buckets per distribution before the rest is grouped as Others
        #[arg(long)]
        top_n: Option<NonZeroUsize>,

        /// Write the chart data here instead of printing it
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Join movies and credits and write them as newline-delimited JSON documents
    Export {
        #[arg(long)]
        movies: PathBuf,

        #[arg(long)]
        credits: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Join key shared by both tables
        #[arg(long, default_value = ID_FIELD)]
        key: String,
    },
}

pub fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            config,
            movies,
            credits,
            output_dir,
            resume_from,
            resume,
        } => handle_run(config, movies, credits, output_dir, resume_from, resume),
        Commands::Dashboard {
            config,
            input,
            years,
            top_n,
            json,
        } => handle_dashboard(config, input, years, top_n, json),
        Commands::Export {
            movies,
            credits,
            output,
            key,
        } => handle_export(movies, credits, output, &key),
    }
}

fn parse_stage(s: &str) -> Result<PipelineStage, String> {
    PipelineStage::parse_stage(s).ok_or_else(|| format!("unknown stage '{s}' (expected 1-10 or a stage name)"))
}

fn load_config(path: Option<PathBuf>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_file(&path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn handle_run(
    config: Option<PathBuf>,
    movies: Option<PathBuf>,
    credits: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    resume_from: Option<PipelineStage>,
    resume: bool,
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(movies) = movies {
        config.movies_path = movies;
    }
    if let Some(credits) = credits {
        config.credits_path = credits;
    }
    if let Some(output_dir) = output_dir {
        config.output_dir = output_dir;
    }

    let resume_from = if resume {
        let point = resume_point(&config)?;
        if point.is_none() {
            tracing::info!("No interrupted run to resume, running every stage");
        }
        point
    } else {
        resume_from
    };

    let report = run_pipeline(&config, resume_from)?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    for stage in &report.stages {
        println!(
            "Stage {:<24} ({}, {})  {}",
            stage.stage.label(),
            stage.rows,
            stage.columns,
            stage.path.display()
        );
    }

    println!("\nMovies with the largest casts:");
    for (rank, title) in report.top_cast_titles.iter().enumerate() {
        println!("{:>3}. {title}", rank + 1);
    }

    println!("\nGenres:");
    for bucket in &report.genres.counts {
        println!("  {:<24} {}", bucket.name, bucket.count);
    }

    println!("\nProduction countries:");
    for bucket in &report.countries.counts {
        println!("  {:<40} {}", bucket.name, bucket.count);
    }

    for warning in &report.warnings {
        println!("\nWarning: {warning}");
    }
    println!("\n{}", report.summary());
}

fn handle_dashboard(
    config: Option<PathBuf>,
    input: Option<PathBuf>,
    years: Vec<i32>,
    top_n: Option<NonZeroUsize>,
    json: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config)?;
    let input = match input {
        Some(path) => path,
        None => CheckpointStore::with_prefix(
            config.output_dir.clone(),
            config.checkpoint_prefix.clone(),
        )?
        .path(PipelineStage::ReleaseSorted),
    };

    let df = load_df(&input).with_context(|| format!("Failed to load {}", input.display()))?;
    let top_n = match top_n {
        Some(n) => n,
        None => config.dashboard_top_n()?,
    };
    let options = DashboardOptions::default()
        .with_years(years)
        .with_top_n(top_n);

    let data = DashboardData::build(&df, &options)?;
    let rendered = serde_json::to_string_pretty(&data)?;
    match json {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Dashboard data written to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn handle_export(movies: PathBuf, credits: PathBuf, output: PathBuf, key: &str) -> Result<()> {
    let movies = load_df(&movies).with_context(|| format!("Failed to load {}", movies.display()))?;
    let credits =
        load_df(&credits).with_context(|| format!("Failed to load {}", credits.display()))?;

    let documents = movie_documents(&movies, &credits, key)?;
    let written = write_documents(&documents, &output)?;
    println!("Exported {written} documents to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_resume_stage_accepts_number_or_name() {
        assert_eq!(parse_stage("9"), Ok(PipelineStage::CastCounted));
        assert_eq!(parse_stage("releasesorted"), Ok(PipelineStage::ReleaseSorted));
        assert!(parse_stage("11").is_err());
    }

    #[test]
    fn test_dashboard_years_parse() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["marquee", "dashboard", "--years", "2012", "2015"])?;
        match cli.command {
            Commands::Dashboard { years, .. } => assert_eq!(years, vec![2012, 2015]),
            _ => anyhow::bail!("expected the dashboard command"),
        }
        Ok(())
    }
}
