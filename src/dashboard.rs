//! Chart data for the interactive dashboard.
//!
//! Nothing here draws. [`DashboardData::build`] turns the final pipeline
//! table into the series a charting front end needs (a pie of genres, a bar
//! chart of countries, a score/impact scatter and a releases-per-year line),
//! all serialisable to JSON.

use crate::analyser::logic::types::{
    COUNTRIES_FIELD, GENRES_FIELD, LANGUAGE_FIELD, RELEASE_DATE_FIELD, SUCCESS_IMPACT_FIELD,
    TITLE_FIELD, VOTE_AVERAGE_FIELD, numeric_values, text_values,
};
use crate::analyser::logic::{
    AggregateOptions, Aggregation, BucketOrder, aggregate_field, year_values,
};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroUsize;

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    /// Release years to keep; empty keeps every row
    pub years: Vec<i32>,
    /// Buckets per distribution before the rest goes to `Others`
    pub top_n: NonZeroUsize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            years: Vec::new(),
            top_n: NonZeroUsize::new(DEFAULT_TOP_N).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl DashboardOptions {
    pub fn with_years(mut self, years: impl IntoIterator<Item = i32>) -> Self {
        self.years = years.into_iter().collect();
        self
    }

    pub fn with_top_n(mut self, top_n: NonZeroUsize) -> Self {
        self.top_n = top_n;
        self
    }
}

/// One movie on the vote average / success impact scatter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorePoint {
    pub title: String,
    pub vote_average: f64,
    pub success_impact: f64,
    pub original_language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardData {
    /// Every release year in the table, ascending
    pub available_years: Vec<i32>,
    pub selected_years: Vec<i32>,
    /// Rows left after the year filter
    pub movie_count: usize,
    pub genre_distribution: Aggregation,
    /// Country buckets, ordered by name
    pub country_distribution: Aggregation,
    pub score_vs_impact: Vec<ScorePoint>,
    pub releases_per_year: BTreeMap<i32, usize>,
}

impl DashboardData {
    pub fn build(df: &DataFrame, options: &DashboardOptions) -> Result<Self> {
        let years = year_values(df, RELEASE_DATE_FIELD)?;
        let available_years: Vec<i32> = years
            .iter()
            .flatten()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let filtered = filter_years(df, &years, &options.years)?;
        tracing::info!(
            "Dashboard over {} of {} movies (years: {:?})",
            filtered.height(),
            df.height(),
            options.years
        );

        let genre_distribution =
            aggregate_field(&filtered, GENRES_FIELD, &AggregateOptions::new(options.top_n))?;
        let country_distribution = aggregate_field(
            &filtered,
            COUNTRIES_FIELD,
            &AggregateOptions::new(options.top_n).ordered_by(BucketOrder::NameAscending),
        )?;

        let mut releases_per_year = BTreeMap::new();
        for year in year_values(&filtered, RELEASE_DATE_FIELD)?.into_iter().flatten() {
            *releases_per_year.entry(year).or_insert(0) += 1;
        }

        Ok(Self {
            available_years,
            selected_years: options.years.clone(),
            movie_count: filtered.height(),
            genre_distribution,
            country_distribution,
            score_vs_impact: score_points(&filtered)?,
            releases_per_year,
        })
    }
}

fn filter_years(df: &DataFrame, years: &[Option<i32>], selected: &[i32]) -> Result<DataFrame> {
    if selected.is_empty() {
        return Ok(df.clone());
    }
    let mask: Vec<bool> = years
        .iter()
        .map(|year| year.is_some_and(|y| selected.contains(&y)))
        .collect();
    Ok(df.filter(&BooleanChunked::from_slice(PlSmallStr::EMPTY, &mask))?)
}

/// Rows where both the vote average and the success impact are present.
fn score_points(df: &DataFrame) -> Result<Vec<ScorePoint>> {
    let titles = text_values(df, TITLE_FIELD)?;
    let votes = numeric_values(df, VOTE_AVERAGE_FIELD)?;
    let impacts = numeric_values(df, SUCCESS_IMPACT_FIELD)?;
    let languages = text_values(df, LANGUAGE_FIELD)?;

    Ok(titles
        .into_iter()
        .zip(votes)
        .zip(impacts)
        .zip(languages)
        .filter_map(|(((title, vote), impact), language)| {
            Some(ScorePoint {
                title: title.unwrap_or_default(),
                vote_average: vote?,
                success_impact: impact?,
                original_language: language,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PolarsResult<DataFrame> {
        df![
            "title" => ["Alpha", "Beta", "Gamma", "Delta"],
            "release_date" => [Some("2015-06-01"), Some("2012-01-20"), Some("2015-11-11"), None],
            "genres" => [
                r#"[{"name": "Drama"}, {"name": "Action"}]"#,
                r#"[{"name": "Drama"}]"#,
                r#"[{"name": "Comedy"}]"#,
                "[]",
            ],
            "production_countries" => [
                r#"[{"name": "France"}]"#,
                r#"[{"name": "Canada"}]"#,
                r#"[{"name": "France"}, {"name": "Brazil"}]"#,
                "[]",
            ],
            "vote_average" => [Some(7.5), Some(6.0), None, Some(5.0)],
            "success_impact" => [Some(2.0), Some(0.5), Some(1.0), Some(3.0)],
            "original_language" => ["en", "fr", "en", "de"],
        ]
    }

    #[test]
    fn test_build_without_year_filter() -> anyhow::Result<()> {
        let data = DashboardData::build(&sample()?, &DashboardOptions::default())?;

        assert_eq!(data.available_years, vec![2012, 2015]);
        assert_eq!(data.movie_count, 4);
        assert_eq!(data.genre_distribution.counts.get("Drama"), Some(2));
        assert_eq!(
            data.country_distribution.counts.names(),
            vec!["Brazil", "Canada", "France"]
        );
        assert_eq!(data.releases_per_year.get(&2015), Some(&2));
        assert_eq!(data.releases_per_year.get(&2012), Some(&1));
        // Gamma has no vote average
        let titles: Vec<&str> = data.score_vs_impact.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Beta", "Delta"]);
        Ok(())
    }

    #[test]
    fn test_year_filter_restricts_every_series() -> anyhow::Result<()> {
        let options = DashboardOptions::default().with_years([2012]);
        let data = DashboardData::build(&sample()?, &options)?;

        assert_eq!(data.available_years, vec![2012, 2015]);
        assert_eq!(data.movie_count, 1);
        assert_eq!(data.genre_distribution.counts.names(), vec!["Drama"]);
        assert_eq!(data.country_distribution.counts.names(), vec!["Canada"]);
        assert_eq!(data.releases_per_year.len(), 1);
        assert_eq!(data.score_vs_impact.len(), 1);
        Ok(())
    }

    #[test]
    fn test_top_n_folds_into_others() -> anyhow::Result<()> {
        let options = DashboardOptions::default().with_top_n(NonZeroUsize::MIN);
        let data = DashboardData::build(&sample()?, &options)?;

        let genres = &data.genre_distribution.counts;
        assert_eq!(genres.names(), vec!["Drama", "Others"]);
        assert_eq!(genres.total(), 4);
        Ok(())
    }

    #[test]
    fn test_unmatched_years_warn_instead_of_failing() -> anyhow::Result<()> {
        let options = DashboardOptions::default().with_years([1990]);
        let data = DashboardData::build(&sample()?, &options)?;

        assert_eq!(data.movie_count, 0);
        assert!(data.genre_distribution.warning.is_some());
        assert!(data.score_vs_impact.is_empty());
        Ok(())
    }
}
