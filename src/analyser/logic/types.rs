use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Identifier shared by the movies and credits tables.
pub const ID_FIELD: &str = "id";

/// Fields kept by the projection stage, in output order.
pub const SELECTED_FIELDS: [&str; 16] = [
    "id",
    "title",
    "popularity",
    "cast",
    "crew",
    "budget",
    "genres",
    "original_language",
    "production_companies",
    "production_countries",
    "release_date",
    "revenue",
    "runtime",
    "spoken_languages",
    "vote_average",
    "vote_count",
];

pub const TITLE_FIELD: &str = "title";
pub const BUDGET_FIELD: &str = "budget";
pub const REVENUE_FIELD: &str = "revenue";
pub const POPULARITY_FIELD: &str = "popularity";
pub const CAST_FIELD: &str = "cast";
pub const GENRES_FIELD: &str = "genres";
pub const COUNTRIES_FIELD: &str = "production_countries";
pub const RELEASE_DATE_FIELD: &str = "release_date";
pub const LANGUAGE_FIELD: &str = "original_language";
pub const VOTE_AVERAGE_FIELD: &str = "vote_average";
pub const SUCCESS_IMPACT_FIELD: &str = "success_impact";
pub const CAST_COUNT_FIELD: &str = "num_characters";

/// Separator used when the cast list is flattened into one text value.
pub const CAST_SEPARATOR: &str = ", ";

/// Label of the bucket that absorbs every category outside the top N.
pub const OTHERS_BUCKET: &str = "Others";

/// One category and how often it occurred.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub name: String,
    pub count: usize,
}

/// Ordered category → occurrence count mapping produced by aggregation.
///
/// The order is meaningful: it is the order charts draw the buckets in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryCount {
    buckets: Vec<CategoryBucket>,
}

impl CategoryCount {
    pub fn new(buckets: Vec<CategoryBucket>) -> Self {
        Self { buckets }
    }

    pub fn buckets(&self) -> &[CategoryBucket] {
        &self.buckets
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.buckets
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.count)
    }

    pub fn names(&self) -> Vec<&str> {
        self.buckets.iter().map(|b| b.name.as_str()).collect()
    }

    /// Sum of every bucket, `Others` included.
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CategoryBucket> {
        self.buckets.iter()
    }
}

impl<'a> IntoIterator for &'a CategoryCount {
    type Item = &'a CategoryBucket;
    type IntoIter = std::slice::Iter<'a, CategoryBucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

/// Fails with [`PipelineError::MissingField`] unless `field` is a column of `df`.
pub fn require_field<'a>(df: &'a DataFrame, field: &str) -> Result<&'a Column> {
    df.column(field)
        .map_err(|_| PipelineError::MissingField(field.to_owned()))
}

/// Reads a column as nullable `f64` values, casting integer columns.
pub fn numeric_values(df: &DataFrame, field: &str) -> Result<Vec<Option<f64>>> {
    let series = require_field(df, field)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

/// Reads a column as nullable owned strings.
pub fn text_values(df: &DataFrame, field: &str) -> Result<Vec<Option<String>>> {
    let series = require_field(df, field)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_owned))
        .collect())
}

/// Reads a `List(String)` column into one `Vec<String>` per row; null rows are empty.
pub fn list_values(df: &DataFrame, field: &str) -> Result<Vec<Vec<String>>> {
    let series = require_field(df, field)?.as_materialized_series();
    let mut rows = Vec::with_capacity(series.len());
    for item in series.list()?.into_iter() {
        let names = match item {
            Some(inner) => inner
                .cast(&DataType::String)?
                .str()?
                .into_iter()
                .flatten()
                .map(str::to_owned)
                .collect(),
            None => Vec::new(),
        };
        rows.push(names);
    }
    Ok(rows)
}

/// Builds a `List(String)` column from per-row name lists.
pub fn list_column(name: &str, rows: &[Vec<String>]) -> Series {
    let items: Vec<Series> = rows
        .iter()
        .map(|names| Series::new(PlSmallStr::EMPTY, names.as_slice()))
        .collect();
    let mut series = Series::new(name.into(), items);
    if series.is_empty() {
        // An empty Vec<Series> infers a null dtype.
        series = Series::new_empty(name.into(), &DataType::List(Box::new(DataType::String)));
    }
    series
}

pub fn is_list_field(df: &DataFrame, field: &str) -> Result<bool> {
    Ok(matches!(require_field(df, field)?.dtype(), DataType::List(_)))
}
