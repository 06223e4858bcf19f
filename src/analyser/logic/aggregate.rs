//! Frequency counts over list-valued fields with top-N + `Others` bucketing.

use super::nested::parse_field;
use super::types::{CategoryBucket, CategoryCount, OTHERS_BUCKET, list_column, text_values};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;

/// Order of the buckets in the final count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketOrder {
    /// Count descending, ties by name ascending, `Others` last.
    #[default]
    CountDescending,
    /// Every bucket, `Others` included, by name ascending.
    NameAscending,
}

/// How the category lists are stored in the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategorySource {
    /// Encoded nested text or an already parsed list column.
    #[default]
    Nested,
    /// A flat text value split on a separator (the formatted cast field).
    Delimited(String),
}

/// Non-fatal signal that an aggregation found nothing to count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoDataWarning {
    pub field: String,
}

impl fmt::Display for NoDataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No category data found in '{}'", self.field)
    }
}

/// Result of an aggregation: the buckets, plus a warning when there were none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    pub counts: CategoryCount,
    pub warning: Option<NoDataWarning>,
}

#[derive(Debug, Clone)]
pub struct AggregateOptions {
    pub top_n: NonZeroUsize,
    pub order: BucketOrder,
    pub source: CategorySource,
}

impl AggregateOptions {
    pub fn new(top_n: NonZeroUsize) -> Self {
        Self {
            top_n,
            order: BucketOrder::CountDescending,
            source: CategorySource::Nested,
        }
    }

    pub fn ordered_by(mut self, order: BucketOrder) -> Self {
        self.order = order;
        self
    }

    pub fn from_source(mut self, source: CategorySource) -> Self {
        self.source = source;
        self
    }
}

/// Occurrences of every distinct category in a `List(String)` column.
///
/// The lists are exploded into one name per row and counted with
/// `value_counts`. Empty and null lists contribute nothing.
pub fn count_categories(lists: &Series) -> Result<HashMap<String, usize>> {
    let names = lists.explode()?.drop_nulls();
    let mut freq = HashMap::new();
    if names.is_empty() {
        return Ok(freq);
    }

    let value_counts = names.value_counts(true, false, "counts".into(), false)?;
    let values = value_counts.column(names.name())?.as_materialized_series();
    let counts = value_counts.column("counts")?.as_materialized_series();

    for (value, count) in values.str()?.into_iter().zip(counts.u32()?) {
        if let (Some(v), Some(c)) = (value, count) {
            freq.insert(v.to_owned(), c as usize);
        }
    }
    Ok(freq)
}

/// Keeps the `top_n` most frequent categories and sums the rest into `Others`.
///
/// Equal counts are ranked by name ascending so the cut is deterministic.
/// `Others` is only emitted when the remainder is positive; a real category
/// already called `Others` absorbs it. The bucket total always equals the
/// input total and there are never more than `top_n + 1` buckets.
pub fn bucket_top_n(
    counts: HashMap<String, usize>,
    top_n: NonZeroUsize,
    order: BucketOrder,
) -> CategoryCount {
    let mut ranked: Vec<CategoryBucket> = counts
        .into_iter()
        .map(|(name, count)| CategoryBucket { name, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

    let rest = ranked.split_off(top_n.get().min(ranked.len()));
    let others: usize = rest.iter().map(|b| b.count).sum();

    let mut buckets = ranked;
    if others > 0 {
        match buckets.iter_mut().find(|b| b.name == OTHERS_BUCKET) {
            Some(existing) => existing.count += others,
            None => buckets.push(CategoryBucket {
                name: OTHERS_BUCKET.to_owned(),
                count: others,
            }),
        }
    }

    if order == BucketOrder::NameAscending {
        buckets.sort_by(|a, b| a.name.cmp(&b.name));
    }
    CategoryCount::new(buckets)
}

/// Aggregates already extracted category lists.
pub fn aggregate_rows(
    rows: &[Vec<String>],
    field: &str,
    options: &AggregateOptions,
) -> Result<Aggregation> {
    let counts = count_categories(&list_column(field, rows))?;
    if counts.is_empty() {
        let warning = NoDataWarning {
            field: field.to_owned(),
        };
        tracing::warn!("{warning}");
        return Ok(Aggregation {
            counts: CategoryCount::default(),
            warning: Some(warning),
        });
    }

    Ok(Aggregation {
        counts: bucket_top_n(counts, options.top_n, options.order),
        warning: None,
    })
}

/// Aggregates the categories held by `field` of every record.
///
/// # Errors
///
/// Only fails when `field` is absent or unreadable; an empty multiset is a
/// [`NoDataWarning`], not an error.
pub fn aggregate_field(
    df: &DataFrame,
    field: &str,
    options: &AggregateOptions,
) -> Result<Aggregation> {
    let rows = match &options.source {
        CategorySource::Nested => parse_field(df, field)?,
        CategorySource::Delimited(separator) => text_values(df, field)?
            .into_iter()
            .map(|text| split_delimited(text.as_deref(), separator))
            .collect(),
    };

    let aggregation = aggregate_rows(&rows, field, options)?;
    tracing::info!(
        "Aggregated '{}': {} buckets, {} occurrences",
        field,
        aggregation.counts.len(),
        aggregation.counts.total()
    );
    Ok(aggregation)
}

/// Segments of a delimited value; empty or null text has none.
pub fn split_delimited(text: Option<&str>, separator: &str) -> Vec<String> {
    match text {
        Some(t) if !t.is_empty() => t.split(separator).map(str::to_owned).collect(),
        _ => Vec::new(),
    }
}
