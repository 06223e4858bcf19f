use super::aggregate::split_delimited;
use super::types::{require_field, text_values};
use crate::error::Result;
use polars::prelude::*;

/// Number of segments in a delimited value. Empty or null text counts 0.
pub fn count_segments(text: Option<&str>, separator: &str) -> u32 {
    u32::try_from(split_delimited(text, separator).len()).unwrap_or(u32::MAX)
}

/// Adds `target` holding the segment count of the delimited `source` field.
pub fn add_segment_count(
    df: &DataFrame,
    source: &str,
    target: &str,
    separator: &str,
) -> Result<DataFrame> {
    let counts: Vec<u32> = text_values(df, source)?
        .iter()
        .map(|text| count_segments(text.as_deref(), separator))
        .collect();

    let mut out = df.clone();
    out.with_column(Series::new(target.into(), counts))?;
    Ok(out)
}

/// Titles of the `k` rows with the highest `count_field`.
///
/// Equal counts keep their original row order; null counts rank below every
/// present count.
pub fn top_k_titles(
    df: &DataFrame,
    count_field: &str,
    title_field: &str,
    k: usize,
) -> Result<Vec<String>> {
    require_field(df, count_field)?;
    require_field(df, title_field)?;

    let top = df
        .clone()
        .lazy()
        .select([col(count_field), col(title_field)])
        .sort_by_exprs(
            vec![col(count_field)],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .limit(IdxSize::try_from(k).unwrap_or(IdxSize::MAX))
        .collect()?;

    Ok(text_values(&top, title_field)?
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}
