use super::types::require_field;
use crate::error::Result;
use chrono::{Datelike as _, NaiveDate, NaiveDateTime};
use polars::prelude::*;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parses one date, returning `None` for anything unreadable.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Converts `field` to a `Date` column. Unparsable text becomes null.
///
/// Columns that are already `Date` or `Datetime` are only normalised to `Date`.
pub fn parse_date_field(df: &DataFrame, field: &str) -> Result<DataFrame> {
    let column = require_field(df, field)?;
    let series = column.as_materialized_series();

    let parsed = match series.dtype() {
        DataType::Date => series.clone(),
        DataType::Datetime(_, _) => series.cast(&DataType::Date)?,
        _ => {
            let text = series.cast(&DataType::String)?;
            let dates: Vec<Option<NaiveDate>> = text
                .str()?
                .into_iter()
                .map(|v| v.and_then(parse_date))
                .collect();
            let unparsed = dates.iter().filter(|d| d.is_none()).count();
            if unparsed > 0 {
                tracing::debug!("{} values of '{}' coerced to null", unparsed, field);
            }
            DateChunked::from_naive_date_options(field.into(), dates).into_series()
        }
    };

    let mut out = df.clone();
    out.with_column(parsed)?;
    Ok(out)
}

/// Parses `field` as a date and sorts by it, newest first, nulls last.
///
/// The sort is stable: rows with equal dates (or no date) keep their order.
pub fn sort_by_date_desc(df: &DataFrame, field: &str) -> Result<DataFrame> {
    let parsed = parse_date_field(df, field)?;
    Ok(parsed
        .lazy()
        .sort_by_exprs(
            vec![col(field)],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .collect()?)
}

/// Dates of a field already converted by [`parse_date_field`].
pub fn date_values(df: &DataFrame, field: &str) -> Result<Vec<Option<NaiveDate>>> {
    let parsed = parse_date_field(df, field)?;
    let dates = require_field(&parsed, field)?.as_materialized_series();
    Ok(dates.date()?.as_date_iter().collect())
}

/// Release year of each row, `None` when the date is missing.
pub fn year_values(df: &DataFrame, field: &str) -> Result<Vec<Option<i32>>> {
    Ok(date_values(df, field)?
        .into_iter()
        .map(|d| d.map(|d| d.year()))
        .collect())
}
