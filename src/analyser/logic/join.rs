//! Inner join of two tables on a shared identifier.

use super::types::require_field;
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::collections::HashSet;

/// Suffixes appended to non-key columns present on both sides.
pub const LEFT_SUFFIX: &str = "_x";
pub const RIGHT_SUFFIX: &str = "_y";

const ROW_ORDER: &str = "__left_row";

/// Inner-joins `left` and `right` on `key`.
///
/// Output rows follow the order of `left`. Columns present on both sides
/// (other than the key) are renamed with [`LEFT_SUFFIX`] / [`RIGHT_SUFFIX`].
///
/// # Errors
///
/// [`PipelineError::Schema`] when `key` is absent from either table or does
/// not identify rows uniquely on one side.
pub fn inner_join(left: &DataFrame, right: &DataFrame, key: &str) -> Result<DataFrame> {
    ensure_unique_key(left, key, "left")?;
    ensure_unique_key(right, key, "right")?;

    let right_names: HashSet<String> = right
        .get_column_names()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    let left_names: HashSet<String> = left
        .get_column_names()
        .into_iter()
        .map(ToString::to_string)
        .collect();

    let left_exprs = suffixed_projection(left, key, &right_names, LEFT_SUFFIX);
    let right_exprs = suffixed_projection(right, key, &left_names, RIGHT_SUFFIX);

    let joined = left
        .clone()
        .lazy()
        .select(left_exprs)
        .with_row_index(ROW_ORDER, None)
        .join(
            right.clone().lazy().select(right_exprs),
            [col(key)],
            [col(key)],
            JoinArgs::new(JoinType::Inner),
        )
        .sort_by_exprs(vec![col(ROW_ORDER)], SortMultipleOptions::default())
        .collect()?;

    Ok(joined.drop(ROW_ORDER)?)
}

/// Key cast to `Int64` first, shared columns suffixed, everything else as is.
fn suffixed_projection(
    df: &DataFrame,
    key: &str,
    other_side: &HashSet<String>,
    suffix: &str,
) -> Vec<Expr> {
    df.get_column_names()
        .into_iter()
        .map(|name| {
            let name = name.as_str();
            if name == key {
                col(name).cast(DataType::Int64)
            } else if other_side.contains(name) {
                col(name).alias(format!("{name}{suffix}"))
            } else {
                col(name)
            }
        })
        .collect()
}

fn ensure_unique_key(df: &DataFrame, key: &str, side: &str) -> Result<()> {
    let column = require_field(df, key).map_err(|_| {
        PipelineError::Schema(format!("join key '{key}' is missing from the {side} table"))
    })?;
    let ids = column
        .as_materialized_series()
        .cast(&DataType::Int64)?
        .drop_nulls();

    let distinct = ids.n_unique()?;
    if distinct < ids.len() {
        return Err(PipelineError::Schema(format!(
            "join key '{key}' is not unique in the {side} table ({} repeated values)",
            ids.len() - distinct
        )));
    }
    Ok(())
}
