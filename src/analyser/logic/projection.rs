use super::io::move_to_front;
use super::types::require_field;
use crate::error::{PipelineError, Result};
use polars::prelude::*;

/// Keeps exactly `fields`, in the order given. Row order and count are unchanged.
///
/// # Errors
///
/// [`PipelineError::MissingField`] naming the first requested field that the
/// table does not have.
pub fn project<S: AsRef<str>>(df: &DataFrame, fields: &[S]) -> Result<DataFrame> {
    let names: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
    for name in &names {
        require_field(df, name)?;
    }
    Ok(df.select(names)?)
}

/// Re-keys a table by `key`: the key becomes the first column and must be unique.
///
/// # Errors
///
/// [`PipelineError::MissingField`] when `key` is absent, [`PipelineError::Schema`]
/// when two rows share a key or a key is null.
pub fn key_by(df: &DataFrame, key: &str) -> Result<DataFrame> {
    let ids = require_field(df, key)?
        .as_materialized_series()
        .cast(&DataType::Int64)?;

    let nulls = ids.null_count();
    if nulls > 0 {
        return Err(PipelineError::Schema(format!(
            "'{key}' is null in {nulls} rows"
        )));
    }

    let distinct = ids.n_unique()?;
    if distinct < ids.len() {
        return Err(PipelineError::Schema(format!(
            "'{key}' has {} repeated values",
            ids.len() - distinct
        )));
    }

    move_to_front(df, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> anyhow::Result<DataFrame> {
        Ok(df![
            "title" => ["A", "B", "C"],
            "id" => [3_i64, 1, 2],
            "budget" => [1.0, 2.0, 3.0],
            "crew" => ["[]", "[]", "[]"],
        ]?)
    }

    #[test]
    fn test_project_keeps_requested_order() -> anyhow::Result<()> {
        let projected = project(&table()?, &["budget", "title"])?;
        assert_eq!(projected.get_column_names_str(), vec!["budget", "title"]);
        assert_eq!(projected.height(), 3);
        Ok(())
    }

    #[test]
    fn test_project_missing_field() -> anyhow::Result<()> {
        let err = project(&table()?, &["title", "revenue"]).expect_err("revenue is absent");
        assert!(matches!(err, PipelineError::MissingField(ref f) if f == "revenue"));
        Ok(())
    }

    #[test]
    fn test_key_by_moves_key_first() -> anyhow::Result<()> {
        let keyed = key_by(&table()?, "id")?;
        assert_eq!(keyed.get_column_names_str(), vec!["id", "title", "budget", "crew"]);
        Ok(())
    }

    #[test]
    fn test_key_by_rejects_duplicates() -> anyhow::Result<()> {
        let df = df!["id" => [1_i64, 1]]?;
        assert!(matches!(key_by(&df, "id"), Err(PipelineError::Schema(_))));
        Ok(())
    }

    #[test]
    fn test_key_by_rejects_null_key() -> anyhow::Result<()> {
        let df = df!["id" => [Some(1_i64), None]]?;
        let err = key_by(&df, "id").expect_err("null key");
        assert!(matches!(err, PipelineError::Schema(ref msg) if msg.contains("null")), "got {err}");
        Ok(())
    }
}
