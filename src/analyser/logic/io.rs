use super::types::{is_list_field, list_values, require_field};
use crate::error::{PipelineError, Result, ResultExt as _};
use polars::prelude::*;
use std::path::Path;

pub fn load_df(path: &Path) -> Result<DataFrame> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_has_header(true)
            .finish()?
            .collect()
            .with_context(|| format!("Failed to read CSV {}", path.display())),
        "json" | "ndjson" | "jsonl" => JsonReader::new(std::fs::File::open(path)?)
            .with_json_format(JsonFormat::JsonLines)
            .finish()
            .with_context(|| format!("Failed to read JSON {}", path.display())),
        _ => Err(PipelineError::Config(format!(
            "Unsupported file extension: {ext}"
        ))),
    }
}

/// Writes a table as CSV. List columns are written as JSON arrays of strings.
pub fn save_df(df: &DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let mut encoded = encode_list_columns(df)?;
    let file = std::fs::File::create(path).context("Failed to create CSV file")?;
    CsvWriter::new(file)
        .include_header(true)
        .finish(&mut encoded)
        .context("Failed to write CSV file")?;
    Ok(())
}

/// Replaces every `List(String)` column with its JSON text encoding.
pub fn encode_list_columns(df: &DataFrame) -> Result<DataFrame> {
    let mut out = df.clone();
    let fields: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(ToString::to_string)
        .collect();

    for field in fields {
        if !is_list_field(df, &field)? {
            continue;
        }
        let encoded = list_values(df, &field)?
            .iter()
            .map(serde_json::to_string)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        out.with_column(Series::new(field.as_str().into(), encoded))?;
    }
    Ok(out)
}

/// Height and width, as logged after every stage.
pub fn shape(df: &DataFrame) -> (usize, usize) {
    (df.height(), df.width())
}

/// Moves `field` to the first position, keeping the other columns in order.
pub fn move_to_front(df: &DataFrame, field: &str) -> Result<DataFrame> {
    require_field(df, field)?;
    let mut order: Vec<String> = vec![field.to_owned()];
    order.extend(
        df.get_column_names()
            .into_iter()
            .filter(|name| name.as_str() != field)
            .map(ToString::to_string),
    );
    Ok(df.select(order)?)
}
