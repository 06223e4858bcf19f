//! Document export for bulk loading into a document store.
//!
//! The joined movies/credits records are written one JSON object per line,
//! with the category fields decoded into arrays of names so a store can
//! index them directly.

use crate::analyser::logic::types::{COUNTRIES_FIELD, GENRES_FIELD};
use crate::analyser::logic::{inner_join, parse_list_field, shape};
use crate::error::{Result, ResultExt as _};
use polars::prelude::*;
use std::path::Path;

/// Fields decoded into string lists before export.
pub const DOCUMENT_LIST_FIELDS: [&str; 2] = [GENRES_FIELD, COUNTRIES_FIELD];

/// Joins `movies` and `credits` on `key` and decodes the category fields.
///
/// Category fields missing from the joined table are left out silently.
pub fn movie_documents(movies: &DataFrame, credits: &DataFrame, key: &str) -> Result<DataFrame> {
    let mut documents = inner_join(movies, credits, key)?;
    for field in DOCUMENT_LIST_FIELDS {
        if documents.get_column_index(field).is_some() {
            documents = parse_list_field(&documents, field)?;
        }
    }
    Ok(documents)
}

/// Writes `df` as newline-delimited JSON, returning the number of documents.
pub fn write_documents(df: &DataFrame, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let mut df = df.clone();
    let file = std::fs::File::create(path).context("Failed to create document output file")?;
    JsonWriter::new(file)
        .with_json_format(JsonFormat::JsonLines)
        .finish(&mut df)
        .context("Failed to write documents")?;

    let (rows, _) = shape(&df);
    tracing::info!("Exported {} documents to {}", rows, path.display());
    Ok(rows)
}
