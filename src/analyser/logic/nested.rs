//! Decoding of semi-structured list fields (`cast`, `genres`,
//! `production_countries`).
//!
//! Values arrive either as JSON text, as JSON text written with Python-style
//! single quotes, or as an already decoded list. Decoding never fails: a
//! value that cannot be read as a list yields no entities, so one bad record
//! never stops a batch.

use super::types::{
    CAST_SEPARATOR, is_list_field, list_column, list_values, require_field, text_values,
};
use crate::error::Result;
use polars::prelude::*;
use serde_json::Value;

/// Entity names from one encoded field value.
pub fn parse_entities(raw: &str) -> Vec<String> {
    match decode_text(raw) {
        Some(Value::Array(items)) => items.iter().map(entity_name).collect(),
        Some(_) => {
            tracing::debug!("Nested value is not a list: {}", preview(raw));
            Vec::new()
        }
        None => {
            tracing::debug!("Unreadable nested value: {}", preview(raw));
            Vec::new()
        }
    }
}

/// Strict JSON first, then one retry with single quotes turned into double quotes.
fn decode_text(raw: &str) -> Option<Value> {
    serde_json::from_str(raw)
        .or_else(|_| serde_json::from_str(&raw.replace('\'', "\"")))
        .ok()
}

fn entity_name(item: &Value) -> String {
    match item {
        Value::Object(map) => match map.get("name") {
            Some(Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
            None => item.to_string(),
        },
        Value::String(name) => name.clone(),
        other => other.to_string(),
    }
}

/// Sorted names joined with `", "`, the flat form used for the cast field.
fn join_sorted(mut names: Vec<String>) -> String {
    names.sort();
    names.join(CAST_SEPARATOR)
}

/// Per-row entity names of `field`, whatever its current representation.
///
/// `List(String)` columns are taken as they are; text columns are decoded;
/// nulls yield empty lists.
pub fn parse_field(df: &DataFrame, field: &str) -> Result<Vec<Vec<String>>> {
    if is_list_field(df, field)? {
        return list_values(df, field);
    }
    Ok(text_values(df, field)?
        .into_iter()
        .map(|raw| raw.as_deref().map(parse_entities).unwrap_or_default())
        .collect())
}

/// Replaces `field` with a `List(String)` column of decoded entity names.
pub fn parse_list_field(df: &DataFrame, field: &str) -> Result<DataFrame> {
    let rows = parse_field(df, field)?;
    let mut out = df.clone();
    out.with_column(list_column(field, &rows))?;
    Ok(out)
}

/// Replaces `field` with its flat cast form; unreadable or null values become `""`.
pub fn format_cast_field(df: &DataFrame, field: &str) -> Result<DataFrame> {
    require_field(df, field)?;
    let formatted: Vec<String> = parse_field(df, field)?
        .into_iter()
        .map(join_sorted)
        .collect();

    let mut out = df.clone();
    out.with_column(Series::new(field.into(), formatted))?;
    Ok(out)
}

fn preview(raw: &str) -> String {
    raw.chars().take(60).collect()
}
