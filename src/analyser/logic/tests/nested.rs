use crate::analyser::logic::types::list_values;
use crate::analyser::logic::*;
use anyhow::Result;
use polars::prelude::*;

#[test]
fn test_strict_json_objects() {
    let raw = r#"[{"id": 28, "name": "Action"}, {"id": 12, "name": "Adventure"}]"#;
    assert_eq!(parse_entities(raw), vec!["Action", "Adventure"]);
}

#[test]
fn test_single_quoted_uses_repaired_decode() {
    assert_eq!(parse_entities("[{'name': 'Action'}]"), vec!["Action"]);
}

#[test]
fn test_plain_string_list() {
    assert_eq!(
        parse_entities(r#"["France", "Germany"]"#),
        vec!["France", "Germany"]
    );
}

#[test]
fn test_malformed_input_yields_empty_list() {
    assert!(parse_entities(r#"[{"name": "Action""#).is_empty());
    assert!(parse_entities("").is_empty());
    assert!(parse_entities("not json at all").is_empty());
}

#[test]
fn test_non_list_value_yields_empty_list() {
    assert!(parse_entities(r#"{"name": "Action"}"#).is_empty());
    assert!(parse_entities("42").is_empty());
}

#[test]
fn test_elements_without_name_are_stringified() {
    let raw = r#"[{"id": 1}, 7, {"name": 3}, "Drama"]"#;
    assert_eq!(
        parse_entities(raw),
        vec![r#"{"id":1}"#, "7", "3", "Drama"]
    );
}

#[test]
fn test_format_cast_sorts_and_joins() -> Result<()> {
    let df = df!(
        "cast" => &[
            r#"[{"name": "Zoe Saldana"}, {"name": "Sam Worthington"}, {"name": "Sigourney Weaver"}]"#,
            "[broken",
        ]
    )?;

    let formatted = format_cast_field(&df, "cast")?;

    let values: Vec<Option<&str>> = formatted
        .column("cast")?
        .as_materialized_series()
        .str()?
        .into_iter()
        .collect();
    assert_eq!(
        values,
        vec![Some("Sam Worthington, Sigourney Weaver, Zoe Saldana"), Some("")]
    );
    Ok(())
}

#[test]
fn test_format_cast_field_isolates_bad_rows() -> Result<()> {
    let df = df!(
        "cast" => &[Some(r#"[{"name": "B"}, {"name": "A"}]"#), Some("{{oops"), None]
    )?;

    let formatted = format_cast_field(&df, "cast")?;

    let values: Vec<Option<&str>> = formatted
        .column("cast")?
        .as_materialized_series()
        .str()?
        .into_iter()
        .collect();
    assert_eq!(values, vec![Some("A, B"), Some(""), Some("")]);
    Ok(())
}

#[test]
fn test_parse_list_field_round_trips_through_list_column() -> Result<()> {
    let df = df!(
        "genres" => &[r#"[{"name": "Action"}]"#, "[]", "[{'name': 'Drama'}, {'name': 'Crime'}]"]
    )?;

    let parsed = parse_list_field(&df, "genres")?;
    assert!(matches!(
        parsed.column("genres")?.dtype(),
        DataType::List(_)
    ));

    let rows = list_values(&parsed, "genres")?;
    assert_eq!(rows[0], vec!["Action"]);
    assert!(rows[1].is_empty());
    assert_eq!(rows[2], vec!["Drama", "Crime"]);

    // Parsing an already structured column is a no-op.
    assert_eq!(parse_field(&parsed, "genres")?, rows);
    Ok(())
}
