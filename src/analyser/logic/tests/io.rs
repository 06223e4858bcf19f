use crate::analyser::logic::types::list_values;
use crate::analyser::logic::*;
use anyhow::Result;
use polars::prelude::*;

#[test]
fn test_save_and_reload_csv() -> Result<()> {
    let df = df!(
        "id" => &[1_i64, 2, 3],
        "title" => &["x", "y", "z"]
    )?;

    let temp_dir = tempfile::tempdir()?;
    let csv_path = temp_dir.path().join("nested").join("output_df1.csv");
    save_df(&df, &csv_path)?;
    assert!(csv_path.exists());

    let reloaded = load_df(&csv_path)?;
    assert_eq!(shape(&reloaded), (3, 2));
    assert!(reloaded.equals(&df));
    Ok(())
}

#[test]
fn test_list_columns_persist_as_json_text() -> Result<()> {
    let df = df!("genres" => &[r#"[{"name": "Action"}, {"name": "Drama"}]"#, "[]"])?;
    let parsed = parse_list_field(&df, "genres")?;

    let temp_dir = tempfile::tempdir()?;
    let path = temp_dir.path().join("genres.csv");
    save_df(&parsed, &path)?;

    let reloaded = load_df(&path)?;
    assert_eq!(reloaded.column("genres")?.dtype(), &DataType::String);
    assert_eq!(
        parse_field(&reloaded, "genres")?,
        list_values(&parsed, "genres")?
    );
    Ok(())
}

#[test]
fn test_unsupported_extension() {
    let err = load_df(std::path::Path::new("movies.xlsx")).unwrap_err();
    assert!(err.to_string().contains("Unsupported file extension"));
}
