//! Integration tests for full batch runs
//!
//! These tests seed a filesystem object store with the fixture files under
//! `testdata/`, run the aggregator end to end and inspect the published
//! report document.

use anyhow::Result;
use serde_json::{Value, json};
use std::path::Path;
use tabloid::batch::run_batch;
use tabloid::config::{FailurePolicy, PlatformConfig};
use tabloid::error::PlatformError;
use tabloid::storage::{FsStore, ObjectStore as _};
use tempfile::TempDir;

const FIXTURES: [&str; 4] = [
    "orders.csv",
    "customers.tsv",
    "stores_latin1.csv",
    "events.json",
];

fn store_with(fixtures: &[&str]) -> Result<(TempDir, FsStore, PlatformConfig)> {
    let dir = tempfile::tempdir()?;
    let store = FsStore::new(dir.path());
    let config = PlatformConfig {
        storage_root: dir.path().to_path_buf(),
        ..PlatformConfig::default()
    };
    store.make_bucket(&config.input_namespace)?;
    for name in fixtures {
        let bytes = std::fs::read(Path::new("testdata").join(name))?;
        store.put_object(&config.input_namespace, name, &bytes, "text/csv")?;
    }
    Ok((dir, store, config))
}

fn published(store: &FsStore, config: &PlatformConfig) -> Result<Value> {
    let bytes = store.get_object(&config.output_namespace, &config.report_object)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[test]
fn test_batch_over_mixed_formats() -> Result<()> {
    let (_dir, store, config) = store_with(&FIXTURES)?;
    let report = run_batch(&store, &config)?;

    assert_eq!(report.total_rows, 9, "2 tsv + 2 jsonl + 3 csv + 2 latin-1 csv rows");
    assert_eq!(report.total_columns, 11);
    assert_eq!(report.columns.numeric, vec!["Identifier", "amount"]);
    assert!(
        report.columns.categorical.contains(&"express".to_owned()),
        "boolean column must be categorical"
    );

    let doc = published(&store, &config)?;
    assert_eq!(
        doc["identifier_stats"],
        json!({"min": 1, "max": 9, "mean": 4.75, "unique": 4})
    );
    assert_eq!(doc["missing_values"]["Identifier"], json!(1));
    assert_eq!(doc["missing_values"]["name"], json!(7));
    assert_eq!(doc["missing_values"]["source_file"], json!(0));
    // The repeated orders row, compared by text because of the nested payload.
    assert_eq!(doc["duplicate_rows"], json!(1));
    assert_eq!(doc["annotations"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[test]
fn test_spec_shaped_two_file_run() -> Result<()> {
    let (dir, store, config) = store_with(&[])?;
    store.put_object(&config.input_namespace, "b.csv", b"id,val\n3,30\n", "text/csv")?;
    store.put_object(&config.input_namespace, "a.csv", b"id,val\n1,10\n2,20\n", "text/csv")?;

    run_batch(&store, &config)?;
    let doc = published(&store, &config)?;

    assert_eq!(doc["total_rows"], json!(3));
    assert_eq!(doc["total_columns"], json!(3));
    assert_eq!(doc["columns"]["numeric"], json!(["id", "val"]));
    assert_eq!(doc["columns"]["categorical"], json!(["source_file"]));
    assert_eq!(doc["duplicate_rows"], json!(0));
    assert!(doc.get("identifier_stats").is_none());

    let report_path = dir
        .path()
        .join(&config.output_namespace)
        .join(&config.report_object);
    assert!(report_path.is_file());
    Ok(())
}

#[test]
fn test_empty_input_writes_nothing() -> Result<()> {
    let (dir, store, config) = store_with(&[])?;
    let err = run_batch(&store, &config).expect_err("empty namespace must fail");

    assert!(matches!(err, PlatformError::NoInputData { .. }));
    assert!(!dir.path().join(&config.output_namespace).exists());
    Ok(())
}

#[test]
fn test_republishing_is_byte_identical() -> Result<()> {
    let (_dir, store, config) = store_with(&FIXTURES)?;

    run_batch(&store, &config)?;
    let first = store.get_object(&config.output_namespace, &config.report_object)?;
    run_batch(&store, &config)?;
    let second = store.get_object(&config.output_namespace, &config.report_object)?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_single_column_file_aborts_by_default() -> Result<()> {
    let (dir, store, config) = store_with(&["orders.csv", "single_column.csv"])?;
    let err = run_batch(&store, &config).expect_err("single-column file must fail");

    assert!(matches!(err, PlatformError::ParseFailure { .. }));
    assert!(!dir.path().join(&config.output_namespace).exists());
    Ok(())
}

#[test]
fn test_single_column_file_skipped_when_configured() -> Result<()> {
    let (_dir, store, config) = store_with(&["orders.csv", "single_column.csv"])?;
    let config = PlatformConfig {
        on_file_error: FailurePolicy::Skip,
        ..config
    };

    let report = run_batch(&store, &config)?;
    assert_eq!(report.total_rows, 3);

    let doc = published(&store, &config)?;
    assert_eq!(doc["skipped_files"][0]["name"], json!("single_column.csv"));
    Ok(())
}
