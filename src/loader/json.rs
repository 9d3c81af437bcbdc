//! JSON and JSON-lines parsing.
//!
//! A `.json` object is first read as one document (array of records, object
//! of column arrays, or object of index-keyed columns). When that fails it is
//! read as newline-delimited records.

use crate::dataset::{CellValue, Column, Dataset};
use serde_json::{Map, Value};

type Strategy = fn(&[u8]) -> Result<Dataset, String>;

/// Parsing strategies, in trial order.
const STRATEGIES: [(&str, Strategy); 2] = [("document", parse_document), ("lines", parse_lines)];

/// # Errors
///
/// Returns the reasons of every strategy when none of them succeeds.
pub fn parse(raw: &[u8]) -> Result<Dataset, String> {
    let mut reasons = Vec::new();
    for (name, strategy) in STRATEGIES {
        match strategy(raw) {
            Ok(ds) => return Ok(ds),
            Err(reason) => {
                tracing::debug!(strategy = name, reason = %reason, "Rejected JSON strategy");
                reasons.push(format!("{name}: {reason}"));
            }
        }
    }
    Err(reasons.join("; "))
}

fn strip_bom(raw: &[u8]) -> &[u8] {
    raw.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(raw)
}

/// Reads `raw` as a single JSON document.
///
/// # Errors
///
/// Fails on invalid JSON or a document that does not describe a table.
pub fn parse_document(raw: &[u8]) -> Result<Dataset, String> {
    let doc: Value = serde_json::from_slice(strip_bom(raw)).map_err(|e| e.to_string())?;
    match doc {
        Value::Array(items) => {
            let records = items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::Object(map) => Ok(map),
                    _ => Err(format!("array element {i} is not an object")),
                })
                .collect::<Result<Vec<_>, _>>()?;
            records_to_dataset(records)
        }
        Value::Object(map) => columns_to_dataset(map),
        _ => Err("top-level value is neither an array nor an object".to_owned()),
    }
}

/// Reads `raw` as one JSON object per non-blank line.
///
/// # Errors
///
/// Fails on non-UTF-8 input, an invalid line, a line that is not an object,
/// or input without any records.
pub fn parse_lines(raw: &[u8]) -> Result<Dataset, String> {
    let text = std::str::from_utf8(strip_bom(raw)).map_err(|e| e.to_string())?;
    let mut records = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => records.push(map),
            Ok(_) => return Err(format!("line {} is not an object", idx + 1)),
            Err(e) => return Err(format!("line {}: {e}", idx + 1)),
        }
    }
    if records.is_empty() {
        return Err("no records".to_owned());
    }
    records_to_dataset(records)
}

/// Union of record keys in first-appearance order; absent keys are null.
fn records_to_dataset(records: Vec<Map<String, Value>>) -> Result<Dataset, String> {
    let mut names: Vec<String> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let mut columns: Vec<Vec<CellValue>> = names
        .iter()
        .map(|_| Vec::with_capacity(records.len()))
        .collect();
    for mut record in records {
        for (name, column) in names.iter().zip(columns.iter_mut()) {
            column.push(record.remove(name).map_or(CellValue::Null, CellValue::from_json));
        }
    }

    build(names.into_iter().zip(columns).collect())
}

/// Object of arrays (equal lengths) or object of objects keyed by row index.
fn columns_to_dataset(map: Map<String, Value>) -> Result<Dataset, String> {
    if map.values().all(Value::is_array) {
        let columns = map
            .into_iter()
            .map(|(name, value)| {
                let values = match value {
                    Value::Array(items) => items.into_iter().map(CellValue::from_json).collect(),
                    _ => Vec::new(),
                };
                (name, values)
            })
            .collect();
        return build(columns);
    }

    if map.values().all(Value::is_object) {
        let mut index: Vec<String> = Vec::new();
        for inner in map.values().filter_map(Value::as_object) {
            for key in inner.keys() {
                if !index.contains(key) {
                    index.push(key.clone());
                }
            }
        }
        let columns = map
            .into_iter()
            .map(|(name, value)| {
                let mut inner = match value {
                    Value::Object(inner) => inner,
                    _ => Map::new(),
                };
                let values = index
                    .iter()
                    .map(|key| inner.remove(key).map_or(CellValue::Null, CellValue::from_json))
                    .collect();
                (name, values)
            })
            .collect();
        return build(columns);
    }

    Err("object values must be all arrays or all objects".to_owned())
}

fn build(columns: Vec<(String, Vec<CellValue>)>) -> Result<Dataset, String> {
    Dataset::new(
        columns
            .into_iter()
            .map(|(name, values)| Column::new(name, values))
            .collect(),
    )
    .map_err(|e| e.to_string())
}
