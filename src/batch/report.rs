//! The analytics report document.
//!
//! Top-level keys serialize in declaration order and `missing_values` is a
//! sorted map, so identical reports always render to identical bytes.

use crate::analyser::{self, ColumnKind, CountMode, NumericSummary};
use crate::dataset::Dataset;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ColumnGroups {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

/// An input object left out of the run, with the reason.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub name: String,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub total_rows: usize,
    pub total_columns: usize,
    pub columns: ColumnGroups,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier_stats: Option<NumericSummary>,
    pub missing_values: BTreeMap<String, usize>,
    /// `None` when duplicate detection was unavailable.
    pub duplicate_rows: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_files: Vec<SkippedFile>,
    /// Notes on statistics computed in a degraded mode.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,
}

impl Report {
    /// Computes every report statistic over the unified dataset.
    pub fn summarize(dataset: &Dataset, identifier_column: &str) -> Self {
        let mut columns = ColumnGroups::default();
        for col in dataset.columns() {
            match analyser::classify(col) {
                ColumnKind::Numeric => columns.numeric.push(col.name.clone()),
                ColumnKind::Categorical => columns.categorical.push(col.name.clone()),
            }
        }

        let identifier_stats = dataset
            .column(identifier_column)
            .and_then(analyser::numeric_summary);

        let duplicates = analyser::count_duplicate_rows(dataset);
        let mut annotations = Vec::new();
        match duplicates.mode {
            CountMode::Exact => {}
            CountMode::Approximate => annotations
                .push("duplicate_rows: compared by text representation of cells".to_owned()),
            CountMode::Unavailable => {
                annotations.push("duplicate_rows: detection unavailable".to_owned());
            }
        }

        Self {
            total_rows: dataset.row_count(),
            total_columns: dataset.column_count(),
            columns,
            identifier_stats,
            missing_values: analyser::missing_counts(dataset),
            duplicate_rows: duplicates.value,
            skipped_files: Vec::new(),
            annotations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{CellValue, Column};
    use serde_json::json;

    #[test]
    fn test_identifier_stats_present_for_numeric_identifier() -> anyhow::Result<()> {
        let ds = Dataset::new(vec![Column::new(
            "Identifier",
            [5, 1, 5, 9].into_iter().map(CellValue::Integer).collect(),
        )])?;
        let report = Report::summarize(&ds, "Identifier");

        let value = serde_json::to_value(&report)?;
        assert_eq!(
            value["identifier_stats"],
            json!({"min": 1, "max": 9, "mean": 5.0, "unique": 3})
        );
        assert_eq!(report.duplicate_rows, Some(1));
        Ok(())
    }

    #[test]
    fn test_identifier_stats_omitted_when_absent_or_not_numeric() -> anyhow::Result<()> {
        let ds = Dataset::new(vec![
            Column::new("id", vec![CellValue::Integer(1)]),
            Column::new("Identifier", vec![CellValue::Text("A-1".to_owned())]),
        ])?;
        let report = Report::summarize(&ds, "Identifier");
        assert!(report.identifier_stats.is_none());

        let value = serde_json::to_value(&report)?;
        assert!(value.get("identifier_stats").is_none());
        assert!(value.get("skipped_files").is_none());
        assert!(value.get("annotations").is_none());
        Ok(())
    }

    #[test]
    fn test_boolean_columns_are_not_numeric() -> anyhow::Result<()> {
        let ds = Dataset::new(vec![
            Column::new("flag", vec![CellValue::Boolean(true), CellValue::Boolean(false)]),
            Column::new("n", vec![CellValue::Float(1.5), CellValue::Null]),
        ])?;
        let report = Report::summarize(&ds, "Identifier");
        assert_eq!(report.columns.numeric, vec!["n"]);
        assert_eq!(report.columns.categorical, vec!["flag"]);
        assert_eq!(report.missing_values.get("n"), Some(&1));
        Ok(())
    }

    #[test]
    fn test_degraded_duplicates_are_annotated() -> anyhow::Result<()> {
        let ds = Dataset::new(vec![Column::new("payload", vec![
            CellValue::from_json(json!([1])),
            CellValue::from_json(json!([1])),
        ])])?;
        let report = Report::summarize(&ds, "Identifier");
        assert_eq!(report.duplicate_rows, Some(1));
        assert_eq!(report.annotations.len(), 1);
        Ok(())
    }

    #[test]
    fn test_key_order_matches_document_shape() -> anyhow::Result<()> {
        let ds = Dataset::new(vec![Column::new("Identifier", vec![CellValue::Integer(1)])])?;
        let value = serde_json::to_value(Report::summarize(&ds, "Identifier"))?;
        let keys: Vec<&str> = value
            .as_object()
            .expect("report is an object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec![
            "total_rows",
            "total_columns",
            "columns",
            "identifier_stats",
            "missing_values",
            "duplicate_rows"
        ]);
        Ok(())
    }
}
