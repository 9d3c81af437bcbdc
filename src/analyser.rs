//! Schema and data-quality analysis.
//!
//! [`analyze`] describes every column (type, cardinality, missing values) and
//! [`count_duplicate_rows`] counts repeated rows. Neither raises: values that
//! cannot be compared exactly fall back to their canonical text, and when
//! that fails too the count is reported as unavailable.

pub mod profiling;
pub mod types;

pub use profiling::{classify, numeric_summary, unique_count};
pub use types::{
    ColumnDescriptor, ColumnKind, CountMode, CountOutcome, NumericSummary, ValueType,
};

use crate::dataset::{CellValue, Dataset};
use profiling::{COMPARISONS, Comparison};
use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

/// One descriptor per column, in column order.
pub fn analyze(dataset: &Dataset) -> Vec<ColumnDescriptor> {
    let rows = dataset.row_count();
    let descriptors: Vec<ColumnDescriptor> = dataset
        .columns()
        .iter()
        .map(|col| profiling::describe(col, rows))
        .collect();

    for d in descriptors.iter().filter(|d| d.unique.is_degraded()) {
        tracing::warn!(
            column = %d.name,
            mode = ?d.unique.mode,
            "Distinct count could not be computed exactly"
        );
    }
    descriptors
}

/// Missing cells per column, keyed by column name.
pub fn missing_counts(dataset: &Dataset) -> BTreeMap<String, usize> {
    dataset
        .columns()
        .iter()
        .map(|c| (c.name.clone(), c.null_count()))
        .collect()
}

/// Rows equal to some earlier row. Nulls compare equal to each other.
pub fn count_duplicate_rows(dataset: &Dataset) -> CountOutcome {
    for comparison in COMPARISONS {
        let counted = match comparison {
            Comparison::Exact => duplicates_by(dataset, CellValue::hash_key),
            Comparison::Text => duplicates_by(dataset, |v| v.canonical_text().ok()),
        };
        if let Some(value) = counted {
            let outcome = CountOutcome {
                value: Some(value),
                mode: comparison.mode(),
            };
            if outcome.is_degraded() {
                tracing::warn!(
                    duplicates = value,
                    "Duplicate rows compared by text representation"
                );
            }
            return outcome;
        }
    }
    tracing::warn!("Duplicate row detection unavailable");
    CountOutcome::unavailable()
}

fn duplicates_by<K, F>(dataset: &Dataset, key: F) -> Option<usize>
where
    K: Eq + Hash,
    F: Fn(&CellValue) -> Option<K>,
{
    let mut seen: HashSet<Vec<K>> = HashSet::with_capacity(dataset.row_count());
    let mut duplicates = 0;
    for row in dataset.rows() {
        let keys = row.into_iter().map(&key).collect::<Option<Vec<K>>>()?;
        if !seen.insert(keys) {
            duplicates += 1;
        }
    }
    Some(duplicates)
}
