//! Column-level profiling.
//!
//! Distinct counts walk an ordered list of comparison strategies (exact
//! keys, then canonical text) and keep the first that applies to every
//! value. Nothing here fails on data shape; the fallbacks are recorded in
//! the returned [`CountMode`].

use super::types::{ColumnDescriptor, ColumnKind, CountMode, CountOutcome, NumericSummary, ValueType};
use crate::dataset::{CellValue, Column};
use std::collections::HashSet;
use std::hash::Hash;

/// Ways of deciding whether two values are the same.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Exact,
    Text,
}

/// Comparison strategies, in trial order.
pub const COMPARISONS: [Comparison; 2] = [Comparison::Exact, Comparison::Text];

impl Comparison {
    pub fn mode(self) -> CountMode {
        match self {
            Self::Exact => CountMode::Exact,
            Self::Text => CountMode::Approximate,
        }
    }
}

/// Number of distinct keys, or `None` if any item has no key.
pub fn distinct_by<'a, K, I, F>(items: I, key: F) -> Option<usize>
where
    K: Eq + Hash,
    I: IntoIterator<Item = &'a CellValue>,
    F: Fn(&CellValue) -> Option<K>,
{
    let mut seen = HashSet::new();
    for item in items {
        seen.insert(key(item)?);
    }
    Some(seen.len())
}

/// Distinct non-null values in `column`.
pub fn unique_count(column: &Column) -> CountOutcome {
    for comparison in COMPARISONS {
        let counted = match comparison {
            Comparison::Exact => distinct_by(column.non_null(), CellValue::hash_key),
            Comparison::Text => distinct_by(column.non_null(), |v| v.canonical_text().ok()),
        };
        if let Some(value) = counted {
            return CountOutcome {
                value: Some(value),
                mode: comparison.mode(),
            };
        }
    }
    CountOutcome::unavailable()
}

/// Numeric when at least one cell is present and every present cell is an
/// integer or float. Boolean columns are always categorical.
pub fn classify(column: &Column) -> ColumnKind {
    let mut present = column.non_null().peekable();
    if present.peek().is_none() {
        return ColumnKind::Categorical;
    }
    if present.all(CellValue::is_numeric) {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}

pub fn value_type(column: &Column) -> ValueType {
    column
        .non_null()
        .map(ValueType::of)
        .fold(ValueType::Empty, ValueType::merge)
}

pub fn missing_pct(missing: usize, rows: usize) -> f64 {
    if rows == 0 {
        return 0.0;
    }
    let pct = (missing as f64 / rows as f64) * 100.0;
    (pct * 10.0).round() / 10.0
}

pub fn describe(column: &Column, rows: usize) -> ColumnDescriptor {
    let missing = column.null_count();
    ColumnDescriptor {
        name: column.name.clone(),
        value_type: value_type(column),
        kind: classify(column),
        unique: unique_count(column),
        missing,
        missing_pct: missing_pct(missing, rows),
    }
}

/// Min, max, mean and distinct count over the present cells of a numeric
/// column. `None` if the column is not numeric.
pub fn numeric_summary(column: &Column) -> Option<NumericSummary> {
    if classify(column) != ColumnKind::Numeric {
        return None;
    }

    let mut min: Option<(&CellValue, f64)> = None;
    let mut max: Option<(&CellValue, f64)> = None;
    let mut sum = 0.0;
    let mut n = 0_usize;

    for cell in column.non_null() {
        let x = cell.as_f64()?;
        if min.is_none_or(|(_, m)| x.total_cmp(&m).is_lt()) {
            min = Some((cell, x));
        }
        if max.is_none_or(|(_, m)| x.total_cmp(&m).is_gt()) {
            max = Some((cell, x));
        }
        sum += x;
        n += 1;
    }

    let (min, _) = min?;
    let (max, _) = max?;
    Some(NumericSummary {
        min: min.clone(),
        max: max.clone(),
        mean: sum / n as f64,
        unique: distinct_by(column.non_null(), CellValue::hash_key)?,
    })
}
