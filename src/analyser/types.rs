use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dataset::CellValue;

/// Report classification of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
        }
    }
}

/// Storage type tag of a column, derived from its non-null cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Empty,
    Boolean,
    Integer,
    Float,
    Text,
    Composite,
    Mixed,
}

impl ValueType {
    pub fn of(cell: &CellValue) -> Self {
        match cell {
            CellValue::Null => Self::Empty,
            CellValue::Boolean(_) => Self::Boolean,
            CellValue::Integer(_) => Self::Integer,
            CellValue::Float(_) => Self::Float,
            CellValue::Text(_) => Self::Text,
            CellValue::Composite(_) => Self::Composite,
        }
    }

    /// Folds two observed tags. Integer and float widen to float.
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Empty, t) | (t, Self::Empty) => t,
            (a, b) if a == b => a,
            (Self::Integer, Self::Float) | (Self::Float, Self::Integer) => Self::Float,
            _ => Self::Mixed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
            Self::Composite => "composite",
            Self::Mixed => "mixed",
        }
    }
}

/// How a count was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountMode {
    /// Exact comparison of cell values.
    Exact,
    /// Comparison of canonical text renderings.
    Approximate,
    /// Neither comparison could be applied.
    Unavailable,
}

/// A count that may have been computed in a degraded mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountOutcome {
    pub value: Option<usize>,
    pub mode: CountMode,
}

impl CountOutcome {
    pub fn exact(value: usize) -> Self {
        Self {
            value: Some(value),
            mode: CountMode::Exact,
        }
    }

    pub fn approximate(value: usize) -> Self {
        Self {
            value: Some(value),
            mode: CountMode::Approximate,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            value: None,
            mode: CountMode::Unavailable,
        }
    }

    pub fn is_exact(&self) -> bool {
        self.mode == CountMode::Exact
    }

    pub fn is_degraded(&self) -> bool {
        self.mode != CountMode::Exact
    }
}

impl fmt::Display for CountOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.value, self.mode) {
            (Some(v), CountMode::Approximate) => write!(f, "~{v}"),
            (Some(v), _) => write!(f, "{v}"),
            (None, _) => write!(f, "n/a"),
        }
    }
}

/// Per-column schema and quality summary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub value_type: ValueType,
    pub kind: ColumnKind,
    pub unique: CountOutcome,
    pub missing: usize,
    /// Missing share of all rows, in percent, rounded to one decimal.
    pub missing_pct: f64,
}

/// Min, max, mean and distinct count of a numeric column.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NumericSummary {
    pub min: CellValue,
    pub max: CellValue,
    pub mean: f64,
    pub unique: usize,
}
