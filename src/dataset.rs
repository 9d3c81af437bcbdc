//! In-memory tabular datasets.
//!
//! A [`Dataset`] is an ordered list of named [`Column`]s. Construction checks
//! the two shape invariants: every column has the same length and column
//! names are unique.

mod value;

pub use value::{CellKey, CellValue};

use crate::error::{PlatformError, Result};
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    pub fn non_null(&self) -> impl Iterator<Item = &CellValue> {
        self.values.iter().filter(|v| !v.is_null())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// # Errors
    ///
    /// Returns [`PlatformError::InvalidDataset`] on ragged columns or
    /// duplicate column names.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map_or(0, |c| c.values.len());
        let mut seen = HashSet::new();
        for col in &columns {
            if col.values.len() != row_count {
                return Err(PlatformError::InvalidDataset(format!(
                    "column '{}' has {} values, expected {row_count}",
                    col.name,
                    col.values.len()
                )));
            }
            if !seen.insert(col.name.as_str()) {
                return Err(PlatformError::InvalidDataset(format!(
                    "duplicate column name '{}'",
                    col.name
                )));
            }
        }
        Ok(Self { columns, row_count })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Iterates rows as vectors of cell references, in column order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&CellValue>> + '_ {
        (0..self.row_count).map(move |i| {
            self.columns
                .iter()
                .filter_map(|c| c.values.get(i))
                .collect()
        })
    }

    /// Sets `name` to `value` on every row, replacing an existing column of
    /// the same name in place.
    pub fn with_constant_column(mut self, name: &str, value: &CellValue) -> Self {
        let values = vec![value.clone(); self.row_count];
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => {
                tracing::warn!(column = name, "Overwriting existing column with tag values");
                existing.values = values;
            }
            None => self.columns.push(Column::new(name, values)),
        }
        self
    }

    /// Stacks datasets vertically with an outer union of their columns.
    ///
    /// Columns keep first-appearance order across the inputs; rows from a
    /// dataset lacking a column are null in that column.
    pub fn concat(datasets: Vec<Self>) -> Self {
        let total_rows: usize = datasets.iter().map(Self::row_count).sum();
        let mut order: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for ds in &datasets {
            for col in &ds.columns {
                if !index.contains_key(&col.name) {
                    index.insert(col.name.clone(), order.len());
                    order.push(col.name.clone());
                }
            }
        }

        let mut merged: Vec<Vec<CellValue>> = order
            .iter()
            .map(|_| Vec::with_capacity(total_rows))
            .collect();

        for ds in datasets {
            let rows = ds.row_count;
            let mut filled = vec![false; merged.len()];
            for col in ds.columns {
                if let Some(&pos) = index.get(&col.name)
                    && let Some(target) = merged.get_mut(pos)
                {
                    target.extend(col.values);
                    if let Some(flag) = filled.get_mut(pos) {
                        *flag = true;
                    }
                }
            }
            for (target, was_filled) in merged.iter_mut().zip(filled) {
                if !was_filled {
                    target.extend(std::iter::repeat_n(CellValue::Null, rows));
                }
            }
        }

        let columns = order
            .into_iter()
            .zip(merged)
            .map(|(name, values)| Column::new(name, values))
            .collect();
        Self {
            columns,
            row_count: total_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<CellValue> {
        values.iter().copied().map(CellValue::Integer).collect()
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let result = Dataset::new(vec![
            Column::new("a", ints(&[1, 2])),
            Column::new("b", ints(&[1])),
        ]);
        assert!(matches!(result, Err(PlatformError::InvalidDataset(_))));
    }

    #[test]
    fn test_new_rejects_duplicate_names() {
        let result = Dataset::new(vec![
            Column::new("a", ints(&[1])),
            Column::new("a", ints(&[2])),
        ]);
        assert!(matches!(result, Err(PlatformError::InvalidDataset(_))));
    }

    #[test]
    fn test_concat_outer_union_fills_nulls() -> anyhow::Result<()> {
        let left = Dataset::new(vec![
            Column::new("id", ints(&[1, 2])),
            Column::new("val", ints(&[10, 20])),
        ])?;
        let right = Dataset::new(vec![
            Column::new("id", ints(&[3])),
            Column::new("extra", vec![CellValue::Text("x".to_owned())]),
        ])?;

        let merged = Dataset::concat(vec![left, right]);
        assert_eq!(merged.row_count(), 3);
        assert_eq!(merged.column_names(), vec!["id", "val", "extra"]);

        let val = merged.column("val").expect("val column");
        assert_eq!(val.values, vec![
            CellValue::Integer(10),
            CellValue::Integer(20),
            CellValue::Null
        ]);
        let extra = merged.column("extra").expect("extra column");
        assert_eq!(extra.null_count(), 2);
        Ok(())
    }

    #[test]
    fn test_with_constant_column_replaces_existing() -> anyhow::Result<()> {
        let ds = Dataset::new(vec![Column::new("source_file", ints(&[7, 8]))])?;
        let tagged = ds.with_constant_column("source_file", &CellValue::Text("a.csv".to_owned()));
        assert_eq!(tagged.column_count(), 1);
        assert!(
            tagged
                .column("source_file")
                .expect("tag column")
                .values
                .iter()
                .all(|v| v == &CellValue::Text("a.csv".to_owned()))
        );
        Ok(())
    }

    #[test]
    fn test_rows_follow_column_order() -> anyhow::Result<()> {
        let ds = Dataset::new(vec![
            Column::new("a", ints(&[1, 2])),
            Column::new("b", ints(&[3, 4])),
        ])?;
        let rows: Vec<Vec<&CellValue>> = ds.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec![&CellValue::Integer(2), &CellValue::Integer(4)]);
        Ok(())
    }
}
