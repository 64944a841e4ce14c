//! Label-addressed table of values.
//!
//! Provider responses carry inconsistent column labels that are only resolved
//! at runtime (schema reconciliation, merge-key discovery), so the pipeline
//! moves label-addressed rows rather than fixed structs. Every stage takes a
//! table and returns a new one; nothing mutates a table in flight.

use crate::domain::error::ScreenError;

/// A single cell. Numeric text (including a trailing `%`) stays `Text` until
/// a stage explicitly asks for a number.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Missing,
}

impl Value {
    pub fn text(s: &str) -> Self {
        Value::Text(s.to_string())
    }

    /// Numeric view of the cell. Text is parsed; empty text and
    /// unparseable text are `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            Value::Missing => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: Vec<S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), ScreenError> {
        if row.len() != self.columns.len() {
            return Err(ScreenError::Table {
                reason: format!(
                    "row has {} values, table has {} columns",
                    row.len(),
                    self.columns.len()
                ),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append a row given as (label, value) pairs from another table's
    /// column order. Labels absent from this table are dropped; columns
    /// the source does not supply become `Missing`.
    pub fn push_row_aligned(&mut self, labels: &[String], values: &[Value]) {
        let row = self
            .columns
            .iter()
            .map(|col| {
                labels
                    .iter()
                    .position(|l| l == col)
                    .and_then(|i| values.get(i).cloned())
                    .unwrap_or(Value::Missing)
            })
            .collect();
        self.rows.push(row);
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    pub fn number(&self, row: usize, column: &str) -> Option<f64> {
        self.get(row, column).and_then(Value::as_number)
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            Some(idx) => {
                self.columns[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// New table containing the listed columns, in list order, skipping
    /// names this table does not have.
    pub fn select(&self, keep: &[&str]) -> Table {
        let indices: Vec<usize> = keep
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect();
        let columns = indices
            .iter()
            .map(|&i| self.columns[i].clone())
            .collect::<Vec<_>>();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Table { columns, rows }
    }

    /// New table keeping rows where the mask is true. The mask must cover
    /// every row.
    pub fn filter_rows(&self, mask: &[bool]) -> Table {
        debug_assert_eq!(mask.len(), self.rows.len());
        let rows = self
            .rows
            .iter()
            .zip(mask)
            .filter(|&(_, &keep)| keep)
            .map(|(row, _)| row.clone())
            .collect();
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Append a column; `values` must cover every row.
    pub fn push_column(&mut self, name: &str, values: Vec<Value>) -> Result<(), ScreenError> {
        if values.len() != self.rows.len() {
            return Err(ScreenError::Table {
                reason: format!(
                    "column {} has {} values, table has {} rows",
                    name,
                    values.len(),
                    self.rows.len()
                ),
            });
        }
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Reorder rows by the given permutation of row indices.
    pub fn reorder_rows(&mut self, order: &[usize]) {
        debug_assert_eq!(order.len(), self.rows.len());
        self.rows = order.iter().map(|&i| self.rows[i].clone()).collect();
    }

    pub fn truncate(&mut self, len: usize) {
        self.rows.truncate(len);
    }
}
