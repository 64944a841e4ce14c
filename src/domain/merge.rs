//! Join of the universe table with the reconciled financial table.

use crate::domain::error::ScreenError;
use crate::domain::schema::MERGE_KEY_CANDIDATES;
use crate::domain::table::{Table, Value};
use std::collections::HashMap;

/// First identifier label present in both tables, in priority order.
pub fn select_merge_key(left: &Table, right: &Table) -> Result<String, ScreenError> {
    MERGE_KEY_CANDIDATES
        .iter()
        .find(|&&key| left.has_column(key) && right.has_column(key))
        .map(|&key| key.to_string())
        .ok_or_else(|| ScreenError::MergeKeyUnresolved {
            candidates: MERGE_KEY_CANDIDATES.join(", "),
        })
}

/// Inner join on `key`: universe rows without a financial match are
/// dropped. Financial columns that duplicate a universe column keep the
/// universe's value. One row per key is the fetcher's latest-period
/// contract; here the first financial row per key wins.
pub fn inner_join(universe: &Table, financial: &Table, key: &str) -> Result<Table, ScreenError> {
    let uni_key = universe.column_index(key).ok_or_else(|| ScreenError::Table {
        reason: format!("universe table has no column {key}"),
    })?;
    let fin_key = financial.column_index(key).ok_or_else(|| ScreenError::Table {
        reason: format!("financial table has no column {key}"),
    })?;

    let mut fin_rows: HashMap<&str, usize> = HashMap::new();
    for (i, row) in financial.rows().iter().enumerate() {
        if let Some(id) = row[fin_key].as_text() {
            fin_rows.entry(id).or_insert(i);
        }
    }

    let extra: Vec<usize> = financial
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, col)| *i != fin_key && !universe.has_column(col))
        .map(|(i, _)| i)
        .collect();

    let mut columns: Vec<String> = universe.columns().to_vec();
    columns.extend(extra.iter().map(|&i| financial.columns()[i].clone()));
    let mut out = Table::new(columns);

    for row in universe.rows() {
        let Some(id) = row[uni_key].as_text() else {
            continue;
        };
        let Some(&fin_idx) = fin_rows.get(id) else {
            continue;
        };
        let mut merged: Vec<Value> = row.clone();
        let fin_row = &financial.rows()[fin_idx];
        merged.extend(extra.iter().map(|&i| fin_row[i].clone()));
        out.push_row(merged)?;
    }

    Ok(out)
}
