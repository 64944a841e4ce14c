//! Composite rank-based scoring.
//!
//! Each present scored field contributes an ordinal rank; lower-is-better
//! fields add their ascending rank, higher-is-better fields subtract it.
//! Only present fields contribute, so absolute score magnitudes are not
//! comparable across runs with different data availability.

use crate::domain::table::{Table, Value};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LowerBetter,
    HigherBetter,
}

pub const SCORE_FIELDS: &[(&str, Direction)] = &[
    ("pe_ratio", Direction::LowerBetter),
    ("pb_ratio", Direction::LowerBetter),
    ("debt_ratio", Direction::LowerBetter),
    ("profit_growth", Direction::HigherBetter),
    ("dividend_yield", Direction::HigherBetter),
    ("roe", Direction::HigherBetter),
];

/// Append a composite `score` column, sort ascending by it (stable — ties
/// keep their prior relative order), and optionally truncate to the top K.
pub fn rank_and_sort(table: &Table, top_k: Option<usize>) -> Table {
    let n = table.len();
    let mut scores = vec![0.0_f64; n];

    for (field, direction) in SCORE_FIELDS {
        if !table.has_column(field) {
            continue;
        }
        let mut present: Vec<(usize, f64)> = (0..n)
            .filter_map(|row| table.number(row, field).map(|v| (row, v)))
            .collect();
        present.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        for (pos, (row, _)) in present.iter().enumerate() {
            let rank = (pos + 1) as f64;
            match direction {
                Direction::LowerBetter => scores[*row] += rank,
                Direction::HigherBetter => scores[*row] -= rank,
            }
        }
    }

    let mut out = table.clone();
    out.push_column("score", scores.iter().map(|&s| Value::Number(s)).collect())
        .expect("score column covers every row");

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[a].partial_cmp(&scores[b]).unwrap_or(Ordering::Equal));
    out.reorder_rows(&order);

    if let Some(k) = top_k {
        out.truncate(k);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored_table() -> Table {
        let mut t = Table::new(vec!["symbol", "pe_ratio", "pb_ratio", "profit_growth"]);
        for (sym, pe, pb, growth) in [
            ("A", 15.0, 1.2, 0.10),
            ("C", 10.0, 0.8, 0.20),
        ] {
            t.push_row(vec![
                Value::text(sym),
                Value::Number(pe),
                Value::Number(pb),
                Value::Number(growth),
            ])
            .unwrap();
        }
        t
    }

    fn symbols(t: &Table) -> Vec<String> {
        (0..t.len())
            .map(|i| t.get(i, "symbol").and_then(|v| v.as_text()).unwrap().into())
            .collect()
    }

    #[test]
    fn dominant_row_ranks_first() {
        let out = rank_and_sort(&scored_table(), None);
        // C beats A on every axis
        assert_eq!(symbols(&out), vec!["C", "A"]);
        assert!(out.number(0, "score").unwrap() < out.number(1, "score").unwrap());
    }

    #[test]
    fn rerunning_on_identical_input_is_idempotent() {
        let first = rank_and_sort(&scored_table(), None);
        let second = rank_and_sort(&scored_table(), None);
        assert_eq!(first, second);
    }

    #[test]
    fn ties_keep_prior_relative_order() {
        let mut t = Table::new(vec!["symbol", "pe_ratio"]);
        for sym in ["X", "Y", "Z"] {
            t.push_row(vec![Value::text(sym), Value::Number(10.0)])
                .unwrap();
        }
        let out = rank_and_sort(&t, None);
        assert_eq!(symbols(&out), vec!["X", "Y", "Z"]);
    }

    #[test]
    fn absent_fields_contribute_nothing() {
        let t = scored_table().select(&["symbol", "pe_ratio"]);
        let out = rank_and_sort(&t, None);
        assert_eq!(symbols(&out), vec!["C", "A"]);
        // only one field contributes, so best score is exactly rank 1
        assert_eq!(out.number(0, "score"), Some(1.0));
    }

    #[test]
    fn missing_values_contribute_nothing_for_that_field() {
        let mut t = Table::new(vec!["symbol", "pe_ratio"]);
        t.push_row(vec![Value::text("A"), Value::Missing]).unwrap();
        t.push_row(vec![Value::text("B"), Value::Number(5.0)])
            .unwrap();
        let out = rank_and_sort(&t, None);
        // A has no rank contribution (score 0), B gets rank 1
        assert_eq!(symbols(&out), vec!["A", "B"]);
        assert_eq!(out.number(0, "score"), Some(0.0));
        assert_eq!(out.number(1, "score"), Some(1.0));
    }

    #[test]
    fn top_k_truncates_after_sorting() {
        let out = rank_and_sort(&scored_table(), Some(1));
        assert_eq!(symbols(&out), vec!["C"]);
    }
}
