//! Property tests for the cascade and the scorer.

use fundscreen::domain::filter::{apply_cascade, standard_predicates};
use fundscreen::domain::score::rank_and_sort;
use fundscreen::domain::table::{Table, Value};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Row {
    pe: f64,
    pb: f64,
    debt: f64,
    mcap: f64,
}

fn row_strategy() -> impl Strategy<Value = Row> {
    (
        -10.0f64..60.0,
        -1.0f64..5.0,
        0.0f64..1.2,
        0.0f64..5e10,
    )
        .prop_map(|(pe, pb, debt, mcap)| Row { pe, pb, debt, mcap })
}

fn full_table(rows: &[Row]) -> Table {
    let mut t = Table::new(vec!["symbol", "pe_ratio", "pb_ratio", "debt_ratio", "market_cap"]);
    for (i, row) in rows.iter().enumerate() {
        t.push_row(vec![
            Value::text(&format!("S{i}")),
            Value::Number(row.pe),
            Value::Number(row.pb),
            Value::Number(row.debt),
            Value::Number(row.mcap),
        ])
        .unwrap();
    }
    t
}

fn survivor_symbols(table: &Table) -> Vec<String> {
    (0..table.len())
        .map(|i| {
            table
                .get(i, "symbol")
                .and_then(|v| v.as_text())
                .unwrap()
                .to_string()
        })
        .collect()
}

proptest! {
    /// Removing a field from the table can only grow the survivor set.
    #[test]
    fn dropping_a_field_relaxes_the_cascade(rows in prop::collection::vec(row_strategy(), 0..30)) {
        let full = full_table(&rows);
        let without_debt = full.select(&["symbol", "pe_ratio", "pb_ratio", "market_cap"]);
        let predicates = standard_predicates(1e9, false);

        let strict = survivor_symbols(&apply_cascade(&full, &predicates).survivors);
        let relaxed = survivor_symbols(&apply_cascade(&without_debt, &predicates).survivors);

        for symbol in &strict {
            prop_assert!(relaxed.contains(symbol));
        }
    }

    /// The scorer is deterministic on identical input.
    #[test]
    fn scorer_is_idempotent(rows in prop::collection::vec(row_strategy(), 0..30)) {
        let table = full_table(&rows);
        let first = rank_and_sort(&table, None);
        let second = rank_and_sort(&table, None);
        prop_assert_eq!(first, second);
    }

    /// Scores ascend down the sorted output.
    #[test]
    fn output_is_sorted_by_score(rows in prop::collection::vec(row_strategy(), 0..30)) {
        let out = rank_and_sort(&full_table(&rows), None);
        let scores: Vec<f64> = (0..out.len())
            .map(|i| out.number(i, "score").unwrap())
            .collect();
        for pair in scores.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
    }
}
