//! Financial indicator acquisition with a prioritized fallback chain.
//!
//! Bulk call first; on failure, per-symbol batched calls with a mandatory
//! inter-call delay and per-symbol fault isolation; if nothing usable comes
//! back, a degraded outcome that leaves the universe unenriched. Absence of
//! enrichment is an expected result, not an error — nothing here propagates
//! past the fetch boundary.

use crate::domain::schema::MERGE_KEY_CANDIDATES;
use crate::domain::table::{Table, Value};
use crate::ports::market_port::MarketDataPort;
use std::collections::HashMap;
use std::time::Duration;

/// Raw labels that mark the reporting-period column before reconciliation.
const PERIOD_LABELS: &[&str] = &["report_period", "报告期", "日期"];

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub batch_size: usize,
    /// Mandatory pause between per-symbol calls; the provider rate-limits.
    pub delay: Duration,
    /// Earliest reporting year requested from the provider.
    pub start_year: i32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            delay: Duration::from_millis(300),
            start_year: 2025,
        }
    }
}

/// Outcome of indicator acquisition.
#[derive(Debug, Clone)]
pub enum IndicatorFetch {
    Enriched(Table),
    /// No usable records from any source; the pipeline proceeds on the
    /// universe's own basic fields.
    Degraded,
}

fn period_column(table: &Table) -> Option<usize> {
    PERIOD_LABELS
        .iter()
        .find_map(|label| table.column_index(label))
}

fn identifier_column(table: &Table) -> Option<usize> {
    MERGE_KEY_CANDIDATES
        .iter()
        .find_map(|label| table.column_index(label))
}

/// Row index of the most recent reporting period; falls back to the last
/// row when no period column exists (providers return periods in
/// chronological order).
fn latest_row(table: &Table) -> Option<usize> {
    if table.is_empty() {
        return None;
    }
    let last = table.len() - 1;
    let Some(period_idx) = period_column(table) else {
        return Some(last);
    };
    let mut best = 0usize;
    let mut best_key: Option<String> = None;
    for (i, row) in table.rows().iter().enumerate() {
        let key = match &row[period_idx] {
            Value::Text(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Missing => None,
        };
        if key > best_key || best_key.is_none() {
            best_key = key;
            best = i;
        }
    }
    Some(best)
}

/// Reduce a bulk table to one row per identifier, keeping the most recent
/// reporting period. Returns `None` when no identifier column can be found
/// (the table is unusable for a later join).
fn dedup_latest(table: &Table) -> Option<Table> {
    let id_idx = identifier_column(table)?;
    let period_idx = period_column(table);

    // best row per identifier, last occurrence winning ties
    let mut best: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for (i, row) in table.rows().iter().enumerate() {
        let Some(id) = row[id_idx].as_text().map(str::to_string) else {
            continue;
        };
        let newer = match (best.get(&id), period_idx) {
            (None, _) => true,
            (Some(_), None) => true,
            (Some(&prev), Some(p)) => {
                row[p].as_text().unwrap_or("") >= table.rows()[prev][p].as_text().unwrap_or("")
            }
        };
        if !best.contains_key(&id) {
            order.push(id.clone());
        }
        if newer {
            best.insert(id, i);
        }
    }

    let mut out = Table::new(table.columns().to_vec());
    for id in &order {
        out.push_row(table.rows()[best[id]].clone())
            .expect("dedup row arity");
    }
    Some(out)
}

/// Acquire indicators for the given symbols. Never fails; every error path
/// degrades to the next fallback.
pub fn fetch_indicators(
    market: &dyn MarketDataPort,
    symbols: &[String],
    config: &FetchConfig,
) -> IndicatorFetch {
    if symbols.is_empty() {
        return IndicatorFetch::Degraded;
    }

    match market.fetch_indicators_bulk(symbols, config.start_year) {
        Ok(table) if !table.is_empty() => {
            if let Some(deduped) = dedup_latest(&table) {
                eprintln!("Bulk indicator fetch: {} records", deduped.len());
                return IndicatorFetch::Enriched(deduped);
            }
            eprintln!("warning: bulk indicator table has no identifier column, falling back");
        }
        Ok(_) => eprintln!("warning: bulk indicator fetch returned nothing, falling back"),
        Err(e) => eprintln!("warning: bulk indicator fetch failed ({e}), falling back"),
    }

    batched_fetch(market, symbols, config)
}

fn batched_fetch(
    market: &dyn MarketDataPort,
    symbols: &[String],
    config: &FetchConfig,
) -> IndicatorFetch {
    let batch_size = config.batch_size.max(1);
    let mut accumulated: Option<Table> = None;
    let mut fetched = 0usize;

    for (batch_no, batch) in symbols.chunks(batch_size).enumerate() {
        for symbol in batch {
            match market.fetch_indicators(symbol, config.start_year) {
                Ok(table) => {
                    if let Some(row_idx) = latest_row(&table) {
                        append_latest(&mut accumulated, &table, row_idx, symbol);
                        fetched += 1;
                    }
                }
                Err(e) => {
                    // one bad symbol must not abort the batch
                    eprintln!("warning: indicators for {symbol} failed: {e}");
                }
            }
            if !config.delay.is_zero() {
                std::thread::sleep(config.delay);
            }
        }
        eprintln!(
            "Indicators: {}/{} symbols after batch {}",
            (batch_no * batch_size + batch.len()).min(symbols.len()),
            symbols.len(),
            batch_no + 1
        );
    }

    match accumulated {
        Some(table) if !table.is_empty() => {
            eprintln!("Batched indicator fetch: {fetched} records");
            IndicatorFetch::Enriched(table)
        }
        _ => {
            eprintln!("warning: no indicator data from any source, proceeding unenriched");
            IndicatorFetch::Degraded
        }
    }
}

/// Append one symbol's latest-period row to the accumulator, tagging it with
/// the symbol. The first success fixes the column set; later rows align by
/// label and pad gaps with `Missing`.
fn append_latest(accumulated: &mut Option<Table>, source: &Table, row_idx: usize, symbol: &str) {
    let mut labels: Vec<String> = source.columns().to_vec();
    let mut values: Vec<Value> = source.rows()[row_idx].clone();
    if !labels.iter().any(|l| l == "symbol") {
        labels.push("symbol".to_string());
        values.push(Value::text(symbol));
    }

    let table = accumulated.get_or_insert_with(|| Table::new(labels.clone()));
    table.push_row_aligned(&labels, &values);
}
