//! End-to-end screening run.
//!
//! Universe (cache-checked) → indicator fetch → schema reconciliation →
//! merge → filter cascade → scoring → persistence. Each stage consumes the
//! previous stage's output; policies for degraded enrichment, empty results
//! and persistence failure live here.

use crate::domain::error::ScreenError;
use crate::domain::fetcher::{self, FetchConfig, IndicatorFetch};
use crate::domain::filter::{self, FilterPredicate};
use crate::domain::merge;
use crate::domain::schema;
use crate::domain::score;
use crate::domain::table::Table;
use crate::domain::universe::{self, UniverseConfig};
use crate::ports::cache_port::CachePort;
use crate::ports::market_port::MarketDataPort;
use crate::ports::result_port::ResultPort;
use chrono::NaiveDate;
use std::path::PathBuf;

/// Result columns, identifier and name first, then whatever enrichment the
/// run actually produced.
const RESULT_COLUMNS: &[&str] = &[
    "symbol",
    "name",
    "price",
    "change_pct",
    "market_cap",
    "pe_ratio",
    "pb_ratio",
    "debt_ratio",
    "profit_growth",
    "roe",
    "dividend_yield",
    "score",
];

#[derive(Debug, Clone)]
pub struct ScreenConfig {
    pub universe: UniverseConfig,
    pub fetch: FetchConfig,
    pub predicates: Vec<FilterPredicate>,
    pub top_k: Option<usize>,
    pub result_path: PathBuf,
    pub refresh: bool,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            universe: UniverseConfig::default(),
            fetch: FetchConfig::default(),
            predicates: filter::standard_predicates(1e9, false),
            top_k: None,
            result_path: PathBuf::from("screen_results.csv"),
            refresh: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScreenSummary {
    pub universe_count: usize,
    pub enriched: bool,
    pub merge_key: Option<String>,
    pub survivor_count: usize,
    pub notes: Vec<String>,
    pub persisted: bool,
    pub result: Table,
}

fn universe_symbols(universe: &Table) -> Vec<String> {
    (0..universe.len())
        .filter_map(|row| {
            universe
                .get(row, "symbol")
                .and_then(|v| v.as_text())
                .map(str::to_string)
        })
        .collect()
}

pub fn run_screen(
    market: &dyn MarketDataPort,
    cache: &dyn CachePort,
    sink: &dyn ResultPort,
    config: &ScreenConfig,
    today: NaiveDate,
) -> Result<ScreenSummary, ScreenError> {
    let universe = universe::load_universe(
        market,
        cache,
        &config.universe,
        today,
        config.refresh,
    )?;

    let symbols = universe_symbols(&universe);
    let fetch = fetcher::fetch_indicators(market, &symbols, &config.fetch);

    let (merged, merge_key, enriched) = match fetch {
        IndicatorFetch::Enriched(raw) => {
            let financial = schema::reconcile(&raw);
            let key = merge::select_merge_key(&universe, &financial)?;
            let merged = merge::inner_join(&universe, &financial, &key)?;
            eprintln!("Merged {} instruments on key {}", merged.len(), key);
            (merged, Some(key), true)
        }
        IndicatorFetch::Degraded => {
            // no join: the universe's own basic fields carry the run
            (universe.clone(), None, false)
        }
    };

    let outcome = filter::apply_cascade(&merged, &config.predicates);
    eprintln!(
        "Cascade: {} of {} instruments survive",
        outcome.survivors.len(),
        merged.len()
    );

    let scored = score::rank_and_sort(&outcome.survivors, config.top_k);
    let result = scored.select(RESULT_COLUMNS);

    let persisted = if result.is_empty() {
        eprintln!("No instruments passed the screen; nothing persisted");
        false
    } else {
        match sink.write(&config.result_path, &result) {
            Ok(()) => {
                eprintln!(
                    "Wrote {} instruments to {}",
                    result.len(),
                    config.result_path.display()
                );
                true
            }
            Err(e) => {
                // the screening computation itself still succeeded
                eprintln!("warning: {e}");
                false
            }
        }
    };

    Ok(ScreenSummary {
        universe_count: universe.len(),
        enriched,
        merge_key,
        survivor_count: result.len(),
        notes: outcome.notes,
        persisted,
        result,
    })
}
