//! Universe acquisition with day-granularity caching.
//!
//! Membership exclusions (special-treatment / delisting name markers) happen
//! here because they decide inclusion in the candidate set; the filter
//! cascade only scores financial attributes.

use crate::domain::error::ScreenError;
use crate::domain::schema;
use crate::domain::table::Table;
use crate::ports::cache_port::CachePort;
use crate::ports::market_port::MarketDataPort;
use chrono::NaiveDate;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct UniverseConfig {
    /// Substrings of the display name that exclude an instrument
    /// (e.g. "ST", "退").
    pub exclude_patterns: Vec<String>,
    pub cache_path: PathBuf,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            exclude_patterns: vec!["ST".to_string(), "退".to_string()],
            cache_path: PathBuf::from("universe_cache.csv"),
        }
    }
}

/// Drop rows whose `name` contains any of the patterns. Rows without a
/// usable name are kept; exclusion needs positive evidence.
pub fn apply_exclusions(table: &Table, patterns: &[String]) -> Table {
    if patterns.is_empty() || !table.has_column("name") {
        return table.clone();
    }
    let mask: Vec<bool> = (0..table.len())
        .map(|row| {
            match table.get(row, "name").and_then(|v| v.as_text()) {
                Some(name) => !patterns.iter().any(|p| name.contains(p.as_str())),
                None => true,
            }
        })
        .collect();
    table.filter_rows(&mask)
}

/// Cached universe when the entry is from `today` and `refresh` is not
/// forced; otherwise a fresh fetch, reconciled to canonical labels, with
/// exclusions applied and the cache rewritten. Remote failure aborts the
/// run — retry policy belongs to the caller.
pub fn load_universe(
    market: &dyn MarketDataPort,
    cache: &dyn CachePort,
    config: &UniverseConfig,
    today: NaiveDate,
    refresh: bool,
) -> Result<Table, ScreenError> {
    if !refresh {
        match cache.read(&config.cache_path) {
            Ok(Some(entry)) if entry.stored_on == today => {
                eprintln!(
                    "Using cached universe from {} ({} instruments)",
                    entry.stored_on,
                    entry.table.len()
                );
                return Ok(entry.table);
            }
            Ok(_) => {}
            Err(e) => {
                // an unreadable cache is not worth aborting a fresh fetch
                eprintln!("warning: ignoring unreadable cache: {e}");
            }
        }
    }

    eprintln!("Fetching universe snapshot...");
    let raw = market.fetch_universe()?;
    let reconciled = schema::reconcile(&raw);
    let universe = apply_exclusions(&reconciled, &config.exclude_patterns);
    eprintln!(
        "Universe: {} instruments ({} excluded by name pattern)",
        universe.len(),
        reconciled.len() - universe.len()
    );

    if let Err(e) = cache.write(&config.cache_path, &universe) {
        eprintln!("warning: failed to write universe cache: {e}");
    }
    Ok(universe)
}
