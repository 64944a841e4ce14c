#![allow(dead_code)]

use chrono::NaiveDate;
use fundscreen::domain::error::ScreenError;
use fundscreen::domain::table::{Table, Value};
use fundscreen::ports::cache_port::{CacheEntry, CachePort};
use fundscreen::ports::market_port::MarketDataPort;
use fundscreen::ports::result_port::ResultPort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Raw universe snapshot in provider (English-alias) labels covering the
/// three scenario instruments: A passes everything, B fails valuation,
/// leverage, growth and liquidity, C dominates A on every axis.
pub fn scenario_universe() -> Table {
    let mut t = Table::new(vec![
        "code",
        "name",
        "price",
        "market_cap",
        "pe_ratio",
        "pb_ratio",
    ]);
    for (code, name, price, mcap, pe, pb) in [
        ("A", "Alpha", 10.0, 2e9, 15.0, 1.2),
        ("B", "Beta", 20.0, 5e8, 25.0, 2.0),
        ("C", "Gamma", 30.0, 3e10, 10.0, 0.8),
    ] {
        t.push_row(vec![
            Value::text(code),
            Value::text(name),
            Value::Number(price),
            Value::Number(mcap),
            Value::Number(pe),
            Value::Number(pb),
        ])
        .unwrap();
    }
    t
}

/// Matching financial indicators, percent units as the provider reports
/// them (reconciliation divides by 100).
pub fn scenario_indicators() -> Table {
    let mut t = Table::new(vec!["code", "report_period", "debt_ratio", "profit_growth"]);
    for (code, period, debt, growth) in [
        ("A", "2025-03-31", "40", "10"),
        ("B", "2025-03-31", "60", "-5"),
        ("C", "2025-03-31", "30", "20"),
    ] {
        t.push_row(vec![
            Value::text(code),
            Value::text(period),
            Value::text(debt),
            Value::text(growth),
        ])
        .unwrap();
    }
    t
}

#[derive(Default)]
pub struct MockMarket {
    pub universe: Option<Table>,
    pub bulk: Option<Result<Table, String>>,
    pub per_symbol: HashMap<String, Table>,
    pub universe_calls: RefCell<usize>,
    pub bulk_calls: RefCell<usize>,
    pub single_calls: RefCell<Vec<String>>,
}

impl MockMarket {
    pub fn with_universe(mut self, table: Table) -> Self {
        self.universe = Some(table);
        self
    }

    pub fn with_bulk(mut self, table: Table) -> Self {
        self.bulk = Some(Ok(table));
        self
    }

    pub fn with_bulk_error(mut self, reason: &str) -> Self {
        self.bulk = Some(Err(reason.to_string()));
        self
    }

    pub fn with_single(mut self, symbol: &str, table: Table) -> Self {
        self.per_symbol.insert(symbol.to_string(), table);
        self
    }
}

impl MarketDataPort for MockMarket {
    fn fetch_universe(&self) -> Result<Table, ScreenError> {
        *self.universe_calls.borrow_mut() += 1;
        self.universe
            .clone()
            .ok_or_else(|| ScreenError::Transport {
                reason: "universe unavailable".into(),
            })
    }

    fn fetch_indicators_bulk(
        &self,
        _symbols: &[String],
        _start_year: i32,
    ) -> Result<Table, ScreenError> {
        *self.bulk_calls.borrow_mut() += 1;
        match &self.bulk {
            Some(Ok(t)) => Ok(t.clone()),
            Some(Err(reason)) => Err(ScreenError::Transport {
                reason: reason.clone(),
            }),
            None => Err(ScreenError::Transport {
                reason: "bulk unavailable".into(),
            }),
        }
    }

    fn fetch_indicators(&self, symbol: &str, _start_year: i32) -> Result<Table, ScreenError> {
        self.single_calls.borrow_mut().push(symbol.to_string());
        self.per_symbol
            .get(symbol)
            .cloned()
            .ok_or_else(|| ScreenError::Transport {
                reason: format!("no indicators for {symbol}"),
            })
    }
}

/// In-memory cache keyed like the CSV adapter but with an injectable clock.
pub struct MockCache {
    pub entries: RefCell<HashMap<PathBuf, CacheEntry>>,
    pub now: NaiveDate,
}

impl MockCache {
    pub fn new(now: NaiveDate) -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            now,
        }
    }

    pub fn seed(&self, path: &Path, table: Table, stored_on: NaiveDate) {
        self.entries
            .borrow_mut()
            .insert(path.to_path_buf(), CacheEntry { table, stored_on });
    }

    pub fn entry(&self, path: &Path) -> Option<CacheEntry> {
        self.entries.borrow().get(path).cloned()
    }
}

impl CachePort for MockCache {
    fn read(&self, path: &Path) -> Result<Option<CacheEntry>, ScreenError> {
        Ok(self.entries.borrow().get(path).cloned())
    }

    fn write(&self, path: &Path, table: &Table) -> Result<(), ScreenError> {
        self.entries.borrow_mut().insert(
            path.to_path_buf(),
            CacheEntry {
                table: table.clone(),
                stored_on: self.now,
            },
        );
        Ok(())
    }
}

#[derive(Default)]
pub struct MockSink {
    pub written: RefCell<Option<(PathBuf, Table)>>,
    pub fail: bool,
}

impl MockSink {
    pub fn failing() -> Self {
        Self {
            written: RefCell::new(None),
            fail: true,
        }
    }
}

impl ResultPort for MockSink {
    fn write(&self, path: &Path, table: &Table) -> Result<(), ScreenError> {
        if self.fail {
            return Err(ScreenError::Persistence {
                path: path.display().to_string(),
                reason: "disk full".into(),
            });
        }
        *self.written.borrow_mut() = Some((path.to_path_buf(), table.clone()));
        Ok(())
    }
}

pub fn column_texts(table: &Table, column: &str) -> Vec<String> {
    (0..table.len())
        .map(|i| {
            table
                .get(i, column)
                .and_then(|v| v.as_text())
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}
