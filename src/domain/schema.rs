//! Canonical field registry and schema reconciliation.
//!
//! Provider variants label the same attribute differently (and some report
//! percentages as `"40.5%"` strings, others as bare numbers in percent
//! units). Each canonical field declares an ordered candidate-label list and
//! a normalization rule; reconciliation resolves labels once, first match
//! wins, and downstream stages address canonical names only.

use crate::domain::table::{Table, Value};

/// Value normalization, declared per field and never inferred globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalize {
    None,
    /// Strip a trailing `%` if present, parse, divide by 100.
    PercentToRatio,
}

#[derive(Debug, Clone, Copy)]
pub struct CanonicalField {
    pub name: &'static str,
    /// Candidate raw labels in priority order. When several match at once
    /// the first wins and the rest are discarded.
    pub labels: &'static [&'static str],
    pub normalize: Normalize,
}

/// Identifier labels eligible as merge key, in priority order.
pub const MERGE_KEY_CANDIDATES: &[&str] = &["symbol", "code", "代码", "股票代码", "stock"];

/// Candidate labels cover the eastmoney spot snapshot, the financial
/// indicator report variants, and English aliases for reconciled data
/// re-read from cache.
pub const REGISTRY: &[CanonicalField] = &[
    CanonicalField {
        name: "symbol",
        labels: &["symbol", "代码", "股票代码", "code", "stock"],
        normalize: Normalize::None,
    },
    CanonicalField {
        name: "name",
        labels: &["name", "名称", "股票简称"],
        normalize: Normalize::None,
    },
    CanonicalField {
        name: "price",
        labels: &["price", "最新价"],
        normalize: Normalize::None,
    },
    CanonicalField {
        name: "change_pct",
        labels: &["change_pct", "涨跌幅"],
        normalize: Normalize::None,
    },
    CanonicalField {
        name: "market_cap",
        labels: &["market_cap", "总市值"],
        normalize: Normalize::None,
    },
    CanonicalField {
        name: "float_market_cap",
        labels: &["float_market_cap", "流通市值"],
        normalize: Normalize::None,
    },
    CanonicalField {
        name: "pe_ratio",
        labels: &["pe_ratio", "市盈率-动态", "市盈率"],
        normalize: Normalize::None,
    },
    CanonicalField {
        name: "pb_ratio",
        labels: &["pb_ratio", "市净率"],
        normalize: Normalize::None,
    },
    CanonicalField {
        name: "report_period",
        labels: &["report_period", "报告期", "日期"],
        normalize: Normalize::None,
    },
    CanonicalField {
        name: "debt_ratio",
        labels: &["debt_ratio", "资产负债率(%)", "资产负债率"],
        normalize: Normalize::PercentToRatio,
    },
    CanonicalField {
        name: "profit_growth",
        labels: &[
            "profit_growth",
            "净利润增长率(%)",
            "净利润同比增长率",
            "净利润增长率",
        ],
        normalize: Normalize::PercentToRatio,
    },
    CanonicalField {
        name: "roe",
        labels: &["roe", "净资产收益率(%)", "加权净资产收益率(%)", "净资产收益率"],
        normalize: Normalize::PercentToRatio,
    },
    CanonicalField {
        name: "dividend_yield",
        labels: &["dividend_yield", "股息率(%)", "股息率"],
        normalize: Normalize::PercentToRatio,
    },
];

fn normalize_value(value: &Value, rule: Normalize) -> Value {
    match rule {
        Normalize::None => value.clone(),
        Normalize::PercentToRatio => {
            let parsed = match value {
                Value::Number(n) => Some(*n),
                Value::Text(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
                Value::Missing => None,
            };
            match parsed {
                Some(n) => Value::Number(n / 100.0),
                None => Value::Missing,
            }
        }
    }
}

/// Rename matched columns onto canonical names and apply declared
/// normalization. Canonical fields with no matching label are absent from
/// the output — never defaulted. Raw columns outside the registry are
/// dropped; downstream stages only address canonical names.
pub fn reconcile(raw: &Table) -> Table {
    let mut resolved: Vec<(&'static str, usize, Normalize)> = Vec::new();
    for field in REGISTRY {
        if let Some(idx) = field
            .labels
            .iter()
            .find_map(|label| raw.column_index(label))
        {
            resolved.push((field.name, idx, field.normalize));
        }
    }

    let mut out = Table::new(resolved.iter().map(|(name, _, _)| *name).collect::<Vec<_>>());
    for row in raw.rows() {
        let values = resolved
            .iter()
            .map(|(_, idx, rule)| normalize_value(&row[*idx], *rule))
            .collect();
        // arity is ours by construction
        out.push_row(values).expect("reconciled row arity");
    }
    out
}
