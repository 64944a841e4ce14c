//! Filter cascade over canonical fields.
//!
//! Predicates are configuration data, not branches. A predicate whose field
//! is absent from the table passes every row and leaves a diagnostic note;
//! the cascade always produces a best-effort result.

use crate::domain::table::Table;

#[derive(Debug, Clone, Copy)]
pub struct Bound {
    pub value: f64,
    pub inclusive: bool,
}

impl Bound {
    pub fn open(value: f64) -> Self {
        Self {
            value,
            inclusive: false,
        }
    }

    pub fn closed(value: f64) -> Self {
        Self {
            value,
            inclusive: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterPredicate {
    pub name: String,
    pub field: String,
    pub min: Option<Bound>,
    pub max: Option<Bound>,
}

impl FilterPredicate {
    pub fn new(name: &str, field: &str, min: Option<Bound>, max: Option<Bound>) -> Self {
        Self {
            name: name.to_string(),
            field: field.to_string(),
            min,
            max,
        }
    }

    fn eval(&self, value: f64) -> bool {
        let above = match self.min {
            Some(b) if b.inclusive => value >= b.value,
            Some(b) => value > b.value,
            None => true,
        };
        let below = match self.max {
            Some(b) if b.inclusive => value <= b.value,
            Some(b) => value < b.value,
            None => true,
        };
        above && below
    }
}

/// The standard value screen: low valuation, moderate leverage, growing
/// profits, enough liquidity, optionally a dividend requirement.
pub fn standard_predicates(market_cap_floor: f64, require_dividend: bool) -> Vec<FilterPredicate> {
    let mut predicates = vec![
        FilterPredicate::new(
            "valuation_pe",
            "pe_ratio",
            Some(Bound::open(0.0)),
            Some(Bound::open(20.0)),
        ),
        FilterPredicate::new(
            "valuation_pb",
            "pb_ratio",
            Some(Bound::open(0.0)),
            Some(Bound::open(1.5)),
        ),
        FilterPredicate::new("leverage", "debt_ratio", None, Some(Bound::open(0.5))),
        FilterPredicate::new("growth", "profit_growth", Some(Bound::open(0.0)), None),
        FilterPredicate::new(
            "liquidity",
            "market_cap",
            Some(Bound::closed(market_cap_floor)),
            None,
        ),
    ];
    if require_dividend {
        predicates.push(FilterPredicate::new(
            "yield",
            "dividend_yield",
            Some(Bound::open(0.02)),
            None,
        ));
    }
    predicates
}

#[derive(Debug, Clone)]
pub struct CascadeOutcome {
    pub survivors: Table,
    /// One note per predicate that could not be applied.
    pub notes: Vec<String>,
}

/// Evaluate every predicate and keep rows passing all of them. A present
/// column with a missing value fails that row; the bound cannot be
/// verified.
pub fn apply_cascade(table: &Table, predicates: &[FilterPredicate]) -> CascadeOutcome {
    let mut mask = vec![true; table.len()];
    let mut notes = Vec::new();

    for predicate in predicates {
        if !table.has_column(&predicate.field) {
            notes.push(format!(
                "{}: field {} unavailable, predicate skipped",
                predicate.name, predicate.field
            ));
            continue;
        }
        for (row, keep) in mask.iter_mut().enumerate() {
            if !*keep {
                continue;
            }
            *keep = match table.number(row, &predicate.field) {
                Some(value) => predicate.eval(value),
                None => false,
            };
        }
    }

    for note in &notes {
        eprintln!("note: {note}");
    }

    CascadeOutcome {
        survivors: table.filter_rows(&mask),
        notes,
    }
}
