//! Remote market data port trait.

use crate::domain::error::ScreenError;
use crate::domain::table::Table;

/// Abstract remote provider. Implementations return raw tables with whatever
/// labels the provider uses; schema reconciliation happens in the domain.
pub trait MarketDataPort {
    /// Full snapshot of tradable instruments with basic market fields.
    fn fetch_universe(&self) -> Result<Table, ScreenError>;

    /// Financial indicators for many instruments in one call.
    fn fetch_indicators_bulk(
        &self,
        symbols: &[String],
        start_year: i32,
    ) -> Result<Table, ScreenError>;

    /// Financial indicators for a single instrument, possibly several
    /// reporting periods.
    fn fetch_indicators(&self, symbol: &str, start_year: i32) -> Result<Table, ScreenError>;
}
