//! Day-keyed cache store port trait.

use crate::domain::error::ScreenError;
use crate::domain::table::Table;
use chrono::NaiveDate;
use std::path::Path;

/// A cached table along with the calendar date it was stored on. Freshness
/// is decided by the caller against its own notion of "today".
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub table: Table,
    pub stored_on: NaiveDate,
}

pub trait CachePort {
    /// `Ok(None)` when no entry exists at the path.
    fn read(&self, path: &Path) -> Result<Option<CacheEntry>, ScreenError>;

    /// Replace the entry atomically (write-temp-then-rename); a failed run
    /// must not leave a partial file behind.
    fn write(&self, path: &Path, table: &Table) -> Result<(), ScreenError>;
}
