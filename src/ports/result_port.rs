//! Result persistence port trait.

use crate::domain::error::ScreenError;
use crate::domain::table::Table;
use std::path::Path;

/// Port for writing the final screened table. Full overwrite each run, no
/// append, no versioning.
pub trait ResultPort {
    fn write(&self, path: &Path, table: &Table) -> Result<(), ScreenError>;
}
