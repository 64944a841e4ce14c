//! CSV-backed cache store and result sink.
//!
//! The cache is keyed by the file's modification date: an entry written
//! earlier today is fresh, anything older is stale. Results are written
//! with a UTF-8 BOM so spreadsheet imports keep non-ASCII display names.

use crate::domain::error::ScreenError;
use crate::domain::table::{Table, Value};
use crate::ports::cache_port::{CacheEntry, CachePort};
use crate::ports::result_port::ResultPort;
use chrono::{DateTime, Local};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Missing => String::new(),
    }
}

fn write_csv<W: Write>(writer: W, table: &Table) -> Result<(), ScreenError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table.columns())
        .map_err(|e| ScreenError::Cache {
            reason: format!("CSV write error: {e}"),
        })?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(cell_to_string))
            .map_err(|e| ScreenError::Cache {
                reason: format!("CSV write error: {e}"),
            })?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_csv(path: &Path) -> Result<Table, ScreenError> {
    let content = fs::read_to_string(path)?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    let mut rdr = csv::Reader::from_reader(content.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| ScreenError::Cache {
            reason: format!("CSV header error: {e}"),
        })?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let mut table = Table::new(headers);
    for record in rdr.records() {
        let record = record.map_err(|e| ScreenError::Cache {
            reason: format!("CSV parse error: {e}"),
        })?;
        let row = record
            .iter()
            .map(|cell| {
                if cell.is_empty() {
                    Value::Missing
                } else {
                    Value::text(cell)
                }
            })
            .collect();
        table.push_row(row)?;
    }
    Ok(table)
}

/// Day-keyed cache over a single CSV file.
pub struct CsvCacheAdapter;

impl CachePort for CsvCacheAdapter {
    fn read(&self, path: &Path) -> Result<Option<CacheEntry>, ScreenError> {
        if !path.exists() {
            return Ok(None);
        }
        let modified = fs::metadata(path)?.modified()?;
        let stored_on = DateTime::<Local>::from(modified).date_naive();
        let table = read_csv(path)?;
        Ok(Some(CacheEntry { table, stored_on }))
    }

    fn write(&self, path: &Path, table: &Table) -> Result<(), ScreenError> {
        let tmp = tmp_sibling(path);
        let file = fs::File::create(&tmp)?;
        if let Err(e) = write_csv(file, table) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Result sink: full overwrite, UTF-8 BOM prefix.
pub struct CsvResultAdapter;

impl ResultPort for CsvResultAdapter {
    fn write(&self, path: &Path, table: &Table) -> Result<(), ScreenError> {
        let mut file = fs::File::create(path).map_err(|e| ScreenError::Persistence {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        file.write_all(UTF8_BOM)
            .and_then(|_| {
                write_csv(&mut file, table).map_err(std::io::Error::other)?;
                Ok(())
            })
            .map_err(|e| ScreenError::Persistence {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
    }
}
