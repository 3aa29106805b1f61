//! Archived test rows
//!
//! Alternative input path: tests already archived in a SQLite table, one
//! row per session with one column per Web100 variable name. A row that
//! fails to map is skipped; it never aborts the batch. Rows carry no
//! packet-pair histograms, so link detection reports insufficient data and
//! the anomaly rules still run off the counters.

use std::path::Path;

use rusqlite::Connection;

use super::snapshot::{DiagnosisRecord, HistogramSet, SnapArtifacts, Web100Counters, COUNTER_FIELDS};

/// Table layout the archive writer and this reader agree on.
pub const ARCHIVE_TABLE: &str = "tests";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Sqlite(e) => write!(f, "archive error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Sqlite(err)
    }
}

// ============================================================================
// READER
// ============================================================================

/// Load every archived session, skipping rows that fail to map.
pub fn load_records(conn: &Connection) -> Result<Vec<DiagnosisRecord>, StoreError> {
    let columns = format!("date, ip, port, {}", COUNTER_FIELDS.join(", "));
    let sql = format!("SELECT {} FROM {} ORDER BY rowid", columns, ARCHIVE_TABLE);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    while let Some(row) = rows.next()? {
        match map_row(row) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                log::warn!("skipping archived row: {}", e);
            }
        }
    }
    if skipped > 0 {
        log::info!("archive load: {} rows mapped, {} skipped", records.len(), skipped);
    }
    Ok(records)
}

/// Open an archive file and load it in one step.
pub fn load_from_path(path: &Path) -> Result<Vec<DiagnosisRecord>, StoreError> {
    let conn = Connection::open(path)?;
    load_records(&conn)
}

/// One row, addressed by column name, through the same field mapping the
/// log parser uses.
fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DiagnosisRecord> {
    let mut counters = Web100Counters::default();
    counters.date = row.get("date")?;
    counters.ip_addr = row.get("ip")?;
    counters.port = row.get("port")?;
    for name in COUNTER_FIELDS {
        let value: i64 = row.get(name)?;
        counters.apply_field(name, value);
    }
    Ok(DiagnosisRecord::calculate(
        counters,
        HistogramSet::default(),
        SnapArtifacts::default(),
    ))
}

// ============================================================================
// TESTS
// ============================================================================
