//! Background reload worker
//!
//! Single-writer model: one reload at a time parses the log and publishes
//! the finished collection by swapping in a fresh container. Consumers keep
//! whatever snapshot they already hold; a cancelled reload publishes
//! nothing and the previous collection stays authoritative.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::Serialize;

use super::parser::{LogError, LogParser};
use super::snapshot::DiagnosisRecord;

// ============================================================================
// STATE
// ============================================================================

static IS_RUNNING: AtomicBool = AtomicBool::new(false);

/// Cancellation flag shared with the parser of the reload in flight.
static CANCEL: Lazy<Arc<AtomicBool>> = Lazy::new(|| Arc::new(AtomicBool::new(false)));

/// Published collection. Swapped whole, never mutated in place.
static RESULTS: RwLock<Option<Arc<Vec<DiagnosisRecord>>>> = RwLock::new(None);

static LAST_RUN: RwLock<Option<RunStats>> = RwLock::new(None);

// ============================================================================
// TYPES
// ============================================================================

/// Bookkeeping for one reload.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub source: String,
    pub records: usize,
    pub dropped: usize,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug)]
pub enum WorkerError {
    /// A reload is already in flight.
    Busy,
    Log(LogError),
}

impl std::fmt::Display for WorkerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerError::Busy => write!(f, "a reload is already running"),
            WorkerError::Log(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for WorkerError {}

impl From<LogError> for WorkerError {
    fn from(err: LogError) -> Self {
        WorkerError::Log(err)
    }
}

// ============================================================================
// CONTROL
// ============================================================================

/// Reload a log on the calling thread. Fails fast if another reload holds
/// the writer slot.
pub fn reload(path: &Path) -> Result<RunStats, WorkerError> {
    if IS_RUNNING.swap(true, Ordering::SeqCst) {
        return Err(WorkerError::Busy);
    }
    CANCEL.store(false, Ordering::SeqCst);
    let result = run_reload(path, &CANCEL);
    IS_RUNNING.store(false, Ordering::SeqCst);
    result
}

/// Spawn a reload in the background; errors are logged, not returned.
pub fn start_background(path: PathBuf) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        if let Err(e) = reload(&path) {
            log::error!("background reload of {:?} failed: {}", path, e);
        }
    })
}

/// Ask the reload in flight to stop after its current line.
pub fn cancel() {
    CANCEL.store(true, Ordering::SeqCst);
}

pub fn is_running() -> bool {
    IS_RUNNING.load(Ordering::SeqCst)
}

/// Snapshot of the published collection. Cheap; the collection itself is
/// shared, not copied.
pub fn results() -> Arc<Vec<DiagnosisRecord>> {
    RESULTS
        .read()
        .clone()
        .unwrap_or_else(|| Arc::new(Vec::new()))
}

pub fn last_run() -> Option<RunStats> {
    LAST_RUN.read().clone()
}

// ============================================================================
// RELOAD
// ============================================================================

fn run_reload(path: &Path, cancel: &Arc<AtomicBool>) -> Result<RunStats, WorkerError> {
    let started_at = Utc::now();
    let text = std::fs::read_to_string(path).map_err(LogError::Io)?;

    let mut parser = LogParser::with_cancel(&text, cancel.clone());
    let mut fresh = Vec::new();
    while let Some(record) = parser.next() {
        fresh.push(record);
    }

    let cancelled = cancel.load(Ordering::SeqCst);
    let stats = RunStats {
        source: path.display().to_string(),
        records: parser.emitted(),
        dropped: parser.dropped(),
        cancelled,
        started_at,
        finished_at: Utc::now(),
    };

    if cancelled {
        log::info!(
            "reload of {} cancelled after {} records; previous collection kept",
            stats.source,
            stats.records
        );
    } else {
        log::info!(
            "reload of {} published {} records ({} dropped)",
            stats.source,
            stats.records,
            stats.dropped
        );
        *RESULTS.write() = Some(Arc::new(fresh));
    }
    *LAST_RUN.write() = Some(stats.clone());
    Ok(stats)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// The worker state is process-global; run these tests one at a time.
    static SERIAL: Mutex<()> = Mutex::new(());

    fn write_log(sessions: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for i in 0..sessions {
            writeln!(file, "Mon Jan 12 14:02:11 2004 192.0.2.{} port 3001", i).unwrap();
            let fields: Vec<String> = (1..=50).map(|v| v.to_string()).collect();
            writeln!(file, "x,192.0.2.{},{}", i, fields.join(",")).unwrap();
        }
        file
    }

    #[test]
    fn test_reload_publishes_collection() {
        let _guard = SERIAL.lock();
        let file = write_log(3);
        let stats = reload(file.path()).unwrap();
        assert_eq!(stats.records, 3);
        assert!(!stats.cancelled);
        assert_eq!(results().len(), 3);
        assert!(last_run().is_some());
    }

    #[test]
    fn test_missing_log_is_an_error() {
        let _guard = SERIAL.lock();
        let err = reload(Path::new("/nonexistent/throughput.log"));
        assert!(matches!(err, Err(WorkerError::Log(_))));
    }

    #[test]
    fn test_cancelled_reload_keeps_previous_collection() {
        let _guard = SERIAL.lock();
        let file = write_log(2);
        reload(file.path()).unwrap();
        let before = results();

        // A reload whose flag is already raised parses nothing and must
        // not publish; the earlier collection stays authoritative.
        let bigger = write_log(5);
        let raised = Arc::new(AtomicBool::new(true));
        let stats = run_reload(bigger.path(), &raised).unwrap();
        assert!(stats.cancelled);
        assert_eq!(stats.records, 0);
        assert_eq!(results().len(), before.len());
    }

    #[test]
    fn test_background_reload_joins() {
        let _guard = SERIAL.lock();
        let file = write_log(1);
        start_background(file.path().to_path_buf()).join().unwrap();
        assert!(!is_running());
        assert!(results().len() >= 1);
    }
}
