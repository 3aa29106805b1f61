//! Throughput-Test Log Parsing
//!
//! Turns the line-oriented server log into finished diagnosis records.
//! Parsing is best-effort: malformed lines are skipped, short numeric lines
//! drop their record, and only a log that cannot be opened at all is an
//! error.

mod scan;

pub use scan::{parse_file, parse_str, LogError, LogParser};
