//! Log-analysis core for the network diagnostic viewer.
//!
//! Parses web100srv throughput-test logs, classifies the bottleneck link and
//! path anomalies for each test, and serves filtered views of the result
//! collection. The UI shells (desktop, applet, mobile) consume this crate;
//! nothing in here renders.

pub mod logic;

// Re-export the main entry points for the UI bridge
pub use logic::filter::{CollectionFilter, FilterConfig};
pub use logic::parser::LogParser;
pub use logic::snapshot::{DiagnosisRecord, HistogramSet, Web100Counters};
