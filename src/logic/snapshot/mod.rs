//! Test-Session Data Model
//!
//! Raw counter snapshots, packet-pair histograms, and the finished
//! diagnosis records the rest of the engine produces and consumes.

pub mod counters;
pub mod histogram;
pub mod record;

pub use counters::{Web100Counters, COUNTER_FIELDS, REQUIRED_TOKENS};
pub use histogram::{HistogramSet, C2S_ACK, C2S_DATA, DIRECTIONS, MAX_BINS, S2C_ACK, S2C_DATA};
pub use record::{DiagnosisRecord, SnapArtifacts};
