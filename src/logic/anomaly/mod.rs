//! Path Anomaly Detection
//!
//! Derived ratios plus the fixed threshold rules that flag duplex mismatch,
//! bad cable, half duplex, and receiver-side congestion.
//!
//! ## Structure
//! - `rules`: thresholds only
//! - `classifier`: derivation and the ordered rule chain

pub mod classifier;
pub mod rules;

pub use classifier::{diagnose, Diagnosis};
pub use rules::EPSILON;
