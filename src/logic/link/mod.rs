//! Bottleneck Link Detection
//!
//! Packet-pair histogram analysis: which network segment caps throughput.
//!
//! ## Structure
//! - `rules`: thresholds, sentinels, and the capture-format label tables
//! - `classifier`: peak scan and bottleneck resolution

pub mod classifier;
pub mod rules;

pub use classifier::{classify, detect, scan, LinkDetection, LinkScan};
pub use rules::{LinkType, CODE_FAULT, CODE_INSUFFICIENT, LEGACY_LINKCNT};
