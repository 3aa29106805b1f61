//! Path Anomaly Thresholds
//!
//! Fixed empirical constants for the duplex-mismatch, bad-cable, and
//! congestion heuristics. No rule logic here.

/// Substituted wherever a denominator or a loss figure would otherwise be
/// exactly zero; keeps the bandwidth estimator well-defined.
pub const EPSILON: f64 = 1e-10;

// ============================================================================
// DUPLEX MISMATCH
// ============================================================================

/// Ack-per-data-packet ratio outside this band looks like a mismatch.
pub const ACK_RATIO_HIGH: f64 = 0.7;
pub const ACK_RATIO_LOW: f64 = 0.3;

/// Minimum retransmitted fraction of sent packets.
pub const RETRANS_MIN: f64 = 0.03;

/// Directional speed ratio marking a grossly asymmetric path.
pub const ASYMMETRY_MIN: f64 = 15.0;

/// Idle-time fraction for the timeout-driven mismatch variant.
pub const IDLE_MIN: f64 = 0.65;

/// Timeout fraction of sent packets must stay below this for that variant.
pub const TIMEOUT_RATIO_MAX: f64 = 0.4;

// ============================================================================
// BAD CABLE
// ============================================================================

/// Loss-percent-per-second floor.
pub const CABLE_LOSS_RATE_MIN: f64 = 15.0;

/// Congestion-window-limited share floor.
pub const CABLE_CWND_SHARE_MIN: f64 = 0.6;

/// Absolute loss ceiling; cable faults lose steadily but lightly.
pub const CABLE_LOSS_MAX: f64 = 0.01;

// ============================================================================
// LINK OVERRIDES
// ============================================================================

/// Measured-speed window (Mbps) that reads as Ethernet-class media.
pub const ETHERNET_SPD_LO: f64 = 3.0;
pub const ETHERNET_SPD_HI: f64 = 9.5;
pub const ETHERNET_LOSS_MAX: f64 = 0.01;
pub const ETHERNET_ORDER_MAX: f64 = 0.035;

/// Link-speed indicator forced by the Ethernet override (Mbps class).
pub const ETHERNET_LINK: i64 = 10;

/// Sender-limited-time ceiling (microseconds) for the DSL/cable override.
pub const DSL_SENDER_TIME_MAX: i64 = 15000;

/// Measured-speed ceiling (Mbps) for the DSL/cable override.
pub const DSL_SPD_MAX: f64 = 2.0;

/// Link-speed indicator forced by the DSL/cable override (Mbps class).
pub const DSL_LINK: i64 = 2;

// ============================================================================
// HALF DUPLEX
// ============================================================================

/// Receiver-window-limited share floor.
pub const RWIN_SHARE_MIN: f64 = 0.95;

/// State-transition rate floor (transitions per second).
pub const TRANS_RATE_MIN: f64 = 30.0;

/// Link-speed indicators at or below this (Mbps class) are shared media.
pub const HALF_DUPLEX_LINK_MAX: i64 = 10;

// ============================================================================
// CONGESTION
// ============================================================================

/// Congestion-window-limited share floor for the receiver-side check.
pub const CONGESTION_CWND_SHARE_MIN: f64 = 0.02;
