//! Link Classification Rules & Label Tables
//!
//! Thresholds and the detection-code label tables. No scan logic here.

use serde::{Deserialize, Serialize};

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Bins at or below this fraction of the peak do not count toward the
/// head/tail spread.
pub const PEAK_RATIO: f64 = 0.1;

/// Histograms with fewer total samples than this are unreliable even when a
/// clear peak exists.
pub const MIN_SAMPLES: i64 = 20;

/// Slot count of the legacy capture format (15 bins plus running average).
/// Newer captures use fewer slots and a shifted code assignment.
pub const LEGACY_LINKCNT: usize = 16;

/// Detection sentinel: the peak bin itself carries the capture-fault marker.
pub const CODE_FAULT: i64 = -1;

/// Detection sentinel: too few samples to trust any peak.
pub const CODE_INSUFFICIENT: i64 = -2;

// Code-2 tie-break: symmetric business-class links show near-equal
// throughput in both directions at more than dial-up speed.
pub const SYMMETRY_RATIO_LO: f64 = 0.8;
pub const SYMMETRY_RATIO_HI: f64 = 1.2;
pub const SYMMETRY_MIN_KBPS: i64 = 1000;

/// Ack-direction tail spread beyond this marks a cable-modem return path.
pub const CABLE_TAIL_MIN: usize = 1;

// ============================================================================
// LINK TYPES
// ============================================================================

/// Bottleneck classification for a tested path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkType {
    InsufficientData,
    SystemFault,
    RoundTripTime,
    DialUp,
    SymmetricT1,
    CableModem,
    Dsl,
    T1,
    Ethernet,
    T3,
    FastEthernet,
    Oc12,
    GigabitEthernet,
    Oc48,
    TenGigEthernet,
    Unknown,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::InsufficientData => "Insufficient data",
            LinkType::SystemFault => "System fault",
            LinkType::RoundTripTime => "Round trip time",
            LinkType::DialUp => "Dial-up modem",
            LinkType::SymmetricT1 => "T1/E1 symmetric subnet",
            LinkType::CableModem => "Cable modem",
            LinkType::Dsl => "DSL",
            LinkType::T1 => "1.5 Mbps T1 subnet",
            LinkType::Ethernet => "10 Mbps Ethernet",
            LinkType::T3 => "45 Mbps T3/DS3 subnet",
            LinkType::FastEthernet => "100 Mbps Fast Ethernet",
            LinkType::Oc12 => "622 Mbps OC-12",
            LinkType::GigabitEthernet => "1 Gbps Gigabit Ethernet",
            LinkType::Oc48 => "2.4 Gbps OC-48",
            LinkType::TenGigEthernet => "10 Gbps 10-Gigabit Ethernet",
            LinkType::Unknown => "Unknown link",
        }
    }
}

impl Default for LinkType {
    fn default() -> Self {
        LinkType::InsufficientData
    }
}

impl std::fmt::Display for LinkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// LABEL TABLES
// ============================================================================

/// Resolve a detection code of 3 or higher against the capture format's
/// table. The two tables assign different media to the same codes; this is
/// deliberate capture-schema evolution and must not be unified.
///
/// Codes -2/-1/0/1 mean the same thing in every format and code 2 takes the
/// symmetric/cable/DSL tie-break; neither reaches this lookup.
pub fn media_label(code: i64, linkcnt: usize) -> LinkType {
    if linkcnt == LEGACY_LINKCNT {
        match code {
            3 => LinkType::Ethernet,
            4 => LinkType::T3,
            5 => LinkType::FastEthernet,
            6 => LinkType::Oc12,
            7 => LinkType::GigabitEthernet,
            8 => LinkType::Oc48,
            9 => LinkType::TenGigEthernet,
            _ => LinkType::Unknown,
        }
    } else {
        match code {
            3 => LinkType::T1,
            4 => LinkType::Ethernet,
            5 => LinkType::T3,
            6 => LinkType::FastEthernet,
            7 => LinkType::Oc12,
            8 => LinkType::GigabitEthernet,
            9 => LinkType::Oc48,
            10 => LinkType::TenGigEthernet,
            _ => LinkType::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_diverge_on_shared_codes() {
        // Capture-schema evolution: the same code names different media
        // depending on the slot count.
        assert_eq!(media_label(3, LEGACY_LINKCNT), LinkType::Ethernet);
        assert_eq!(media_label(3, 11), LinkType::T1);
        assert_eq!(media_label(9, LEGACY_LINKCNT), LinkType::TenGigEthernet);
        assert_eq!(media_label(9, 11), LinkType::Oc48);
    }

    #[test]
    fn test_codes_past_table_are_unknown() {
        assert_eq!(media_label(12, LEGACY_LINKCNT), LinkType::Unknown);
        assert_eq!(media_label(11, 11), LinkType::Unknown);
    }
}
