//! Link Classifier
//!
//! Turns the per-direction packet-pair histograms into detection codes and
//! resolves the bottleneck label from the client-to-server data direction.

use serde::{Deserialize, Serialize};

use super::rules::{
    self, LinkType, CABLE_TAIL_MIN, CODE_FAULT, CODE_INSUFFICIENT, MIN_SAMPLES, PEAK_RATIO,
    SYMMETRY_MIN_KBPS, SYMMETRY_RATIO_HI, SYMMETRY_RATIO_LO,
};
use crate::logic::snapshot::{HistogramSet, Web100Counters, C2S_DATA, DIRECTIONS, S2C_ACK};

// ============================================================================
// HISTOGRAM SCAN
// ============================================================================

/// Shape summary of one direction's histogram.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LinkScan {
    /// Largest bin value.
    pub max: i64,
    /// Position of the largest bin.
    pub indx: usize,
    /// Sum over all bins.
    pub total: i64,
    /// Bins before the peak above the spread ratio.
    pub head: usize,
    /// Bins after the peak above the spread ratio.
    pub tail: usize,
}

/// Scan a direction's bins for peak position and spread.
pub fn scan(bins: &[i64]) -> LinkScan {
    let mut out = LinkScan::default();
    let Some(&first) = bins.first() else {
        return out;
    };
    out.max = first;
    for (i, &b) in bins.iter().enumerate() {
        if b > out.max {
            out.max = b;
            out.indx = i;
        }
        out.total += b;
    }
    if out.max > 0 {
        let max = out.max as f64;
        out.head = bins[..out.indx]
            .iter()
            .filter(|&&b| b as f64 / max > PEAK_RATIO)
            .count();
        out.tail = bins[out.indx + 1..]
            .iter()
            .filter(|&&b| b as f64 / max > PEAK_RATIO)
            .count();
    }
    out
}

/// Detection code for one direction: the peak bin position, or a sentinel.
///
/// The sample floor fires even when a peak was found; too few samples make
/// any peak unreliable.
pub fn detect(bins: &[i64]) -> (i64, LinkScan) {
    let scan = scan(bins);
    if bins.is_empty() {
        return (CODE_INSUFFICIENT, scan);
    }
    if bins[scan.indx] == -1 {
        return (CODE_FAULT, scan);
    }
    if scan.total < MIN_SAMPLES {
        return (CODE_INSUFFICIENT, scan);
    }
    (scan.indx as i64, scan)
}

// ============================================================================
// PATH CLASSIFICATION
// ============================================================================

/// Detection results for all four directions plus the resolved bottleneck.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LinkDetection {
    /// Per-direction detection codes, histogram-line order.
    pub codes: [i64; DIRECTIONS],
    pub scans: [LinkScan; DIRECTIONS],
    pub bottleneck: LinkType,
}

/// Classify every direction and resolve the bottleneck label.
pub fn classify(counters: &Web100Counters, hist: &HistogramSet) -> LinkDetection {
    let mut det = LinkDetection::default();
    for dir in 0..DIRECTIONS {
        let (code, scan) = detect(hist.bins(dir));
        det.codes[dir] = code;
        det.scans[dir] = scan;
    }
    det.bottleneck = resolve(counters, &det, hist.linkcnt(C2S_DATA));
    det
}

/// The bottleneck label comes from the client-to-server data direction
/// alone; the ack directions only feed the code-2 tie-break.
fn resolve(counters: &Web100Counters, det: &LinkDetection, linkcnt: usize) -> LinkType {
    match det.codes[C2S_DATA] {
        CODE_INSUFFICIENT => LinkType::InsufficientData,
        CODE_FAULT => LinkType::SystemFault,
        0 => LinkType::RoundTripTime,
        1 => LinkType::DialUp,
        2 => {
            // Symmetric business-class links run near-equal speeds both
            // ways; asymmetric consumer links split on the ack-direction
            // tail shape.
            let ratio = counters.c2sspd as f64 / counters.s2cspd as f64;
            if ratio >= SYMMETRY_RATIO_LO
                && ratio <= SYMMETRY_RATIO_HI
                && counters.c2sspd > SYMMETRY_MIN_KBPS
            {
                LinkType::SymmetricT1
            } else if det.scans[S2C_ACK].tail > CABLE_TAIL_MIN || det.codes[S2C_ACK] == 3 {
                LinkType::CableModem
            } else {
                LinkType::Dsl
            }
        }
        code => rules::media_label(code, linkcnt),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::snapshot::{C2S_ACK, S2C_DATA};

    fn hist_with(dir_bins: [&[i64]; DIRECTIONS]) -> HistogramSet {
        let mut hist = HistogramSet::default();
        for (dir, bins) in dir_bins.iter().enumerate() {
            for &b in *bins {
                hist.push_bin(dir, b);
            }
        }
        hist
    }

    #[test]
    fn test_peak_scan_shape() {
        let bins = [0, 0, 50, 10, 1, 0, 0, 0, 0, 0];
        let scan = scan(&bins);
        assert_eq!(scan.indx, 2);
        assert_eq!(scan.max, 50);
        assert_eq!(scan.total, 61);
        assert_eq!(scan.head, 0);
        // Only the 10 at position 3 clears 10% of the peak.
        assert_eq!(scan.tail, 1);
    }

    #[test]
    fn test_sample_floor_beats_clear_peak() {
        // A sharp peak with too few samples is still unreliable.
        let bins = [0, 0, 15, 2, 0, 0, 0, 0, 0, 0];
        let (code, _) = detect(&bins);
        assert_eq!(code, CODE_INSUFFICIENT);
    }

    #[test]
    fn test_fault_marker_wins() {
        let bins = [-1, -1, -1, -1];
        let (code, _) = detect(&bins);
        assert_eq!(code, CODE_FAULT);
    }

    #[test]
    fn test_empty_histogram_is_insufficient() {
        let (code, _) = detect(&[]);
        assert_eq!(code, CODE_INSUFFICIENT);
    }

    #[test]
    fn test_detection_proceeds_past_sentinels() {
        let bins = [0, 0, 50, 10, 1, 0, 0, 0, 0, 0];
        let (code, scan) = detect(&bins);
        assert_eq!(code, 2);
        assert_eq!(scan.total, 61);
    }

    #[test]
    fn test_symmetric_speeds_resolve_to_t1_class() {
        // Ratio 0.91 lies inside the symmetric window and the upstream
        // clears the dial-up floor.
        let mut counters = Web100Counters::default();
        counters.c2sspd = 2000;
        counters.s2cspd = 2200;
        let peak2: &[i64] = &[0, 0, 50, 10, 1, 0, 0, 0, 0, 0];
        let quiet: &[i64] = &[30, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let hist = hist_with([peak2, quiet, quiet, quiet]);
        let det = classify(&counters, &hist);
        assert_eq!(det.codes[C2S_DATA], 2);
        assert_eq!(det.bottleneck, LinkType::SymmetricT1);
    }

    #[test]
    fn test_ack_tail_spread_resolves_to_cable() {
        let mut counters = Web100Counters::default();
        counters.c2sspd = 500;
        counters.s2cspd = 5000;
        let peak2: &[i64] = &[0, 0, 50, 10, 1, 0, 0, 0, 0, 0];
        let quiet: &[i64] = &[30, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        // Ack return path spread across several bins past the peak.
        let spread: &[i64] = &[40, 20, 15, 12, 0, 0, 0, 0, 0, 0];
        let hist = hist_with([peak2, quiet, quiet, spread]);
        let det = classify(&counters, &hist);
        assert!(det.scans[S2C_ACK].tail > CABLE_TAIL_MIN);
        assert_eq!(det.bottleneck, LinkType::CableModem);
    }

    #[test]
    fn test_narrow_ack_peak_resolves_to_dsl() {
        let mut counters = Web100Counters::default();
        counters.c2sspd = 500;
        counters.s2cspd = 5000;
        let peak2: &[i64] = &[0, 0, 50, 10, 1, 0, 0, 0, 0, 0];
        let quiet: &[i64] = &[30, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let hist = hist_with([peak2, quiet, quiet, quiet]);
        let det = classify(&counters, &hist);
        assert_eq!(det.bottleneck, LinkType::Dsl);
    }

    #[test]
    fn test_bottleneck_ignores_other_directions() {
        // Direction 2 peaks high, but only direction 0 names the bottleneck.
        let counters = Web100Counters::default();
        let dialup: &[i64] = &[0, 60, 2, 0, 0, 0, 0, 0, 0, 0];
        let fast: &[i64] = &[0, 0, 0, 0, 0, 0, 0, 70, 0, 0];
        let hist = hist_with([dialup, dialup, fast, dialup]);
        let det = classify(&counters, &hist);
        assert_eq!(det.codes[S2C_DATA], 7);
        assert_eq!(det.codes[C2S_ACK], 1);
        assert_eq!(det.bottleneck, LinkType::DialUp);
    }

    #[test]
    fn test_table_follows_capture_format() {
        let counters = Web100Counters::default();
        // 10 bins + average slot = compact capture, code 4 reads Ethernet.
        let peak4: &[i64] = &[0, 0, 0, 0, 60, 0, 0, 0, 0, 0];
        let quiet: &[i64] = &[30, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let hist = hist_with([peak4, quiet, quiet, quiet]);
        assert_eq!(classify(&counters, &hist).bottleneck, LinkType::Ethernet);

        // 15 bins + average slot = legacy capture, same code reads T3.
        let peak4_legacy: &[i64] = &[0, 0, 0, 0, 60, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let quiet_legacy: &[i64] = &[30, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let hist = hist_with([peak4_legacy, quiet_legacy, quiet_legacy, quiet_legacy]);
        assert_eq!(classify(&counters, &hist).bottleneck, LinkType::T3);
    }
}
