//! Packet-pair link histograms
//!
//! The test server emits one "spds" line per measurement direction; each
//! line carries the integer bin counts followed by a floating running
//! average that terminates the sequence.

use serde::{Deserialize, Serialize};

/// Measurement directions, in the order their histogram lines appear.
pub const C2S_DATA: usize = 0;
pub const C2S_ACK: usize = 1;
pub const S2C_DATA: usize = 2;
pub const S2C_ACK: usize = 3;

/// Number of measurement directions per test.
pub const DIRECTIONS: usize = 4;

/// No capture format carries more than this many slots per direction.
pub const MAX_BINS: usize = 16;

/// Four per-direction bin sequences plus their running averages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistogramSet {
    bins: [Vec<i64>; DIRECTIONS],
    runave: [f64; DIRECTIONS],
}

impl HistogramSet {
    /// Append a bin sample for a direction. Samples past the capture
    /// format's slot limit are ignored.
    pub fn push_bin(&mut self, dir: usize, value: i64) {
        if dir < DIRECTIONS && self.bins[dir].len() < MAX_BINS {
            self.bins[dir].push(value);
        }
    }

    pub fn set_running_average(&mut self, dir: usize, value: f64) {
        if dir < DIRECTIONS {
            self.runave[dir] = value;
        }
    }

    pub fn bins(&self, dir: usize) -> &[i64] {
        &self.bins[dir]
    }

    pub fn running_average(&self, dir: usize) -> f64 {
        self.runave[dir]
    }

    /// Slot count for a direction: the bins plus the trailing slot the
    /// capture format reserves for the running average.
    pub fn linkcnt(&self, dir: usize) -> usize {
        self.bins[dir].len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linkcnt_counts_average_slot() {
        let mut hist = HistogramSet::default();
        for _ in 0..10 {
            hist.push_bin(C2S_DATA, 1);
        }
        hist.set_running_average(C2S_DATA, 4.5);
        assert_eq!(hist.linkcnt(C2S_DATA), 11);
        assert_eq!(hist.bins(C2S_DATA).len(), 10);
    }

    #[test]
    fn test_bins_capped_at_capture_limit() {
        let mut hist = HistogramSet::default();
        for i in 0..MAX_BINS + 5 {
            hist.push_bin(S2C_ACK, i as i64);
        }
        assert_eq!(hist.bins(S2C_ACK).len(), MAX_BINS);
    }

    #[test]
    fn test_out_of_range_direction_ignored() {
        let mut hist = HistogramSet::default();
        hist.push_bin(DIRECTIONS, 9);
        hist.set_running_average(DIRECTIONS, 9.0);
        assert_eq!(hist, HistogramSet::default());
    }
}
