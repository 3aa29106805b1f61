//! Finished diagnosis records
//!
//! A `DiagnosisRecord` is the immutable result of running both classifiers
//! over one parsed test. Build one through [`DiagnosisRecord::calculate`];
//! nothing mutates it afterwards.

use serde::{Deserialize, Serialize};

use super::counters::Web100Counters;
use super::histogram::{HistogramSet, C2S_ACK, C2S_DATA, S2C_ACK, S2C_DATA};
use crate::logic::anomaly;
use crate::logic::link::{self, LinkType};

/// Auxiliary capture artifacts named in the log, opaque to the diagnosis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapArtifacts {
    pub snaplog: Option<String>,
    pub c2s_snaplog: Option<String>,
    pub cputime_trace: Option<String>,
}

/// One test session with its full diagnosis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisRecord {
    pub counters: Web100Counters,
    pub histograms: HistogramSet,
    pub artifacts: SnapArtifacts,

    /// Resolved bottleneck classification.
    pub bottleneck: LinkType,

    // Detected per-direction link codes. These supersede the
    // server-reported values carried on the log line.
    pub c2sdata: i64,
    pub c2sack: i64,
    pub s2cdata: i64,
    pub s2cack: i64,

    /// Working link-speed indicator after the anomaly overrides.
    pub link: i64,
    pub mismatch2: i64,
    pub mismatch3: i64,
    pub bad_cable: i64,
    pub congestion2: i64,
    pub half_duplex: i64,

    pub loss: f64,
    pub loss2: f64,
    pub order: f64,
    pub bw: f64,
    pub bw2: f64,
    pub avgrtt: f64,
    pub rwintime: f64,
    pub cwndtime: f64,
    pub sendtime: f64,
    pub idle: f64,
    pub timesec: f64,
    pub spd: f64,
}

impl DiagnosisRecord {
    /// Materialize a finished record from a completed accumulator: run the
    /// link classifier over the histograms, then the anomaly rules over the
    /// counters.
    pub fn calculate(
        counters: Web100Counters,
        histograms: HistogramSet,
        artifacts: SnapArtifacts,
    ) -> Self {
        let detection = link::classify(&counters, &histograms);
        let diagnosis = anomaly::diagnose(&counters);

        log::debug!(
            "{} port {}: {} link={} mismatch2={} bad_cable={} congestion2={}",
            counters.ip_addr,
            counters.port,
            detection.bottleneck,
            diagnosis.link,
            diagnosis.mismatch2,
            diagnosis.bad_cable,
            diagnosis.congestion2
        );

        DiagnosisRecord {
            bottleneck: detection.bottleneck,
            c2sdata: detection.codes[C2S_DATA],
            c2sack: detection.codes[C2S_ACK],
            s2cdata: detection.codes[S2C_DATA],
            s2cack: detection.codes[S2C_ACK],
            link: diagnosis.link,
            mismatch2: diagnosis.mismatch2,
            mismatch3: diagnosis.mismatch3,
            bad_cable: diagnosis.bad_cable,
            congestion2: diagnosis.congestion2,
            half_duplex: diagnosis.half_duplex,
            loss: diagnosis.loss,
            loss2: diagnosis.loss2,
            order: diagnosis.order,
            bw: diagnosis.bw,
            bw2: diagnosis.bw2,
            avgrtt: diagnosis.avgrtt,
            rwintime: diagnosis.rwintime,
            cwndtime: diagnosis.cwndtime,
            sendtime: diagnosis.sendtime,
            idle: diagnosis.idle,
            timesec: diagnosis.timesec,
            spd: diagnosis.spd,
            counters,
            histograms,
            artifacts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detected_codes_supersede_reported_ones() {
        let mut counters = Web100Counters::default();
        counters.c2sdata = 7; // server's opinion
        let mut hist = HistogramSet::default();
        for &b in &[0i64, 60, 2, 0, 0, 0, 0, 0, 0, 0] {
            hist.push_bin(C2S_DATA, b);
        }
        let rec = DiagnosisRecord::calculate(counters, hist, SnapArtifacts::default());
        assert_eq!(rec.c2sdata, 1);
        assert_eq!(rec.counters.c2sdata, 7);
        assert_eq!(rec.bottleneck, LinkType::DialUp);
    }

    #[test]
    fn test_no_histograms_yield_insufficient_data() {
        let rec = DiagnosisRecord::calculate(
            Web100Counters::default(),
            HistogramSet::default(),
            SnapArtifacts::default(),
        );
        assert_eq!(rec.c2sdata, link::CODE_INSUFFICIENT);
        assert_eq!(rec.bottleneck, LinkType::InsufficientData);
        assert!(rec.loss > 0.0);
    }
}
