//! Per-test Web100 counter snapshot
//!
//! One completed throughput test = one `Web100Counters`. The fields mirror
//! the kernel instrumentation variables the test server writes out, in the
//! exact order they appear on the numeric log line.

use serde::{Deserialize, Serialize};

// ============================================================================
// CANONICAL FIELD ORDER
// ============================================================================

/// Web100 variable names in log-line position order (positions 2 onward).
///
/// Both input paths go through this list: the numeric log line zips its
/// tokens against it, the archive reader queries columns by these names.
pub const COUNTER_FIELDS: [&str; 50] = [
    "s2c2spd",
    "s2cspd",
    "c2sspd",
    "Timeouts",
    "SumRTT",
    "CountRTT",
    "PktsRetrans",
    "FastRetran",
    "DataPktsOut",
    "AckPktsOut",
    "CurrentMSS",
    "DupAcksIn",
    "AckPktsIn",
    "MaxRwinRcvd",
    "Sndbuf",
    "CurrentCwnd",
    "SndLimTimeRwin",
    "SndLimTimeCwnd",
    "SndLimTimeSender",
    "DataBytesOut",
    "SndLimTransRwin",
    "SndLimTransCwnd",
    "SndLimTransSender",
    "MaxSsthresh",
    "CurrentRTO",
    "CurrentRwinRcvd",
    "link",
    "mismatch",
    "bad_cable",
    "half_duplex",
    "congestion",
    "c2sdata",
    "c2sack",
    "s2cdata",
    "s2cack",
    "CongestionSignals",
    "PktsOut",
    "MinRTT",
    "RcvWinScale",
    "autotune",
    "CongAvoid",
    "CongestionOverCount",
    "MaxRTT",
    "OtherReductions",
    "CurTimeouts",
    "AbruptTimeouts",
    "SendStall",
    "SlowStart",
    "SubsequentTimeouts",
    "ThruBytesAcked",
];

/// Tokens a numeric log line must carry before field parsing starts:
/// the leading date field, the peer address, then one token per counter.
/// The two CPU idle samples come after these and stay optional.
pub const REQUIRED_TOKENS: usize = COUNTER_FIELDS.len() + 2;

// ============================================================================
// COUNTER SNAPSHOT
// ============================================================================

/// Raw instrumentation snapshot for one test session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Web100Counters {
    // Identity (from the test header line)
    pub date: String,
    pub ip_addr: String,
    pub port: i64,

    // Throughput results (kbps)
    pub s2c2spd: i64,
    pub s2cspd: i64,
    pub c2sspd: i64,

    // TCP instrumentation
    pub timeouts: i64,
    pub sum_rtt: i64,
    pub count_rtt: i64,
    pub pkts_retrans: i64,
    pub fast_retrans: i64,
    pub data_pkts_out: i64,
    pub ack_pkts_out: i64,
    pub current_mss: i64,
    pub dup_acks_in: i64,
    pub ack_pkts_in: i64,
    pub max_rwin_rcvd: i64,
    pub snd_buf: i64,
    pub current_cwnd: i64,
    pub snd_lim_time_rwin: i64,
    pub snd_lim_time_cwnd: i64,
    pub snd_lim_time_sender: i64,
    pub data_bytes_out: i64,
    pub snd_lim_trans_rwin: i64,
    pub snd_lim_trans_cwnd: i64,
    pub snd_lim_trans_sender: i64,
    pub max_ssthresh: i64,
    pub current_rto: i64,
    pub current_rwin_rcvd: i64,

    // Server-side verdicts carried on the log line
    pub link: i64,
    pub mismatch: i64,
    pub bad_cable: i64,
    pub half_duplex: i64,
    pub congestion: i64,

    // Server-side link detection per direction
    pub c2sdata: i64,
    pub c2sack: i64,
    pub s2cdata: i64,
    pub s2cack: i64,

    pub congestion_signals: i64,
    pub pkts_out: i64,
    pub min_rtt: i64,
    pub rcv_win_scale: i64,
    pub autotune: i64,
    pub cong_avoid: i64,
    pub congestion_over_count: i64,
    pub max_rtt: i64,
    pub other_reductions: i64,
    pub cur_timeouts: i64,
    pub abrupt_timeouts: i64,
    pub send_stall: i64,
    pub slow_start: i64,
    pub subsequent_timeouts: i64,
    pub thru_bytes_acked: i64,

    // CPU idle samples (trailing optional fields on newer logs)
    pub cpu_idle1: f64,
    pub cpu_idle2: f64,
}

impl Web100Counters {
    /// Set a counter by its canonical Web100 variable name.
    ///
    /// Returns false for an unknown name. Every name in [`COUNTER_FIELDS`]
    /// resolves here; there is deliberately no dynamic field lookup.
    pub fn apply_field(&mut self, name: &str, value: i64) -> bool {
        match name {
            "s2c2spd" => self.s2c2spd = value,
            "s2cspd" => self.s2cspd = value,
            "c2sspd" => self.c2sspd = value,
            "Timeouts" => self.timeouts = value,
            "SumRTT" => self.sum_rtt = value,
            "CountRTT" => self.count_rtt = value,
            "PktsRetrans" => self.pkts_retrans = value,
            "FastRetran" => self.fast_retrans = value,
            "DataPktsOut" => self.data_pkts_out = value,
            "AckPktsOut" => self.ack_pkts_out = value,
            "CurrentMSS" => self.current_mss = value,
            "DupAcksIn" => self.dup_acks_in = value,
            "AckPktsIn" => self.ack_pkts_in = value,
            "MaxRwinRcvd" => self.max_rwin_rcvd = value,
            "Sndbuf" => self.snd_buf = value,
            "CurrentCwnd" => self.current_cwnd = value,
            "SndLimTimeRwin" => self.snd_lim_time_rwin = value,
            "SndLimTimeCwnd" => self.snd_lim_time_cwnd = value,
            "SndLimTimeSender" => self.snd_lim_time_sender = value,
            "DataBytesOut" => self.data_bytes_out = value,
            "SndLimTransRwin" => self.snd_lim_trans_rwin = value,
            "SndLimTransCwnd" => self.snd_lim_trans_cwnd = value,
            "SndLimTransSender" => self.snd_lim_trans_sender = value,
            "MaxSsthresh" => self.max_ssthresh = value,
            "CurrentRTO" => self.current_rto = value,
            "CurrentRwinRcvd" => self.current_rwin_rcvd = value,
            "link" => self.link = value,
            "mismatch" => self.mismatch = value,
            "bad_cable" => self.bad_cable = value,
            "half_duplex" => self.half_duplex = value,
            "congestion" => self.congestion = value,
            "c2sdata" => self.c2sdata = value,
            "c2sack" => self.c2sack = value,
            "s2cdata" => self.s2cdata = value,
            "s2cack" => self.s2cack = value,
            "CongestionSignals" => self.congestion_signals = value,
            "PktsOut" => self.pkts_out = value,
            "MinRTT" => self.min_rtt = value,
            "RcvWinScale" => self.rcv_win_scale = value,
            "autotune" => self.autotune = value,
            "CongAvoid" => self.cong_avoid = value,
            "CongestionOverCount" => self.congestion_over_count = value,
            "MaxRTT" => self.max_rtt = value,
            "OtherReductions" => self.other_reductions = value,
            "CurTimeouts" => self.cur_timeouts = value,
            "AbruptTimeouts" => self.abrupt_timeouts = value,
            "SendStall" => self.send_stall = value,
            "SlowStart" => self.slow_start = value,
            "SubsequentTimeouts" => self.subsequent_timeouts = value,
            "ThruBytesAcked" => self.thru_bytes_acked = value,
            _ => return false,
        }
        true
    }
}

// ============================================================================
// TESTS
// ============================================================================
