//! Path Anomaly Classifier
//!
//! Derives the continuous diagnostics from one test's counters and applies
//! the threshold rules for duplex mismatch, bad cable, half duplex, and
//! receiver-side congestion. Rule order is load-bearing: the link-speed
//! overrides feed the rules evaluated after them.

use serde::{Deserialize, Serialize};

use super::rules::*;
use crate::logic::snapshot::Web100Counters;

// ============================================================================
// DIAGNOSIS
// ============================================================================

/// Derived diagnostics for one test session.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Diagnosis {
    /// Working link-speed indicator after the overrides (Mbps class).
    pub link: i64,
    /// Duplex mismatch, ack/retransmit variant (0 none, 1 ssthresh-pinned,
    /// 2 asymmetric-speed).
    pub mismatch2: i64,
    /// Duplex mismatch, timeout variant (0 none, 1 ssthresh-pinned, 2 other).
    pub mismatch3: i64,
    pub bad_cable: i64,
    /// Receiver-side congestion (window comparison variant).
    pub congestion2: i64,
    pub half_duplex: i64,

    /// Packet-loss fraction; never exactly zero once derived.
    pub loss: f64,
    /// Congestion-signal fraction; never exactly zero once derived.
    pub loss2: f64,
    /// Out-of-order delivery fraction.
    pub order: f64,
    /// Mathis-style capacity estimate from `loss` (Mbps).
    pub bw: f64,
    /// Capacity estimate from `loss2` (Mbps).
    pub bw2: f64,
    /// Average round-trip time (ms).
    pub avgrtt: f64,
    /// Receiver-window-limited share of the send time.
    pub rwintime: f64,
    /// Congestion-window-limited share of the send time.
    pub cwndtime: f64,
    /// Sender-limited share of the send time.
    pub sendtime: f64,
    /// Fraction of the test spent in retransmission timeouts.
    pub idle: f64,
    /// Total instrumented send time (seconds).
    pub timesec: f64,
    /// Measured throughput over the instrumented time (Mbps).
    pub spd: f64,
}

fn nz(v: f64) -> f64 {
    if v == 0.0 {
        EPSILON
    } else {
        v
    }
}

/// Run the full diagnosis over one test's counters.
pub fn diagnose(c: &Web100Counters) -> Diagnosis {
    // ------------------------------------------------------------------
    // Derived ratios
    // ------------------------------------------------------------------
    let avgrtt = c.sum_rtt as f64 / nz(c.count_rtt as f64);
    let rttsec = avgrtt * 0.001;

    let mut loss =
        (c.pkts_retrans - c.fast_retrans) as f64 / nz((c.data_pkts_out - c.ack_pkts_out) as f64);
    if loss == 0.0 {
        loss = EPSILON;
    }
    let mut loss2 = c.congestion_signals as f64 / nz(c.pkts_out as f64);
    if loss2 == 0.0 {
        loss2 = EPSILON;
    }

    let order = c.dup_acks_in as f64 / nz(c.ack_pkts_in as f64);

    let bw = c.current_mss as f64 / (nz(rttsec) * loss.sqrt()) * 8.0 / 1024.0 / 1024.0;
    let bw2 = c.current_mss as f64 / (nz(rttsec) * loss2.sqrt()) * 8.0 / 1024.0 / 1024.0;

    let totaltime =
        (c.snd_lim_time_rwin + c.snd_lim_time_cwnd + c.snd_lim_time_sender) as f64;
    let rwintime = c.snd_lim_time_rwin as f64 / nz(totaltime);
    let cwndtime = c.snd_lim_time_cwnd as f64 / nz(totaltime);
    let sendtime = c.snd_lim_time_sender as f64 / nz(totaltime);
    let timesec = nz(totaltime / 1_000_000.0);

    let idle = (c.timeouts as f64 * (c.current_rto as f64 / 1000.0)) / timesec;

    let acks = c.ack_pkts_in as f64 / nz(c.data_pkts_out as f64);
    let (faster, slower) = if c.c2sspd > c.s2cspd {
        (c.c2sspd, c.s2cspd)
    } else {
        (c.s2cspd, c.c2sspd)
    };
    let aspeed = faster as f64 / nz(slower as f64);

    let retrn = c.pkts_retrans as f64 / nz(c.pkts_out as f64);
    let touts = c.timeouts as f64 / nz(c.pkts_out as f64);

    // Measured throughput: bytes over microseconds comes out in Mbps.
    let spd = c.data_bytes_out as f64 / nz(totaltime) * 8.0;

    // ------------------------------------------------------------------
    // Threshold rules, fixed order
    // ------------------------------------------------------------------
    let mut link = c.link;
    let mut mismatch2 = 0;
    let mut mismatch3 = 0;
    let mut bad_cable = 0;
    let mut congestion2 = 0;
    let mut half_duplex = 0;

    if (acks > ACK_RATIO_HIGH || acks < ACK_RATIO_LOW)
        && retrn > RETRANS_MIN
        && c.cong_avoid > c.slow_start
    {
        if 2 * c.current_mss == c.max_ssthresh {
            mismatch2 = 1;
        } else if aspeed > ASYMMETRY_MIN {
            mismatch2 = 2;
        }
    }

    if idle > IDLE_MIN && touts < TIMEOUT_RATIO_MAX {
        mismatch3 = if c.max_ssthresh == 2 * c.current_mss { 1 } else { 2 };
    }

    // A capacity estimate below the measured throughput means the
    // classification itself broke down; report the link as faulted.
    if bw < spd {
        log::debug!(
            "{}: capacity estimate {:.2} below measured {:.2} Mbps, link faulted",
            c.ip_addr,
            bw,
            spd
        );
        link = 0;
    }

    if (loss * 100.0) / timesec > CABLE_LOSS_RATE_MIN
        && cwndtime / timesec > CABLE_CWND_SHARE_MIN
        && loss < CABLE_LOSS_MAX
        && c.max_ssthresh > 0
    {
        bad_cable = 1;
    }

    if spd > ETHERNET_SPD_LO
        && spd < ETHERNET_SPD_HI
        && loss < ETHERNET_LOSS_MAX
        && order < ETHERNET_ORDER_MAX
        && link > 0
    {
        link = ETHERNET_LINK;
    }

    if c.snd_lim_time_sender < DSL_SENDER_TIME_MAX && spd < DSL_SPD_MAX && spd < bw && link > 0 {
        link = DSL_LINK;
    }

    if (rwintime > RWIN_SHARE_MIN
        && c.snd_lim_trans_rwin as f64 / timesec > TRANS_RATE_MIN
        && c.snd_lim_trans_sender as f64 / timesec > TRANS_RATE_MIN)
        || link <= HALF_DUPLEX_LINK_MAX
    {
        half_duplex = 1;
    }

    let recv_bdp = c.max_rwin_rcvd as f64 * 8.0 / nz(avgrtt) / 1000.0;
    let cwnd_bdp = c.current_cwnd as f64 * 8.0 / nz(avgrtt) / 1000.0;
    let send_bdp = c.snd_buf as f64 * 8.0 / nz(avgrtt) / 1000.0;
    log::debug!(
        "{}: bdp rwin={:.1} cwnd={:.1} sndbuf={:.1} kbit",
        c.ip_addr,
        recv_bdp,
        cwnd_bdp,
        send_bdp
    );
    if cwndtime > CONGESTION_CWND_SHARE_MIN && mismatch2 == 0 && cwnd_bdp < recv_bdp {
        congestion2 = 1;
    }

    Diagnosis {
        link,
        mismatch2,
        mismatch3,
        bad_cable,
        congestion2,
        half_duplex,
        loss,
        loss2,
        order,
        bw,
        bw2,
        avgrtt,
        rwintime,
        cwndtime,
        sendtime,
        idle,
        timesec,
        spd,
    }
}

// ============================================================================
// TESTS
// ============================================================================
