//! Line scanner and record accumulator
//!
//! Each test session spans several log lines: a header line naming the
//! client and port, four "spds" histogram lines, "Running" average lines,
//! optional capture-artifact lines, and one comma-separated counter line
//! that completes the record. The accumulator carries the session under
//! construction across lines; a record is emitted only when its counter
//! line lands.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::logic::snapshot::{
    DiagnosisRecord, HistogramSet, SnapArtifacts, Web100Counters, COUNTER_FIELDS, DIRECTIONS,
    REQUIRED_TOKENS,
};

/// Single-quoted payload of a histogram line.
static SPDS_PAYLOAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'([^']*)'").expect("histogram payload pattern"));

// ============================================================================
// ERRORS
// ============================================================================

/// Only total input unavailability is fatal to a parse.
#[derive(Debug)]
pub enum LogError {
    Io(std::io::Error),
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::Io(e) => write!(f, "cannot read log: {}", e),
        }
    }
}

impl std::error::Error for LogError {}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::Io(err)
    }
}

// ============================================================================
// ACCUMULATOR
// ============================================================================

/// Session under construction, mutable only while scanning.
#[derive(Debug, Default)]
struct PendingRecord {
    counters: Web100Counters,
    histograms: HistogramSet,
    artifacts: SnapArtifacts,
    /// Histogram lines consumed so far (direction index).
    spds_seen: usize,
    /// Running-average lines consumed so far.
    runave_seen: usize,
}

impl PendingRecord {
    fn new(date: &str, ip_addr: &str, port: i64) -> Self {
        let mut pending = PendingRecord::default();
        pending.counters.date = date.to_string();
        pending.counters.ip_addr = ip_addr.to_string();
        pending.counters.port = port;
        pending
    }
}

// ============================================================================
// PARSER
// ============================================================================

/// Lazy, single-pass record iterator over one log text.
pub struct LogParser<'a> {
    lines: std::str::Lines<'a>,
    pending: Option<PendingRecord>,
    cancel: Option<Arc<AtomicBool>>,
    emitted: usize,
    dropped: usize,
}

impl<'a> LogParser<'a> {
    pub fn new(text: &'a str) -> Self {
        LogParser {
            lines: text.lines(),
            pending: None,
            cancel: None,
            emitted: 0,
            dropped: 0,
        }
    }

    /// Parser that polls a cancellation flag between lines. Once the flag
    /// is set no further records are emitted; records already produced
    /// stay valid.
    pub fn with_cancel(text: &'a str, cancel: Arc<AtomicBool>) -> Self {
        let mut parser = LogParser::new(text);
        parser.cancel = Some(cancel);
        parser
    }

    /// Records emitted so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Records dropped so far (short counter lines, superseded sessions).
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Dispatch one line. Literal-match priority is fixed; the counter
    /// line is recognized last so that any quoted or labelled line with a
    /// stray comma cannot complete a record.
    fn handle_line(&mut self, line: &str) -> Option<DiagnosisRecord> {
        if line.starts_with("spds") {
            self.handle_spds(line);
        } else if line.starts_with("Running") {
            self.handle_running(line);
        } else if line.contains("port") {
            self.begin_record(line);
        } else if let Some(name) = line.strip_prefix("snaplog file:") {
            if let Some(p) = self.pending.as_mut() {
                p.artifacts.snaplog = Some(name.trim().to_string());
            }
        } else if let Some(name) = line.strip_prefix("c2s_snaplog file:") {
            if let Some(p) = self.pending.as_mut() {
                p.artifacts.c2s_snaplog = Some(name.trim().to_string());
            }
        } else if let Some(name) = line.strip_prefix("cputime trace file:") {
            if let Some(p) = self.pending.as_mut() {
                p.artifacts.cputime_trace = Some(name.trim().to_string());
            }
        } else if line.contains(',') && self.pending.is_some() {
            return self.complete_record(line);
        }
        None
    }

    /// Header line: "<timestamp> <ip> port <port>". Starts a new session;
    /// any session still pending was never completed and is dropped.
    fn begin_record(&mut self, line: &str) {
        if self.pending.is_some() {
            self.dropped += 1;
            log::debug!("discarding unfinished session before new header");
        }
        let idx = match line.find("port") {
            Some(i) => i,
            None => return,
        };
        let lead = line[..idx].trim_end();
        let port = line[idx + 4..].trim().parse::<i64>().unwrap_or(0);
        let (date, ip_addr) = match lead.rfind(' ') {
            Some(split) => (lead[..split].trim_end(), &lead[split + 1..]),
            None => ("", lead),
        };
        self.pending = Some(PendingRecord::new(date, ip_addr, port));
    }

    /// Histogram line: integer bins inside single quotes, terminated by a
    /// floating running average. The first non-integer token closes the
    /// direction; histograms are variable-length by design.
    fn handle_spds(&mut self, line: &str) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        if pending.spds_seen >= DIRECTIONS {
            log::debug!("extra histogram line ignored: {}", line);
            return;
        }
        let Some(caps) = SPDS_PAYLOAD.captures(line) else {
            return;
        };
        let dir = pending.spds_seen;
        for token in caps[1].split_whitespace() {
            match token.parse::<i64>() {
                Ok(bin) => pending.histograms.push_bin(dir, bin),
                Err(_) => {
                    if let Ok(avg) = token.parse::<f64>() {
                        pending.histograms.set_running_average(dir, avg);
                    }
                    break;
                }
            }
        }
        pending.spds_seen += 1;
    }

    /// Running-average line: the first parseable float from the third
    /// token onward.
    fn handle_running(&mut self, line: &str) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        if pending.runave_seen >= DIRECTIONS {
            return;
        }
        let dir = pending.runave_seen;
        if let Some(avg) = line
            .split_whitespace()
            .skip(2)
            .find_map(|t| t.parse::<f64>().ok())
        {
            pending.histograms.set_running_average(dir, avg);
            pending.runave_seen += 1;
        }
    }

    /// Counter line: completes the pending session. A line with too few
    /// tokens drops the whole record; a token that fails to parse ends the
    /// field scan silently but the record is still finalized with whatever
    /// was already set.
    fn complete_record(&mut self, line: &str) -> Option<DiagnosisRecord> {
        let mut pending = self.pending.take()?;
        let tokens: Vec<&str> = line.split(',').collect();
        if tokens.len() < REQUIRED_TOKENS {
            self.dropped += 1;
            log::warn!(
                "dropping {}: counter line has {} fields, needs {}",
                pending.counters.ip_addr,
                tokens.len(),
                REQUIRED_TOKENS
            );
            return None;
        }

        let peer = tokens[1].trim();
        if !peer.is_empty() && peer != pending.counters.ip_addr {
            log::debug!(
                "counter-line address {} differs from header {}",
                peer,
                pending.counters.ip_addr
            );
        }

        let mut clean = true;
        for (name, token) in COUNTER_FIELDS.iter().zip(&tokens[2..]) {
            match token.trim().parse::<i64>() {
                Ok(value) => {
                    pending.counters.apply_field(name, value);
                }
                Err(_) => {
                    clean = false;
                    break;
                }
            }
        }
        if clean {
            if let Some(v) = tokens
                .get(REQUIRED_TOKENS)
                .and_then(|t| t.trim().parse::<f64>().ok())
            {
                pending.counters.cpu_idle1 = v;
            }
            if let Some(v) = tokens
                .get(REQUIRED_TOKENS + 1)
                .and_then(|t| t.trim().parse::<f64>().ok())
            {
                pending.counters.cpu_idle2 = v;
            }
        }

        self.emitted += 1;
        Some(DiagnosisRecord::calculate(
            pending.counters,
            pending.histograms,
            pending.artifacts,
        ))
    }
}

impl<'a> Iterator for LogParser<'a> {
    type Item = DiagnosisRecord;

    fn next(&mut self) -> Option<DiagnosisRecord> {
        loop {
            if self.cancelled() {
                return None;
            }
            let line = self.lines.next()?;
            if let Some(record) = self.handle_line(line) {
                return Some(record);
            }
        }
    }
}

// ============================================================================
// CONVENIENCE ENTRY POINTS
// ============================================================================

/// Parse a full log text.
pub fn parse_str(text: &str) -> Vec<DiagnosisRecord> {
    let mut parser = LogParser::new(text);
    let mut records = Vec::new();
    while let Some(record) = parser.next() {
        records.push(record);
    }
    log::info!(
        "parsed {} records ({} dropped)",
        parser.emitted(),
        parser.dropped()
    );
    records
}

/// Parse a log file. Only the open/read failure surfaces as an error.
pub fn parse_file(path: &Path) -> Result<Vec<DiagnosisRecord>, LogError> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_str(&text))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::link::LinkType;
    use crate::logic::snapshot::{C2S_DATA, S2C_ACK};

    /// Counter line with every field present: 1..=50 positionally, plus
    /// the two CPU idle samples.
    fn full_counter_line(ip: &str) -> String {
        let fields: Vec<String> = (1..=50).map(|v| v.to_string()).collect();
        format!("x,{},{},90.5,88.25", ip, fields.join(","))
    }

    fn sample_log() -> String {
        let mut log = String::new();
        log.push_str("Mon Jan 12 14:02:11 2004 192.0.2.5 port 3001\n");
        log.push_str("snaplog file: /var/log/snap.1\n");
        log.push_str("spds bins '0 0 0 50 10 1 0 0 0 0 4.25'\n");
        log.push_str("spds bins '40 1 0 0 0 0 0 0 0 0 0.12'\n");
        log.push_str("spds bins '0 0 0 0 0 0 0 70 0 0 612.0'\n");
        log.push_str("spds bins '30 5 0 0 0 0 0 0 0 0 0.33'\n");
        log.push_str("Running average = 4.25\n");
        log.push_str(&full_counter_line("192.0.2.5"));
        log.push('\n');
        log
    }

    #[test]
    fn test_full_session_emits_one_record() {
        let records = parse_str(&sample_log());
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.counters.date, "Mon Jan 12 14:02:11 2004");
        assert_eq!(rec.counters.ip_addr, "192.0.2.5");
        assert_eq!(rec.counters.port, 3001);
        assert_eq!(rec.counters.s2c2spd, 1);
        assert_eq!(rec.counters.thru_bytes_acked, 50);
        assert_eq!(rec.counters.cpu_idle1, 90.5);
        assert_eq!(rec.counters.cpu_idle2, 88.25);
        assert_eq!(rec.artifacts.snaplog.as_deref(), Some("/var/log/snap.1"));
    }

    #[test]
    fn test_histograms_built_per_direction() {
        let records = parse_str(&sample_log());
        let hist = &records[0].histograms;
        assert_eq!(hist.bins(C2S_DATA), &[0, 0, 0, 50, 10, 1, 0, 0, 0, 0]);
        assert_eq!(hist.running_average(C2S_DATA), 4.25);
        assert_eq!(hist.linkcnt(C2S_DATA), 11);
        assert_eq!(hist.bins(S2C_ACK), &[30, 5, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_short_counter_line_drops_record() {
        let mut log = String::from("Mon Jan 12 14:02:11 2004 192.0.2.5 port 3001\n");
        let thirty: Vec<String> = (1..=30).map(|v| v.to_string()).collect();
        log.push_str(&format!("x,192.0.2.5,{}\n", thirty.join(",")));
        let records = parse_str(&log);
        assert!(records.is_empty());
    }

    #[test]
    fn test_mid_line_parse_failure_finalizes_partial_record() {
        let mut log = String::from("Mon Jan 12 14:02:11 2004 192.0.2.5 port 3001\n");
        let mut fields: Vec<String> = (1..=50).map(|v| v.to_string()).collect();
        fields[5] = "garbage".to_string(); // CountRTT position
        log.push_str(&format!("x,192.0.2.5,{}\n", fields.join(",")));
        let records = parse_str(&log);
        assert_eq!(records.len(), 1);
        // Fields before the bad token are set, the rest stay default.
        assert_eq!(records[0].counters.s2cspd, 2);
        assert_eq!(records[0].counters.count_rtt, 0);
        assert_eq!(records[0].counters.pkts_retrans, 0);
    }

    #[test]
    fn test_missing_cpu_idle_fields_tolerated() {
        let mut log = String::from("Mon Jan 12 14:02:11 2004 192.0.2.5 port 3001\n");
        let fields: Vec<String> = (1..=50).map(|v| v.to_string()).collect();
        log.push_str(&format!("x,192.0.2.5,{}\n", fields.join(",")));
        let records = parse_str(&log);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].counters.cpu_idle1, 0.0);
    }

    #[test]
    fn test_new_header_supersedes_unfinished_session() {
        let mut log = String::from("Mon Jan 12 14:02:11 2004 192.0.2.5 port 3001\n");
        log.push_str("spds bins '0 50 0 0 0 0 0 0 0 0 1.0'\n");
        log.push_str("Tue Jan 13 09:00:00 2004 198.51.100.9 port 3002\n");
        log.push_str(&full_counter_line("198.51.100.9"));
        log.push('\n');
        let records = parse_str(&log);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].counters.ip_addr, "198.51.100.9");
        // The superseded session's histogram did not leak.
        assert!(records[0].histograms.bins(C2S_DATA).is_empty());
    }

    #[test]
    fn test_counter_line_without_pending_session_ignored() {
        let log = full_counter_line("192.0.2.5");
        let records = parse_str(&log);
        assert!(records.is_empty());
    }

    #[test]
    fn test_malformed_lines_never_abort() {
        let mut log = String::new();
        log.push_str("completely unrelated noise\n");
        log.push_str("spds '???'\n");
        log.push_str(&sample_log());
        log.push_str("trailing junk , with a comma but no session\n");
        let records = parse_str(&log);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_classification_runs_before_emission() {
        let records = parse_str(&sample_log());
        let rec = &records[0];
        // Direction 0 peaks at bin 3 with 61 samples under the compact
        // capture table.
        assert_eq!(rec.c2sdata, 3);
        assert_eq!(rec.bottleneck, LinkType::T1);
        assert!(rec.loss > 0.0);
    }

    #[test]
    fn test_cancellation_stops_emission() {
        let mut log = String::new();
        for i in 0..4 {
            log.push_str(&format!("Mon Jan 12 14:02:11 2004 192.0.2.{} port 3001\n", i));
            log.push_str(&full_counter_line(&format!("192.0.2.{}", i)));
            log.push('\n');
        }
        let flag = Arc::new(AtomicBool::new(false));
        let mut parser = LogParser::with_cancel(&log, flag.clone());
        let first = parser.next();
        assert!(first.is_some());
        flag.store(true, Ordering::SeqCst);
        assert!(parser.next().is_none());
        // The record emitted before cancellation stays valid.
        assert_eq!(first.unwrap().counters.ip_addr, "192.0.2.0");
    }
}
