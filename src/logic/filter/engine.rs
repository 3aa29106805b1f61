//! Result-collection filtering
//!
//! An in-memory multi-predicate view over the finished records: a per-client
//! include/exclude map plus the category predicates from the persisted
//! configuration. Rescanning a reloaded collection preserves any flags the
//! user already set.

use std::collections::HashMap;

use super::config::FilterConfig;
use super::types::SpeedCompare;
use crate::logic::snapshot::DiagnosisRecord;

/// Query layer the UI shell holds between reloads.
#[derive(Debug, Clone, Default)]
pub struct CollectionFilter {
    config: FilterConfig,
    /// Known client addresses and their include flags.
    ip_flags: HashMap<String, bool>,
    /// First-seen detected bottleneck code per client address.
    initial_codes: HashMap<String, i64>,
}

impl CollectionFilter {
    pub fn new(config: FilterConfig) -> Self {
        CollectionFilter {
            config,
            ip_flags: HashMap::new(),
            initial_codes: HashMap::new(),
        }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Category predicates are adjusted in place; address flags go through
    /// [`CollectionFilter::set_ip_included`] so the exclusion list stays in
    /// step.
    pub fn config_mut(&mut self) -> &mut FilterConfig {
        &mut self.config
    }

    /// Rebuild the known-address state for a fresh collection. Addresses
    /// seen before keep their include flag and their initial peak-speed
    /// baseline; new ones default to included unless the persisted
    /// exclusion list names them, with their first record setting the
    /// baseline.
    pub fn on_collection_changed(&mut self, records: &[DiagnosisRecord]) {
        let mut flags: HashMap<String, bool> = HashMap::new();
        let mut initial: HashMap<String, i64> = HashMap::new();
        for record in records {
            let ip = &record.counters.ip_addr;
            if flags.contains_key(ip) {
                continue;
            }
            let included = self
                .ip_flags
                .get(ip)
                .copied()
                .unwrap_or_else(|| !self.config.disabled.iter().any(|d| d == ip));
            flags.insert(ip.clone(), included);
            let baseline = self
                .initial_codes
                .get(ip)
                .copied()
                .unwrap_or(record.c2sdata);
            initial.insert(ip.clone(), baseline);
        }
        log::debug!("filter tracking {} client addresses", flags.len());
        self.ip_flags = flags;
        self.initial_codes = initial;
    }

    /// Unknown addresses count as included.
    pub fn is_ip_included(&self, ip: &str) -> bool {
        self.ip_flags.get(ip).copied().unwrap_or(true)
    }

    /// Toggle one client address and keep the persisted exclusion list in
    /// step; the caller re-serializes the configuration afterwards.
    pub fn set_ip_included(&mut self, ip: &str, included: bool) {
        self.ip_flags.insert(ip.to_string(), included);
        if included {
            self.config.disabled.retain(|d| d != ip);
        } else if !self.config.disabled.iter().any(|d| d == ip) {
            self.config.disabled.push(ip.to_string());
        }
    }

    /// Filtered view in original insertion order. Pure over the filter
    /// state: applying twice yields the same view.
    pub fn apply(&self, records: &[DiagnosisRecord]) -> Vec<DiagnosisRecord> {
        records
            .iter()
            .filter(|r| self.accepts(r))
            .cloned()
            .collect()
    }

    fn accepts(&self, record: &DiagnosisRecord) -> bool {
        if !self.is_ip_included(&record.counters.ip_addr) {
            return false;
        }
        self.config.mismatch.matches(record.mismatch2)
            && self.config.cable_fault.matches(record.bad_cable)
            && self.config.congestion.matches(record.counters.congestion)
            && self.config.duplex.matches(record.half_duplex)
            && self.config.new_congestion.matches(record.congestion2)
            && match self.config.initial_peak_speed {
                SpeedCompare::All => true,
                wanted => self.speed_state(record) == wanted,
            }
    }

    /// Compare a record's detected bottleneck code against the first one
    /// seen for its client. Sentinels on either side make the comparison
    /// moot; a client never rescanned compares against itself.
    fn speed_state(&self, record: &DiagnosisRecord) -> SpeedCompare {
        let baseline = self
            .initial_codes
            .get(&record.counters.ip_addr)
            .copied()
            .unwrap_or(record.c2sdata);
        if record.c2sdata < 0 || baseline < 0 {
            SpeedCompare::NotAvailable
        } else if record.c2sdata == baseline {
            SpeedCompare::Equal
        } else if record.c2sdata > baseline {
            SpeedCompare::Greater
        } else {
            SpeedCompare::Less
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
