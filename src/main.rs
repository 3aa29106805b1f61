//! Log analysis shell
//!
//! Development/ops entry point: run the engine over a server log (or an
//! archive database) and print the filtered diagnoses. The product UIs
//! link the library instead.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use netdiag_core::logic::{store, worker};
use netdiag_core::{CollectionFilter, DiagnosisRecord, FilterConfig};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut json = false;
    let mut archive = false;
    let mut path: Option<PathBuf> = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "--archive" => archive = true,
            _ => path = Some(PathBuf::from(arg)),
        }
    }
    let Some(path) = path else {
        eprintln!("usage: netdiag-core [--json] [--archive] <throughput-log | tests.db>");
        return ExitCode::from(2);
    };

    match run(&path, json, archive) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(path: &Path, json: bool, archive: bool) -> Result<(), Box<dyn std::error::Error>> {
    let records: Arc<Vec<DiagnosisRecord>> = if archive {
        Arc::new(store::load_from_path(path)?)
    } else {
        worker::reload(path)?;
        worker::results()
    };

    let config = FilterConfig::load_or_default(&FilterConfig::default_path());
    let mut view_filter = CollectionFilter::new(config);
    view_filter.on_collection_changed(&records);
    let view = view_filter.apply(&records);

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    for record in &view {
        print_record(record);
    }
    println!("{} of {} records shown", view.len(), records.len());
    summarize(&view);
    Ok(())
}

fn print_record(record: &DiagnosisRecord) {
    println!(
        "{} {}:{}  {}  c2s {} kbps / s2c {} kbps  rtt {:.1} ms  loss {:.5}",
        record.counters.date,
        record.counters.ip_addr,
        record.counters.port,
        record.bottleneck,
        record.counters.c2sspd,
        record.counters.s2cspd,
        record.avgrtt,
        record.loss
    );
    let mut flags = Vec::new();
    if record.mismatch2 != 0 {
        flags.push(format!("duplex mismatch ({})", record.mismatch2));
    }
    if record.bad_cable == 1 {
        flags.push("bad cable".to_string());
    }
    if record.congestion2 == 1 {
        flags.push("receiver congestion".to_string());
    }
    if record.half_duplex == 1 {
        flags.push("half duplex".to_string());
    }
    if !flags.is_empty() {
        println!("    flags: {}", flags.join(", "));
    }
}

fn summarize(view: &[DiagnosisRecord]) {
    let mismatch = view.iter().filter(|r| r.mismatch2 != 0).count();
    let cable = view.iter().filter(|r| r.bad_cable == 1).count();
    let congestion = view.iter().filter(|r| r.congestion2 == 1).count();
    println!(
        "summary: {} mismatch, {} bad cable, {} receiver congestion",
        mismatch, cable, congestion
    );
}
