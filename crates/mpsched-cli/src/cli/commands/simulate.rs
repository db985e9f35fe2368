//! `mpsched simulate` – run the scheduler against simulated paths.

use anyhow::{Context, Result};
use mpsched_core::config::{self, MpschedConfig};
use mpsched_core::sim::{self, SimReport};
use std::path::Path;

fn print_report(report: &SimReport) {
    println!(
        "  {:>6}  {:>8}  {:>6}  {:>10}  {:>6}  {:>8}  {:>7}",
        "Path", "RTT(ms)", "Window", "Delivered", "Lost", "SendErr", "Share"
    );
    println!(
        "  {}  {}  {}  {}  {}  {}  {}",
        "------", "--------", "------", "----------", "------", "--------", "-------"
    );
    for s in &report.sessions {
        println!(
            "  {:>6}  {:>8}  {:>6}  {:>10}  {:>6}  {:>8}  {:>6.1}%",
            s.id,
            s.rtt_ms,
            s.window,
            s.delivered,
            s.lost,
            s.failed_sends,
            report.share(s.id) * 100.0
        );
    }
    println!();
    let status = if report.completed { "complete" } else { "incomplete" };
    println!(
        "{} of {} pieces delivered in {} ms ({})",
        report.delivered, report.piece_count, report.elapsed_ms, status
    );
    let st = &report.stats;
    println!(
        "global passes: {}, single passes: {}, losses: {}, send failures: {}, upstream requests: {}",
        st.global_passes, st.single_passes, st.losses_recorded, st.send_failures, st.replenish_requests
    );
}

fn load(path: Option<&Path>) -> Result<MpschedConfig> {
    match path {
        Some(p) => config::load_from_path(p),
        None => config::load_or_init(),
    }
}

pub async fn run_simulate(path: Option<&Path>, json: bool) -> Result<()> {
    let cfg = load(path)?;
    tracing::debug!("loaded config: {:?}", cfg);
    let report = tokio::task::spawn_blocking(move || {
        sim::run_simulation(&cfg.scheduler, &cfg.simulation)
    })
    .await
    .context("simulation task join")??;

    if json {
        let out = serde_json::to_string_pretty(&report).context("serialize report")?;
        println!("{}", out);
    } else {
        print_report(&report);
    }
    Ok(())
}
