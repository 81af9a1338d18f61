//! Discharge Log Summary
//!
//! Prints the summary of one or more discharge logs: start time, bearing,
//! max depth, mean flow, total discharge and cross-sectional area.
//! Rows failing the DQI rule are excluded before summarizing.
//!
//! Usage:
//!   cargo run --bin summarize_dis -- survey1.dis [survey2.dis ...]
//!
//! Environment:
//!   ADP_CONFIG - configuration file for the log layout (default: adp.toml)

use adp_transect::config::load_config;
use adp_transect::ingest::dis::DischargeLog;
use std::env;

fn main() {
    let paths: Vec<String> = env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("Usage: summarize_dis PATH [PATH ...]");
        std::process::exit(1);
    }

    let config = load_config().unwrap_or_else(|e| {
        eprintln!("\n❌ {}\n", e);
        std::process::exit(1);
    });

    println!("📋 Discharge Log Summary");
    println!("========================\n");

    let mut failures = 0;
    for path in &paths {
        let summary = DischargeLog::read(path, &config.discharge_log, config.quality.max_dqi_exclusive)
            .and_then(|log| log.summarize().map(|s| (log, s)));

        match summary {
            Ok((log, s)) => {
                println!("📊 {}", path);
                println!("─────────────────────────────────────────");
                println!("   Start:               {} {}", s.start_date, s.start_time);
                println!("   Profiles:            {} ({} dropped by DQI)", log.len(), log.dropped_count());
                println!("   Bearing:             {:.2}°", s.bearing);
                println!("   Max depth:           {:.2} m", s.max_depth);
                println!("   Mean flow speed:     {:.3} m/s", s.mean_flow_speed);
                println!("   Mean flow direction: {:.1}°", s.mean_flow_direction);
                println!("   Total discharge:     {:.3} m³/s", s.total_discharge);
                println!("   Total area:          {:.2} m²", s.total_area);
                println!();
            }
            Err(e) => {
                eprintln!("   ✗ {} - {}", path, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        eprintln!("\n⚠️  {} of {} files could not be summarized", failures, paths.len());
        std::process::exit(1);
    }
}
