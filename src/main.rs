//! ADP Transect Processor
//!
//! Processes one survey crossing:
//! 1. Parses the raw ADP transect dump and masks flagged bins
//! 2. Computes transect bearing, true water direction and cross-sectional discharge
//! 3. Joins the DQI-filtered discharge log and removes vessel motion
//! 4. Pivots the result into a profile × depth grid
//! 5. Writes transect.csv, normalized.csv and grid.json
//!
//! Usage:
//!   cargo run --release -- --tfile survey.T --dis survey.dis
//!   cargo run --release -- --tfile survey.T --dis survey.dis --config site.toml --out results/
//!
//! Environment:
//!   ADP_CONFIG - configuration file used when --config is not given (default: adp.toml)

use adp_transect::config::{config_path, load_config, load_config_from};
use adp_transect::export::{write_bin_table_csv, write_grid_json, write_transect_csv};
use adp_transect::pipeline::{effective_interval, run_pipeline};
use std::env;
use std::path::PathBuf;

fn usage(program: &str) -> String {
    format!(
        "Usage: {} --tfile PATH --dis PATH [--config PATH] [--out DIR]",
        program
    )
}

fn main() {
    println!("🌊 ADP Transect Processor");
    println!("=========================\n");

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut tfile: Option<PathBuf> = None;
    let mut dis: Option<PathBuf> = None;
    let mut config_file: Option<PathBuf> = None;
    let mut out_dir: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        let slot = match args[i].as_str() {
            "--tfile" => &mut tfile,
            "--dis" => &mut dis,
            "--config" => &mut config_file,
            "--out" => &mut out_dir,
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("{}", usage(&args[0]));
                std::process::exit(1);
            }
        };
        if i + 1 < args.len() {
            *slot = Some(PathBuf::from(&args[i + 1]));
            i += 2;
        } else {
            eprintln!("Error: {} requires a value", args[i]);
            std::process::exit(1);
        }
    }

    let (tfile, dis) = match (tfile, dis) {
        (Some(t), Some(d)) => (t, d),
        _ => {
            eprintln!("Error: --tfile and --dis are both required");
            eprintln!("{}", usage(&args[0]));
            std::process::exit(1);
        }
    };

    // Load configuration
    let config = match &config_file {
        Some(path) => {
            println!("⚙️  Loading configuration from {}", path.display());
            load_config_from(path)
        }
        None => {
            println!("⚙️  Loading configuration from {}", config_path().display());
            load_config()
        }
    };
    let config = config.unwrap_or_else(|e| {
        eprintln!("\n❌ {}\n", e);
        std::process::exit(1);
    });

    // Run every stage
    println!("📥 Reading {} and {}", tfile.display(), dis.display());
    let output = run_pipeline(&tfile, &dis, &config).unwrap_or_else(|e| {
        eprintln!("\n❌ Processing failed: {}\n", e);
        std::process::exit(1);
    });

    let transect = &output.transect;
    let masked = transect.iter_bins().filter(|(_, b)| b.is_masked()).count();
    println!("✓ Parsed {} profiles × {} bins", transect.profiles.len(), transect.bins_per_profile);
    println!("   Masked bins: {}", masked);
    if let Some(bearing) = transect.bearing() {
        println!("   Transect bearing: {:.2}°", bearing);
    }
    if let Some(dz) = transect.bin_thickness() {
        println!("   Bin thickness: {:.3} m", dz);
    }
    println!("   Sampling interval: {} s", effective_interval(transect, &config));
    println!(
        "✓ Discharge log: {} rows kept, {} dropped by DQI",
        output.discharge_log.len(),
        output.discharge_log.dropped_count()
    );
    println!("✓ Normalized rows: {}", output.normalized.len());
    println!(
        "✓ Grid: {} profiles × {} depths",
        output.grid.profiles().len(),
        output.grid.depths().len()
    );

    // Write outputs
    let out_dir = out_dir.unwrap_or_else(|| config.output.directory.clone());
    println!("\n💾 Writing results to {}", out_dir.display());
    let written = write_transect_csv(transect, &out_dir.join("transect.csv"))
        .and_then(|_| write_bin_table_csv(&output.normalized, &out_dir.join("normalized.csv")))
        .and_then(|_| write_grid_json(&output.grid, &out_dir.join("grid.json")));
    if let Err(e) = written {
        eprintln!("\n❌ Failed to write results: {}\n", e);
        std::process::exit(1);
    }
    println!("   ✓ transect.csv");
    println!("   ✓ normalized.csv");
    println!("   ✓ grid.json");
}
