/// End-to-end batch run over one raw transect and its discharge log.
///
/// Stage order: parse (masking included) → derived quantities → discharge
/// log → normalization → grid. Each run reads its inputs once and shares no
/// state with other runs, so repeating a run on the same files reproduces
/// the same output.

use std::fs;
use std::path::Path;

use crate::analysis::derived::compute_derived;
use crate::analysis::grid::GriddedDataset;
use crate::analysis::normalize::{normalize, NormalizedRow};
use crate::config::AdpConfig;
use crate::ingest::dis::DischargeLog;
use crate::ingest::tfile::parse_transect;
use crate::model::{AdpError, Transect};

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Parsed, masked and enriched transect.
    pub transect: Transect,
    /// DQI-filtered discharge log.
    pub discharge_log: DischargeLog,
    /// Joined per-bin table.
    pub normalized: Vec<NormalizedRow>,
    pub grid: GriddedDataset,
}

/// Sampling interval used for normalized discharge: the configured
/// override when present, otherwise the interval from the raw header.
pub fn effective_interval(transect: &Transect, config: &AdpConfig) -> f64 {
    config
        .normalization
        .sampling_interval_s
        .unwrap_or(transect.sampling_interval_s)
}

/// Runs every stage over in-memory file contents.
pub fn process(tfile_text: &str, dis_text: &str, config: &AdpConfig) -> Result<PipelineOutput, AdpError> {
    let mut transect = parse_transect(tfile_text, config.quality.bin_flag_threshold)?;
    compute_derived(&mut transect)?;

    let discharge_log = DischargeLog::parse(
        dis_text,
        &config.discharge_log,
        config.quality.max_dqi_exclusive,
    )?;

    let dt = effective_interval(&transect, config);
    let normalized = normalize(&transect, discharge_log.records(), dt)?;
    let grid = GriddedDataset::from_normalized(&normalized)?;

    Ok(PipelineOutput {
        transect,
        discharge_log,
        normalized,
        grid,
    })
}

/// Reads both input files and runs every stage.
///
/// # Errors
/// Any stage error aborts the run; nothing partial is returned.
pub fn run_pipeline<P: AsRef<Path>, Q: AsRef<Path>>(
    tfile: P,
    dis: Q,
    config: &AdpConfig,
) -> Result<PipelineOutput, AdpError> {
    let tfile_text = fs::read_to_string(tfile)?;
    let dis_text = fs::read_to_string(dis)?;
    process(&tfile_text, &dis_text, config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
