/// Quality rules applied before any derived quantity is computed.
///
/// Two independent, threshold-based rules:
/// - depth bins whose quality flag exceeds the threshold have their
///   velocity fields blanked to NaN (the first bin of each profile is not
///   evaluated);
/// - discharge-log rows are kept only when their data quality index is
///   below the limit.
///
/// Both are irreversible: masked values and dropped rows are gone for the
/// rest of the run.

use crate::model::{DischargeLogRecord, Profile, Transect};

// ---------------------------------------------------------------------------
// Depth-bin masking
// ---------------------------------------------------------------------------

/// Masks every bin after the first whose `quality_flag` is strictly above
/// `threshold`. Returns the number of bins over the threshold.
///
/// The first bin of a profile is never evaluated. This exemption has no
/// known physical basis and may be a defect in the source processing
/// convention; it is kept because downstream datasets depend on it.
pub fn mask_profile(profile: &mut Profile, threshold: f64) -> usize {
    let mut flagged = 0;
    for bin in profile.bins.iter_mut().skip(1) {
        if bin.quality_flag > threshold {
            bin.mask();
            flagged += 1;
        }
    }
    flagged
}

/// Applies `mask_profile` to every profile. Re-applying to an already
/// masked transect changes nothing.
pub fn mask_transect(transect: &mut Transect, threshold: f64) -> usize {
    transect
        .profiles
        .iter_mut()
        .map(|p| mask_profile(p, threshold))
        .sum()
}

// ---------------------------------------------------------------------------
// Discharge-log filtering
// ---------------------------------------------------------------------------

/// True when the row's DQI is strictly below `max_dqi_exclusive`. A missing
/// (NaN) DQI never passes.
pub fn passes_dqi(record: &DischargeLogRecord, max_dqi_exclusive: f64) -> bool {
    record.data_quality_index < max_dqi_exclusive
}

/// Splits off the rows that fail the DQI rule. Returns the kept rows, in
/// their original order, and the number dropped.
pub fn filter_discharge_log(
    records: Vec<DischargeLogRecord>,
    max_dqi_exclusive: f64,
) -> (Vec<DischargeLogRecord>, usize) {
    let total = records.len();
    let kept: Vec<DischargeLogRecord> = records
        .into_iter()
        .filter(|r| passes_dqi(r, max_dqi_exclusive))
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
