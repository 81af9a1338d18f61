/// Vessel-motion normalization.
///
/// Joins the enriched transect with the filtered discharge log on profile
/// number and removes the survey vessel's own motion from each bin's
/// measured velocity:
///
/// ```text
/// TVD   = heading + vessel_direction        (single wrap)
/// theta = TVD − TWD
/// Qn    = V · vessel_speed · sin(theta) · dt · dz
/// Vn    = V · cos(theta + 90°)
/// ```
///
/// `dz` is the bin thickness fixed by `analysis::derived`; it is never
/// recomputed here.

use chrono::NaiveDateTime;
use std::collections::{HashMap, HashSet};

use crate::geometry::wrap_direction;
use crate::model::{AdpError, DepthBin, DischargeLogRecord, Profile, Transect};

/// One joined per-bin row: profile context, the enriched bin, the matching
/// discharge-log vessel motion, and the normalized quantities.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub profile_index: u32,
    pub bin_depth: f64,
    pub timestamp: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    pub adp_heading: f64,
    pub avg_depth: f64,
    pub delta_distance_made_good: f64,

    pub velocity_magnitude: f64,
    pub water_direction: f64,
    pub velocity_x: f64,
    pub velocity_y: f64,
    pub velocity_z: f64,
    pub quality_flag: f64,
    pub true_water_direction: f64,
    pub cross_sectional_velocity: f64,
    pub discharge_estimate: f64,

    pub data_quality_index: f64,
    pub vessel_speed: f64,     // m/s
    pub vessel_direction: f64, // deg, relative to instrument heading
    pub true_vessel_direction: f64,
    pub normalized_velocity: f64,  // m/s
    pub normalized_discharge: f64, // m^3/s
}

impl NormalizedRow {
    fn join(
        profile: &Profile,
        bin: &DepthBin,
        record: &DischargeLogRecord,
        dt: f64,
        dz: f64,
    ) -> Self {
        let tvd = wrap_direction(profile.adp_heading, record.vessel_direction);
        let theta = tvd - bin.true_water_direction;
        let v = bin.velocity_magnitude;

        NormalizedRow {
            profile_index: profile.profile_index,
            bin_depth: bin.bin_depth,
            timestamp: profile.timestamp,
            latitude: profile.latitude,
            longitude: profile.longitude,
            adp_heading: profile.adp_heading,
            avg_depth: profile.avg_depth,
            delta_distance_made_good: profile.delta_distance_made_good,
            velocity_magnitude: v,
            water_direction: bin.water_direction,
            velocity_x: bin.velocity_x,
            velocity_y: bin.velocity_y,
            velocity_z: bin.velocity_z,
            quality_flag: bin.quality_flag,
            true_water_direction: bin.true_water_direction,
            cross_sectional_velocity: bin.cross_sectional_velocity,
            discharge_estimate: bin.discharge_estimate,
            data_quality_index: record.data_quality_index,
            vessel_speed: record.vessel_speed,
            vessel_direction: record.vessel_direction,
            true_vessel_direction: tvd,
            normalized_velocity: v * (theta + 90.0).to_radians().cos(),
            normalized_discharge: v * record.vessel_speed * theta.to_radians().sin() * dt * dz,
        }
    }
}

/// Inner-joins every bin of `transect` with the discharge-log rows of the
/// same profile number and computes normalized velocity and discharge.
///
/// Profiles missing from either side produce no rows. A profile number
/// that appears more than once in the log yields one row per match.
///
/// # Arguments
/// * `transect` - Transect already enriched by `compute_derived`
/// * `records` - DQI-filtered discharge-log rows
/// * `dt` - Sampling interval in seconds
///
/// # Errors
/// - `NoData`: derived quantities have not been computed, so there is no
///   bin thickness to use.
pub fn normalize(
    transect: &Transect,
    records: &[DischargeLogRecord],
    dt: f64,
) -> Result<Vec<NormalizedRow>, AdpError> {
    let dz = transect.bin_thickness().ok_or_else(|| {
        AdpError::NoData("bin thickness is unset; compute derived quantities first".to_string())
    })?;

    let mut by_profile: HashMap<u32, Vec<&DischargeLogRecord>> = HashMap::new();
    for record in records {
        by_profile.entry(record.profile_index).or_default().push(record);
    }

    let mut rows = Vec::new();
    for profile in &transect.profiles {
        let Some(matches) = by_profile.get(&profile.profile_index) else {
            continue;
        };
        for bin in &profile.bins {
            for record in matches {
                rows.push(NormalizedRow::join(profile, bin, record, dt, dz));
            }
        }
    }

    let known: HashSet<u32> = transect.profiles.iter().map(|p| p.profile_index).collect();
    let unmatched = by_profile.keys().filter(|k| !known.contains(k)).count();
    if unmatched > 0 {
        eprintln!(
            "⚠️  {} discharge-log profile(s) have no matching transect profile",
            unmatched
        );
    }

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::derived::compute_derived;
    use crate::config::DischargeLogConfig;
    use crate::ingest::dis::DischargeLog;
    use crate::ingest::fixtures::*;
    use crate::ingest::tfile::parse_transect;

    fn enriched(text: &str) -> Transect {
        let mut transect = parse_transect(text, 100.0).expect("fixture should parse");
        compute_derived(&mut transect).expect("derived quantities should compute");
        transect
    }

    fn log(text: &str) -> DischargeLog {
        DischargeLog::parse(text, &DischargeLogConfig::default(), 4.0).expect("log should parse")
    }

    #[test]
    fn test_inner_join_keeps_only_matched_profiles() {
        let transect = enriched(fixture_two_profile_tfile());
        let log = log(fixture_moving_vessel_log());
        let rows = normalize(&transect, log.records(), 2.0).unwrap();

        // Only profile 2 is in the log: 1 profile × 3 bins.
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.profile_index == 2), "profile 1 must be dropped");
    }

    #[test]
    fn test_dqi_dropped_profile_never_joins() {
        let transect = enriched(fixture_two_profile_tfile());
        let log = log(fixture_discharge_log());
        let rows = normalize(&transect, log.records(), 2.0).unwrap();
        assert_eq!(rows.len(), 6, "profiles 1 and 2 × 3 bins; profile 3 was dropped");
        assert!(rows.iter().all(|r| r.data_quality_index < 4.0));
    }

    #[test]
    fn test_zero_vessel_motion() {
        let transect = enriched(fixture_two_profile_tfile());
        let log = log(fixture_discharge_log());
        let rows = normalize(&transect, log.records(), 2.0).unwrap();

        for row in &rows {
            // TVD = 90 + 0, TWD = 90, theta = 0.
            assert_eq!(row.true_vessel_direction, 90.0);
            assert_eq!(row.normalized_discharge, 0.0, "vessel_speed 0 ⇒ Qn = 0");
            let expected = row.velocity_magnitude * 90f64.to_radians().cos();
            assert!(
                (row.normalized_velocity - expected).abs() < 1e-12,
                "Vn = V·cos(90°), got {}",
                row.normalized_velocity
            );
            assert!(row.cross_sectional_velocity.abs() < 1e-12);
        }
    }

    #[test]
    fn test_moving_vessel_perpendicular_to_flow() {
        let transect = enriched(fixture_two_profile_tfile());
        let log = log(fixture_moving_vessel_log());
        let rows = normalize(&transect, log.records(), 2.0).unwrap();

        for row in &rows {
            // TVD = 90 + 90 = 180, theta = 90: Qn = V·1·1·dt(2)·dz(1), Vn = V·cos(180°).
            assert_eq!(row.true_vessel_direction, 180.0);
            assert!((row.normalized_discharge - 2.0 * row.velocity_magnitude).abs() < 1e-12);
            assert!((row.normalized_velocity + row.velocity_magnitude).abs() < 1e-12);
        }
        assert!((rows[0].velocity_magnitude - 0.22).abs() < 1e-12);
    }

    #[test]
    fn test_flagged_bin_is_nan_through_normalization() {
        let transect = enriched(fixture_flagged_tfile());
        let log = log(fixture_discharge_log());
        let rows = normalize(&transect, log.records(), 2.0).unwrap();

        let masked = rows
            .iter()
            .find(|r| r.profile_index == 1 && r.bin_depth == 1.5)
            .expect("flag 150 row present");
        assert!(masked.velocity_x.is_nan());
        assert!(masked.cross_sectional_velocity.is_nan());
        assert!(masked.discharge_estimate.is_nan());
        assert!(masked.normalized_velocity.is_nan());
        assert!(masked.normalized_discharge.is_nan());

        let sibling = rows
            .iter()
            .find(|r| r.profile_index == 1 && r.bin_depth == 2.5)
            .expect("flag 50 row present");
        assert!(sibling.normalized_velocity.is_finite());
        assert!(sibling.normalized_discharge.is_finite());
    }

    #[test]
    fn test_true_vessel_direction_wraps_the_vessel_sum() {
        // Heading 90 + vessel 300 = 390 → 30, while the water sum stays 90.
        let transect = enriched(fixture_two_profile_tfile());
        let text = fixture_moving_vessel_log().replace(",1.0,90.0,3.0,2.0", ",1.0,300.0,3.0,2.0");
        let log = log(&text);
        let rows = normalize(&transect, log.records(), 2.0).unwrap();
        for row in &rows {
            assert!((row.true_vessel_direction - 30.0).abs() < 1e-9, "got {}", row.true_vessel_direction);
            assert!((0.0..360.0).contains(&row.true_vessel_direction));
        }
    }

    #[test]
    fn test_duplicate_log_profile_yields_one_row_per_match() {
        let transect = enriched(fixture_two_profile_tfile());
        let mut records = log(fixture_moving_vessel_log()).records().to_vec();
        records.push(records[0].clone());
        let rows = normalize(&transect, &records, 2.0).unwrap();
        assert_eq!(rows.len(), 6);
    }

    #[test]
    fn test_log_profiles_outside_transect_are_ignored() {
        let transect = enriched(fixture_two_profile_tfile());
        let mut records = log(fixture_discharge_log()).records().to_vec();
        records[0].profile_index = 42;
        let rows = normalize(&transect, &records, 2.0).unwrap();
        assert_eq!(rows.len(), 3, "only profile 2 still joins");
    }

    #[test]
    fn test_requires_derived_quantities() {
        let transect = parse_transect(fixture_two_profile_tfile(), 100.0).unwrap();
        let log = log(fixture_discharge_log());
        assert!(matches!(
            normalize(&transect, log.records(), 2.0),
            Err(AdpError::NoData(_))
        ));
    }
}
