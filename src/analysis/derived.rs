/// Derived quantities for a parsed transect.
///
/// For every depth bin, computes:
/// - true water direction: ADP heading + instrument-relative direction,
///   single-wrapped into [0, 360);
/// - cross-sectional velocity: the component of the water velocity normal
///   to the straight line between the first and last profile;
/// - discharge estimate: `avg_depth · dz · V_cs`.
///
/// The straight first-to-last line is only an approximation of the boat
/// path. `analysis::normalize` gives the motion-corrected values.

use crate::geometry::{initial_bearing, wrap_direction};
use crate::model::{AdpError, Transect};

/// Bin thickness taken from the first two bins of the whole table, as
/// flattened in profile order. It is not re-derived per profile, so
/// deployments whose bin spacing changes between profiles get the first
/// profile's spacing everywhere. NaN when the table has fewer than two bins.
pub fn table_bin_thickness(transect: &Transect) -> f64 {
    let mut bins = transect.iter_bins().map(|(_, b)| b.bin_depth);
    match (bins.next(), bins.next()) {
        (Some(first), Some(second)) => second - first,
        _ => f64::NAN,
    }
}

/// Enriches every bin of `transect` in place with true water direction,
/// cross-sectional velocity and discharge estimate.
///
/// The transect bearing and bin thickness are fixed on the first call;
/// later calls reuse them, so running this twice gives the same result.
///
/// # Errors
/// - `NoData`: the transect has no profiles.
pub fn compute_derived(transect: &mut Transect) -> Result<(), AdpError> {
    let (first, last) = match (transect.profiles.first(), transect.profiles.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(AdpError::NoData("transect has no profiles".to_string())),
    };

    let bearing = match transect.bearing {
        Some(b) => b,
        None => initial_bearing(first.latitude, first.longitude, last.latitude, last.longitude),
    };
    let dz = match transect.bin_thickness {
        Some(dz) => dz,
        None => table_bin_thickness(transect),
    };
    transect.bearing = Some(bearing);
    transect.bin_thickness = Some(dz);

    for profile in transect.profiles.iter_mut() {
        let heading = profile.adp_heading;
        let avg_depth = profile.avg_depth;
        for bin in profile.bins.iter_mut() {
            let twd = wrap_direction(heading, bin.water_direction);
            let v_cs = bin.velocity_magnitude * (bearing - twd).to_radians().sin();
            bin.true_water_direction = twd;
            bin.cross_sectional_velocity = v_cs;
            bin.discharge_estimate = avg_depth * dz * v_cs;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
