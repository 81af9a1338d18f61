/// Great-circle bearing and compass-direction helpers.
///
/// `initial_bearing` is the single bearing implementation in the crate; both
/// the transect bearing (from the raw profiles) and the discharge-log
/// bearing call it.

/// Initial great-circle bearing from point 1 to point 2, in degrees [0, 360).
///
/// Inputs are decimal degrees. Uses
///   θ = atan2(sin(Δlon)·cos(lat2), cos(lat1)·sin(lat2) − sin(lat1)·cos(lat2)·cos(Δlon))
/// and normalizes with `(degrees(θ) + 360) mod 360`.
pub fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let diff_lon = (lon2 - lon1).to_radians();

    let x = diff_lon.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * diff_lon.cos();

    let bearing = (x.atan2(y).to_degrees() + 360.0) % 360.0;
    // -0.0 and values rounding up to exactly 360 both belong at 0.
    if bearing >= 360.0 || bearing == 0.0 { 0.0 } else { bearing }
}

/// Adds an instrument heading to an instrument-relative direction and wraps
/// the sum back into [0, 360) with a single subtraction.
///
/// Only one wrap is applied: sums are expected in [0, 720). An input
/// outside that range comes back out of range rather than being folded,
/// so upstream data errors stay visible.
pub fn wrap_direction(heading: f64, relative: f64) -> f64 {
    let sum = heading + relative;
    if sum >= 360.0 { sum - 360.0 } else { sum }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
