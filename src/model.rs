/// Core data types for ADP transect processing.
///
/// This module defines the shared domain model imported by all other modules:
/// the parsed transect hierarchy (Transect → Profile → DepthBin), the
/// companion discharge-log record, and the crate-wide error type. It holds
/// no I/O.

use chrono::NaiveDateTime;

// ---------------------------------------------------------------------------
// Raw format constants
// ---------------------------------------------------------------------------

/// Number of header rows at the top of every block, before the depth bins.
pub const HEADER_ROWS: usize = 6;

/// Number of whitespace-separated columns in a depth-bin row.
pub const BIN_COLUMNS: usize = 13;

/// Raw velocities are recorded in cm/s.
pub const CM_PER_M: f64 = 100.0;

// ---------------------------------------------------------------------------
// Transect types
// ---------------------------------------------------------------------------

/// One depth-cell reading within a profile.
///
/// Velocities are in m/s (converted from cm/s at parse time). Derived fields
/// start as NaN and are filled in by `analysis::derived`.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthBin {
    pub bin_depth: f64,             // m
    pub velocity_magnitude: f64,    // m/s
    pub water_direction: f64,       // deg, relative to instrument heading
    pub velocity_x: f64,
    pub velocity_y: f64,
    pub velocity_z: f64,
    pub auxiliary: [f64; 6],
    pub quality_flag: f64,

    pub true_water_direction: f64,      // deg, earth-referenced
    pub cross_sectional_velocity: f64,  // m/s
    pub discharge_estimate: f64,        // m^3/s
}

impl DepthBin {
    /// Builds a bin from already unit-converted values, with derived
    /// fields unset.
    pub fn new(
        bin_depth: f64,
        velocity_magnitude: f64,
        water_direction: f64,
        velocity: [f64; 3],
        auxiliary: [f64; 6],
        quality_flag: f64,
    ) -> Self {
        DepthBin {
            bin_depth,
            velocity_magnitude,
            water_direction,
            velocity_x: velocity[0],
            velocity_y: velocity[1],
            velocity_z: velocity[2],
            auxiliary,
            quality_flag,
            true_water_direction: f64::NAN,
            cross_sectional_velocity: f64::NAN,
            discharge_estimate: f64::NAN,
        }
    }

    /// Blanks every velocity-bearing field. Anything computed from this bin
    /// afterwards is NaN as well.
    pub fn mask(&mut self) {
        self.velocity_magnitude = f64::NAN;
        self.water_direction = f64::NAN;
        self.velocity_x = f64::NAN;
        self.velocity_y = f64::NAN;
        self.velocity_z = f64::NAN;
        self.true_water_direction = f64::NAN;
        self.cross_sectional_velocity = f64::NAN;
        self.discharge_estimate = f64::NAN;
    }

    pub fn is_masked(&self) -> bool {
        self.velocity_x.is_nan() && self.velocity_y.is_nan() && self.velocity_z.is_nan()
    }
}

/// One profiling cycle: header metadata plus its depth bins in block order.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub profile_index: u32,  // 1-based
    pub timestamp: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    pub adp_heading: f64,
    pub avg_depth: f64,
    /// Distance made good since the previous profile. For the first
    /// profile this is the raw cumulative value, not a delta.
    pub delta_distance_made_good: f64,
    pub bins: Vec<DepthBin>,
}

/// Ordered sequence of profiles from one raw transect file.
///
/// The transect bearing and the bin thickness are set once by
/// `analysis::derived` and never change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Transect {
    pub profiles: Vec<Profile>,
    /// Sampling interval from the raw header, in seconds.
    pub sampling_interval_s: f64,
    /// Depth bins per profile, as declared in the raw header.
    pub bins_per_profile: usize,
    pub(crate) bearing: Option<f64>,
    pub(crate) bin_thickness: Option<f64>,
}

impl Transect {
    pub fn new(profiles: Vec<Profile>, sampling_interval_s: f64, bins_per_profile: usize) -> Self {
        Transect {
            profiles,
            sampling_interval_s,
            bins_per_profile,
            bearing: None,
            bin_thickness: None,
        }
    }

    /// Transect bearing in degrees [0, 360), once derived quantities exist.
    pub fn bearing(&self) -> Option<f64> {
        self.bearing
    }

    /// Spacing between the first two bins of the whole table (dz), once
    /// derived quantities exist.
    pub fn bin_thickness(&self) -> Option<f64> {
        self.bin_thickness
    }

    pub fn bin_count(&self) -> usize {
        self.profiles.iter().map(|p| p.bins.len()).sum()
    }

    /// Iterates every bin in table order (profile order, then bin order).
    pub fn iter_bins(&self) -> impl Iterator<Item = (&Profile, &DepthBin)> {
        self.profiles
            .iter()
            .flat_map(|p| p.bins.iter().map(move |b| (p, b)))
    }
}

// ---------------------------------------------------------------------------
// Discharge log types
// ---------------------------------------------------------------------------

/// One row of the vessel-tracked discharge summary file.
#[derive(Debug, Clone, PartialEq)]
pub struct DischargeLogRecord {
    pub profile_index: u32,
    pub date: String,
    pub time: String,
    pub data_quality_index: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub avg_depth: f64,        // m
    pub flow_speed: f64,       // m/s
    pub flow_direction: f64,   // deg
    pub discharge: f64,        // m^3/s
    pub vessel_speed: f64,     // m/s
    pub vessel_direction: f64, // deg
    pub area_depth: f64,       // m
    pub area_width: f64,       // m
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that abort a processing run. There is no partial output: the
/// caller fixes the source file and re-runs.
#[derive(Debug)]
pub enum AdpError {
    /// Structural violation of the fixed-column / block-length schema.
    FormatError(String),
    /// A required header cell is absent or not numeric.
    MissingHeaderField { row: usize, column: usize, detail: String },
    /// Two per-bin rows share the same grid address.
    DuplicateKey { profile_index: u32, bin_depth: f64 },
    /// A table that needs at least one row is empty.
    NoData(String),
    /// The configuration file could not be parsed.
    Config(String),
    Io(std::io::Error),
}

impl std::fmt::Display for AdpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdpError::FormatError(msg) => write!(f, "Format error: {}", msg),
            AdpError::MissingHeaderField { row, column, detail } => {
                write!(f, "Missing header field at row {}, column {}: {}", row, column, detail)
            }
            AdpError::DuplicateKey { profile_index, bin_depth } => write!(
                f,
                "Duplicate grid key: profile {} at bin depth {} m",
                profile_index, bin_depth
            ),
            AdpError::NoData(msg) => write!(f, "No data: {}", msg),
            AdpError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AdpError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for AdpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AdpError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AdpError {
    fn from(e: std::io::Error) -> Self {
        AdpError::Io(e)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bin() -> DepthBin {
        DepthBin::new(1.5, 0.42, 180.0, [0.1, -0.2, 0.01], [0.0; 6], 20.0)
    }

    #[test]
    fn test_new_bin_has_unset_derived_fields() {
        let bin = sample_bin();
        assert!(bin.true_water_direction.is_nan());
        assert!(bin.cross_sectional_velocity.is_nan());
        assert!(bin.discharge_estimate.is_nan());
        assert!(!bin.is_masked());
    }

    #[test]
    fn test_mask_blanks_velocity_fields_but_keeps_depth_and_flag() {
        let mut bin = sample_bin();
        bin.mask();
        assert!(bin.is_masked());
        assert!(bin.velocity_magnitude.is_nan());
        assert!(bin.water_direction.is_nan());
        assert_eq!(bin.bin_depth, 1.5, "depth is an addressing field and must survive masking");
        assert_eq!(bin.quality_flag, 20.0);
    }

    #[test]
    fn test_error_display_includes_context() {
        let err = AdpError::DuplicateKey { profile_index: 7, bin_depth: 2.5 };
        let msg = err.to_string();
        assert!(msg.contains("profile 7"), "got: {}", msg);
        assert!(msg.contains("2.5"), "got: {}", msg);

        let err = AdpError::MissingHeaderField { row: 3, column: 2, detail: "empty".to_string() };
        assert!(err.to_string().contains("row 3, column 2"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AdpError = io.into();
        assert!(matches!(err, AdpError::Io(_)));
    }
}
