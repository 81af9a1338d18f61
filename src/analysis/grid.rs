/// Profile × depth grid of the five per-bin variables.
///
/// The grid is addressed by the sorted unique profile numbers and the sorted
/// unique bin depths of the normalized table. Every (profile, depth) pair
/// without a source row holds NaN.

use std::collections::HashMap;

use crate::analysis::normalize::NormalizedRow;
use crate::model::AdpError;

/// The gridded variables, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridVariable {
    Velocity,
    CrossSectionalVelocity,
    DischargeEstimate,
    NormalizedVelocity,
    NormalizedDischarge,
}

impl GridVariable {
    pub const ALL: [GridVariable; 5] = [
        GridVariable::Velocity,
        GridVariable::CrossSectionalVelocity,
        GridVariable::DischargeEstimate,
        GridVariable::NormalizedVelocity,
        GridVariable::NormalizedDischarge,
    ];

    /// Short column name used in exports.
    pub fn name(self) -> &'static str {
        match self {
            GridVariable::Velocity => "V",
            GridVariable::CrossSectionalVelocity => "V_cs",
            GridVariable::DischargeEstimate => "Q_est",
            GridVariable::NormalizedVelocity => "Vn",
            GridVariable::NormalizedDischarge => "Qn",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// One addressable grid input: a (profile, depth) key and the five values
/// in `GridVariable::ALL` order.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub profile_index: u32,
    pub bin_depth: f64,
    pub values: [f64; 5],
}

impl From<&NormalizedRow> for GridRow {
    fn from(row: &NormalizedRow) -> Self {
        GridRow {
            profile_index: row.profile_index,
            bin_depth: row.bin_depth,
            values: [
                row.velocity_magnitude,
                row.cross_sectional_velocity,
                row.discharge_estimate,
                row.normalized_velocity,
                row.normalized_discharge,
            ],
        }
    }
}

/// Gridded dataset. Each variable is stored row-major as
/// `cells[variable][profile_pos * depths.len() + depth_pos]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GriddedDataset {
    profiles: Vec<u32>,
    depths: Vec<f64>,
    cells: [Vec<f64>; 5],
}

/// Folds -0.0 into 0.0 so both land on the same depth axis entry.
fn depth_key(depth: f64) -> f64 {
    if depth == 0.0 { 0.0 } else { depth }
}

impl GriddedDataset {
    /// Pivots `rows` into a grid.
    ///
    /// # Errors
    /// - `FormatError`: a row has a non-finite bin depth.
    /// - `DuplicateKey`: two rows share the same (profile, depth) address.
    pub fn assemble(rows: &[GridRow]) -> Result<Self, AdpError> {
        if let Some(bad) = rows.iter().find(|r| !r.bin_depth.is_finite()) {
            return Err(AdpError::FormatError(format!(
                "profile {}: bin depth {} cannot address a grid cell",
                bad.profile_index, bad.bin_depth
            )));
        }

        let mut profiles: Vec<u32> = rows.iter().map(|r| r.profile_index).collect();
        profiles.sort_unstable();
        profiles.dedup();

        let mut depths: Vec<f64> = rows.iter().map(|r| depth_key(r.bin_depth)).collect();
        depths.sort_by(|a, b| a.total_cmp(b));
        depths.dedup();

        let profile_pos: HashMap<u32, usize> =
            profiles.iter().enumerate().map(|(i, &p)| (p, i)).collect();
        let depth_pos: HashMap<u64, usize> =
            depths.iter().enumerate().map(|(i, d)| (d.to_bits(), i)).collect();

        let size = profiles.len() * depths.len();
        let mut cells: [Vec<f64>; 5] = std::array::from_fn(|_| vec![f64::NAN; size]);
        let mut filled = vec![false; size];

        for row in rows {
            let depth = depth_key(row.bin_depth);
            let idx = profile_pos[&row.profile_index] * depths.len() + depth_pos[&depth.to_bits()];
            if filled[idx] {
                return Err(AdpError::DuplicateKey {
                    profile_index: row.profile_index,
                    bin_depth: depth,
                });
            }
            filled[idx] = true;
            for (slot, value) in row.values.iter().enumerate() {
                cells[slot][idx] = *value;
            }
        }

        Ok(GriddedDataset { profiles, depths, cells })
    }

    /// Pivots the normalized per-bin table.
    pub fn from_normalized(rows: &[NormalizedRow]) -> Result<Self, AdpError> {
        let grid_rows: Vec<GridRow> = rows.iter().map(GridRow::from).collect();
        Self::assemble(&grid_rows)
    }

    /// Sorted unique profile numbers (grid rows).
    pub fn profiles(&self) -> &[u32] {
        &self.profiles
    }

    /// Sorted unique bin depths (grid columns).
    pub fn depths(&self) -> &[f64] {
        &self.depths
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Value at (profile, depth), or None when either axis lacks the key.
    pub fn get(&self, variable: GridVariable, profile_index: u32, bin_depth: f64) -> Option<f64> {
        let p = self.profiles.binary_search(&profile_index).ok()?;
        let key = depth_key(bin_depth);
        let d = self.depths.binary_search_by(|probe| probe.total_cmp(&key)).ok()?;
        Some(self.cells[variable.slot()][p * self.depths.len() + d])
    }

    /// One variable as a profiles × depths matrix.
    pub fn values(&self, variable: GridVariable) -> Vec<Vec<f64>> {
        let width = self.depths.len();
        if width == 0 {
            return vec![Vec::new(); self.profiles.len()];
        }
        self.cells[variable.slot()]
            .chunks(width)
            .map(|row| row.to_vec())
            .collect()
    }

    /// Flattens every cell back to rows, in profile then depth order.
    /// Re-assembling the result gives an identical grid.
    pub fn to_rows(&self) -> Vec<GridRow> {
        let width = self.depths.len();
        let mut rows = Vec::with_capacity(self.profiles.len() * width);
        for (p, &profile_index) in self.profiles.iter().enumerate() {
            for (d, &bin_depth) in self.depths.iter().enumerate() {
                let idx = p * width + d;
                rows.push(GridRow {
                    profile_index,
                    bin_depth,
                    values: std::array::from_fn(|slot| self.cells[slot][idx]),
                });
            }
        }
        rows
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
