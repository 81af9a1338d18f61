/// Writers for the processed tables.
///
/// - per-bin tables as CSV, keyed by `profile_index` and `bin_depth` in the
///   first two columns, with missing values written as `NaN`;
/// - the gridded dataset as JSON, with missing cells written as `null`.
///
/// Parent directories are created as needed.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::analysis::grid::{GridVariable, GriddedDataset};
use crate::analysis::normalize::NormalizedRow;
use crate::model::{AdpError, Transect};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

const TRANSECT_HEADER: &str = "profile_index,bin_depth,timestamp,latitude,longitude,adp_heading,\
avg_depth,delta_distance_made_good,velocity_magnitude,water_direction,velocity_x,velocity_y,\
velocity_z,quality_flag,true_water_direction,cross_sectional_velocity,discharge_estimate";

const NORMALIZED_HEADER: &str = "profile_index,bin_depth,timestamp,latitude,longitude,adp_heading,\
avg_depth,delta_distance_made_good,velocity_magnitude,water_direction,velocity_x,velocity_y,\
velocity_z,quality_flag,true_water_direction,cross_sectional_velocity,discharge_estimate,\
data_quality_index,vessel_speed,vessel_direction,true_vessel_direction,normalized_velocity,\
normalized_discharge";

fn ensure_parent_dirs(path: &Path) -> Result<(), AdpError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Renders the enriched transect, one line per depth bin.
pub fn transect_csv(transect: &Transect) -> String {
    let mut output = format!("{}\n", TRANSECT_HEADER);
    for (p, b) in transect.iter_bins() {
        output += &format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            p.profile_index,
            b.bin_depth,
            p.timestamp.format(TIMESTAMP_FORMAT),
            p.latitude,
            p.longitude,
            p.adp_heading,
            p.avg_depth,
            p.delta_distance_made_good,
            b.velocity_magnitude,
            b.water_direction,
            b.velocity_x,
            b.velocity_y,
            b.velocity_z,
            b.quality_flag,
            b.true_water_direction,
            b.cross_sectional_velocity,
            b.discharge_estimate,
        );
    }
    output
}

/// Renders the normalized per-bin table.
pub fn bin_table_csv(rows: &[NormalizedRow]) -> String {
    let mut output = format!("{}\n", NORMALIZED_HEADER);
    for r in rows {
        output += &format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            r.profile_index,
            r.bin_depth,
            r.timestamp.format(TIMESTAMP_FORMAT),
            r.latitude,
            r.longitude,
            r.adp_heading,
            r.avg_depth,
            r.delta_distance_made_good,
            r.velocity_magnitude,
            r.water_direction,
            r.velocity_x,
            r.velocity_y,
            r.velocity_z,
            r.quality_flag,
            r.true_water_direction,
            r.cross_sectional_velocity,
            r.discharge_estimate,
            r.data_quality_index,
            r.vessel_speed,
            r.vessel_direction,
            r.true_vessel_direction,
            r.normalized_velocity,
            r.normalized_discharge,
        );
    }
    output
}

/// Writes the enriched (pre-merge) per-bin table.
pub fn write_transect_csv(transect: &Transect, path: &Path) -> Result<(), AdpError> {
    ensure_parent_dirs(path)?;
    fs::write(path, transect_csv(transect))?;
    Ok(())
}

/// Writes the normalized per-bin table.
pub fn write_bin_table_csv(rows: &[NormalizedRow], path: &Path) -> Result<(), AdpError> {
    ensure_parent_dirs(path)?;
    fs::write(path, bin_table_csv(rows))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GridDocument<'a> {
    profiles: &'a [u32],
    depths: &'a [f64],
    variables: BTreeMap<&'static str, Vec<Vec<Option<f64>>>>,
}

/// Renders the grid as pretty-printed JSON: `profiles`, `depths`, and a
/// `variables` object holding one profiles × depths array per variable.
pub fn grid_json(grid: &GriddedDataset) -> Result<String, AdpError> {
    let variables: BTreeMap<&'static str, Vec<Vec<Option<f64>>>> = GridVariable::ALL
        .iter()
        .map(|&variable| {
            let matrix: Vec<Vec<Option<f64>>> = grid
                .values(variable)
                .into_iter()
                .map(|row| row.into_iter().map(|v| if v.is_nan() { None } else { Some(v) }).collect())
                .collect();
            (variable.name(), matrix)
        })
        .collect();

    let document = GridDocument {
        profiles: grid.profiles(),
        depths: grid.depths(),
        variables,
    };
    let json = serde_json::to_string_pretty(&document).map_err(std::io::Error::from)?;
    Ok(json)
}

pub fn write_grid_json(grid: &GriddedDataset, path: &Path) -> Result<(), AdpError> {
    ensure_parent_dirs(path)?;
    fs::write(path, grid_json(grid)?)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
