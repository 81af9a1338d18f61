/// Processing configuration loader - parses adp.toml
///
/// Keeps deployment-specific knobs (quality thresholds, discharge-log
/// layout and column names, output location) out of the code, so a new
/// survey export can be handled without recompiling.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::AdpError;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "adp.toml";

/// Environment variable naming an alternate configuration file.
pub const CONFIG_ENV_VAR: &str = "ADP_CONFIG";

/// Root configuration structure for TOML parsing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdpConfig {
    pub quality: QualityConfig,
    pub discharge_log: DischargeLogConfig,
    pub normalization: NormalizationConfig,
    pub output: OutputConfig,
}

/// Thresholds for the two quality rules
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Bins with a quality flag strictly above this are masked.
    pub bin_flag_threshold: f64,
    /// Discharge-log rows are kept only when DQI is strictly below this.
    pub max_dqi_exclusive: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            bin_flag_threshold: 100.0,
            max_dqi_exclusive: 4.0,
        }
    }
}

/// Layout of the companion discharge-log export
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DischargeLogConfig {
    /// Metadata rows before the header row.
    pub leading_rows: usize,
    /// Summary rows after the last data row.
    pub footer_rows: usize,
    pub delimiter: char,
    pub columns: DischargeLogColumns,
}

impl Default for DischargeLogConfig {
    fn default() -> Self {
        Self {
            leading_rows: 5,
            footer_rows: 15,
            delimiter: ',',
            columns: DischargeLogColumns::default(),
        }
    }
}

/// Header names for each discharge-log field
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DischargeLogColumns {
    pub profile: String,
    pub date: String,
    pub time: String,
    pub dqi: String,
    pub latitude: String,
    pub longitude: String,
    pub avg_depth: String,
    pub flow_speed: String,
    pub flow_direction: String,
    pub discharge: String,
    pub vessel_speed: String,
    pub vessel_direction: String,
    pub area_depth: String,
    pub area_width: String,
}

impl Default for DischargeLogColumns {
    fn default() -> Self {
        Self {
            profile: "Profile".to_string(),
            date: "Date".to_string(),
            time: "Time".to_string(),
            dqi: "DQI".to_string(),
            latitude: "Lat(deg)".to_string(),
            longitude: "Long(deg)".to_string(),
            avg_depth: "AvDepth(m)".to_string(),
            flow_speed: "uFlow(m/s)".to_string(),
            flow_direction: "DirFlow(deg)".to_string(),
            discharge: "Q(m^3/s)".to_string(),
            vessel_speed: "uVess(m/s)".to_string(),
            vessel_direction: "DirVess(deg)".to_string(),
            area_depth: "Depth(m)".to_string(),
            area_width: "Width(m)".to_string(),
        }
    }
}

/// Normalization settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Overrides the sampling interval read from the raw header.
    pub sampling_interval_s: Option<f64>,
}

/// Where output files are written
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
        }
    }
}

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AdpConfig, AdpError> {
    let config: AdpConfig = toml::from_str(contents)
        .map_err(|e| AdpError::Config(e.to_string()))?;

    if !config.quality.bin_flag_threshold.is_finite() {
        return Err(AdpError::Config("quality.bin_flag_threshold must be finite".to_string()));
    }
    if let Some(dt) = config.normalization.sampling_interval_s {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(AdpError::Config(format!(
                "normalization.sampling_interval_s must be positive, got {}",
                dt
            )));
        }
    }

    Ok(config)
}

/// Loads configuration from a TOML file.
pub fn load_config_from<P: AsRef<Path>>(path: P) -> Result<AdpConfig, AdpError> {
    let contents = fs::read_to_string(path.as_ref()).map_err(|e| {
        AdpError::Config(format!("failed to read {}: {}", path.as_ref().display(), e))
    })?;
    parse_config(&contents)
}

/// Resolves the configuration path: `ADP_CONFIG` (a `.env` file is honored)
/// or `adp.toml` in the working directory.
pub fn config_path() -> PathBuf {
    dotenv::dotenv().ok();
    env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Loads configuration from the default location. A missing file yields the
/// built-in defaults; a malformed one is an error.
pub fn load_config() -> Result<AdpConfig, AdpError> {
    let path = config_path();
    if !path.exists() {
        return Ok(AdpConfig::default());
    }
    load_config_from(path)
}
