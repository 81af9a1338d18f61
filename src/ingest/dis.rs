/// Vessel-tracked discharge log (.dis) reader.
///
/// The discharge log is a comma-delimited export with a fixed number of
/// metadata rows before the header and summary rows after the data. Each
/// data row summarizes one profile, keyed by the same 1-based profile
/// number as the raw transect.
///
/// Rows whose data quality index fails the DQI rule are removed as the file
/// is read; nothing downstream ever sees them.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::DischargeLogConfig;
use crate::geometry::initial_bearing;
use crate::model::{AdpError, DischargeLogRecord};
use crate::quality;

const DATE_FORMATS: [&str; 4] = ["%Y/%m/%d", "%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];
const TIME_FORMATS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// Filtered discharge-log table.
#[derive(Debug, Clone, PartialEq)]
pub struct DischargeLog {
    records: Vec<DischargeLogRecord>,
    dropped: usize,
}

/// Summary of one discharge log, as reported for a single transect.
#[derive(Debug, Clone, PartialEq)]
pub struct DischargeSummary {
    pub start_date: String,
    pub start_time: String,
    pub bearing: f64,
    pub max_depth: f64,
    pub mean_flow_speed: f64,
    pub mean_flow_direction: f64,
    pub total_discharge: f64,
    pub total_area: f64,
}

impl DischargeSummary {
    /// Start date and time combined, when both parse in a known format.
    pub fn start_datetime(&self) -> Option<NaiveDateTime> {
        let date = DATE_FORMATS
            .iter()
            .find_map(|f| NaiveDate::parse_from_str(self.start_date.trim(), f).ok())?;
        let time = TIME_FORMATS
            .iter()
            .find_map(|f| NaiveTime::parse_from_str(self.start_time.trim(), f).ok())?;
        Some(NaiveDateTime::new(date, time))
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Column positions resolved from the header row.
struct ColumnIndex<'a> {
    map: HashMap<&'a str, usize>,
}

impl<'a> ColumnIndex<'a> {
    fn new(header: &[&'a str]) -> Self {
        let mut map = HashMap::new();
        for (idx, &name) in header.iter().enumerate() {
            map.insert(name, idx);
        }
        ColumnIndex { map }
    }

    fn get(&self, name: &str) -> Result<usize, AdpError> {
        self.map.get(name).copied().ok_or_else(|| {
            AdpError::FormatError(format!("discharge log has no '{}' column", name))
        })
    }
}

/// Numeric cell; an empty cell reads as NaN.
fn number(fields: &[&str], column: usize, name: &str, line: usize) -> Result<f64, AdpError> {
    let cell = fields.get(column).copied().unwrap_or("");
    if cell.is_empty() {
        return Ok(f64::NAN);
    }
    cell.parse::<f64>().map_err(|_| {
        AdpError::FormatError(format!(
            "discharge log line {}: '{}' is not a number ('{}')",
            line, name, cell
        ))
    })
}

fn profile_number(fields: &[&str], column: usize, name: &str, line: usize) -> Result<u32, AdpError> {
    let value = number(fields, column, name, line)?;
    if value.is_finite() && value >= 1.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Ok(value as u32)
    } else {
        Err(AdpError::FormatError(format!(
            "discharge log line {}: profile number must be a positive integer, found {}",
            line, value
        )))
    }
}

impl DischargeLog {
    /// Parses discharge-log text and applies the DQI filter.
    ///
    /// # Arguments
    /// * `text` - Raw .dis export contents
    /// * `config` - Leading/footer row counts, delimiter and column names
    /// * `max_dqi_exclusive` - Rows with DQI at or above this are dropped
    ///
    /// # Errors
    /// - `FormatError`: header row missing, a configured column absent,
    ///   fewer rows than the footer, or a non-numeric cell.
    pub fn parse(
        text: &str,
        config: &DischargeLogConfig,
        max_dqi_exclusive: f64,
    ) -> Result<Self, AdpError> {
        let lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .collect();

        let (_, header_line) = lines.get(config.leading_rows).ok_or_else(|| {
            AdpError::FormatError(format!(
                "discharge log has no header row after {} metadata rows",
                config.leading_rows
            ))
        })?;
        let header: Vec<&str> = header_line.split(config.delimiter).map(str::trim).collect();
        let columns = ColumnIndex::new(&header);
        let names = &config.columns;

        let profile_col = columns.get(&names.profile)?;
        let date_col = columns.get(&names.date)?;
        let time_col = columns.get(&names.time)?;
        let dqi_col = columns.get(&names.dqi)?;
        let lat_col = columns.get(&names.latitude)?;
        let lon_col = columns.get(&names.longitude)?;
        let avg_depth_col = columns.get(&names.avg_depth)?;
        let flow_speed_col = columns.get(&names.flow_speed)?;
        let flow_dir_col = columns.get(&names.flow_direction)?;
        let discharge_col = columns.get(&names.discharge)?;
        let vess_speed_col = columns.get(&names.vessel_speed)?;
        let vess_dir_col = columns.get(&names.vessel_direction)?;
        let area_depth_col = columns.get(&names.area_depth)?;
        let area_width_col = columns.get(&names.area_width)?;

        let body = &lines[config.leading_rows + 1..];
        if body.len() < config.footer_rows {
            return Err(AdpError::FormatError(format!(
                "discharge log has {} rows after the header, fewer than the {} footer rows",
                body.len(),
                config.footer_rows
            )));
        }
        let data = &body[..body.len() - config.footer_rows];

        let mut records = Vec::with_capacity(data.len());
        for &(idx, line) in data {
            let line_no = idx + 1;
            let fields: Vec<&str> = line.split(config.delimiter).map(str::trim).collect();
            let text_cell = |column: usize| fields.get(column).copied().unwrap_or("").to_string();

            records.push(DischargeLogRecord {
                profile_index: profile_number(&fields, profile_col, &names.profile, line_no)?,
                date: text_cell(date_col),
                time: text_cell(time_col),
                data_quality_index: number(&fields, dqi_col, &names.dqi, line_no)?,
                latitude: number(&fields, lat_col, &names.latitude, line_no)?,
                longitude: number(&fields, lon_col, &names.longitude, line_no)?,
                avg_depth: number(&fields, avg_depth_col, &names.avg_depth, line_no)?,
                flow_speed: number(&fields, flow_speed_col, &names.flow_speed, line_no)?,
                flow_direction: number(&fields, flow_dir_col, &names.flow_direction, line_no)?,
                discharge: number(&fields, discharge_col, &names.discharge, line_no)?,
                vessel_speed: number(&fields, vess_speed_col, &names.vessel_speed, line_no)?,
                vessel_direction: number(&fields, vess_dir_col, &names.vessel_direction, line_no)?,
                area_depth: number(&fields, area_depth_col, &names.area_depth, line_no)?,
                area_width: number(&fields, area_width_col, &names.area_width, line_no)?,
            });
        }

        let (records, dropped) = quality::filter_discharge_log(records, max_dqi_exclusive);
        if dropped > 0 {
            eprintln!(
                "⚠️  Dropped {} discharge-log rows with DQI >= {}",
                dropped, max_dqi_exclusive
            );
        }

        Ok(DischargeLog { records, dropped })
    }

    /// Reads and parses a discharge-log file from disk.
    pub fn read<P: AsRef<Path>>(
        path: P,
        config: &DischargeLogConfig,
        max_dqi_exclusive: f64,
    ) -> Result<Self, AdpError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text, config, max_dqi_exclusive)
    }

    /// Wraps already-filtered records.
    pub fn from_records(records: Vec<DischargeLogRecord>) -> Self {
        DischargeLog { records, dropped: 0 }
    }

    /// Rows that passed the DQI filter, in file order.
    pub fn records(&self) -> &[DischargeLogRecord] {
        &self.records
    }

    /// Number of rows removed by the DQI filter.
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn first_and_last(&self) -> Result<(&DischargeLogRecord, &DischargeLogRecord), AdpError> {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => Ok((first, last)),
            _ => Err(AdpError::NoData(
                "discharge log has no rows after the DQI filter".to_string(),
            )),
        }
    }

    /// Values of one column with empty cells left out.
    fn present<'a>(
        &'a self,
        column: impl Fn(&DischargeLogRecord) -> f64 + 'a,
    ) -> impl Iterator<Item = f64> + 'a {
        self.records.iter().map(column).filter(|v| !v.is_nan())
    }

    /// Bearing from the first to the last retained position, in degrees
    /// [0, 360).
    pub fn bearing(&self) -> Result<f64, AdpError> {
        let (first, last) = self.first_and_last()?;
        Ok(initial_bearing(first.latitude, first.longitude, last.latitude, last.longitude))
    }

    /// Start date/time, bearing, max depth, mean flow speed and direction,
    /// total discharge, and total cross-sectional area.
    ///
    /// Area accumulates as `depth[0]·width[0] + Σ (depth[i] − depth[i−1])·width[i]`.
    /// Max, means and total skip empty (NaN) cells, and each mean divides by
    /// the count of values present. The area accumulation does not skip:
    /// one missing depth or width makes the area NaN.
    pub fn summarize(&self) -> Result<DischargeSummary, AdpError> {
        let (first, _) = self.first_and_last()?;

        let max_depth = self
            .present(|r| r.avg_depth)
            .fold(f64::NAN, f64::max);
        let mean_flow_speed = mean(self.present(|r| r.flow_speed));
        let mean_flow_direction = mean(self.present(|r| r.flow_direction));
        let total_discharge = self.present(|r| r.discharge).sum::<f64>();

        let mut total_area = first.area_depth * first.area_width;
        for pair in self.records.windows(2) {
            total_area += (pair[1].area_depth - pair[0].area_depth) * pair[1].area_width;
        }

        Ok(DischargeSummary {
            start_date: first.date.clone(),
            start_time: first.time.clone(),
            bearing: self.bearing()?,
            max_depth,
            mean_flow_speed,
            mean_flow_direction,
            total_discharge,
            total_area,
        })
    }
}

/// Arithmetic mean, NaN when there are no values.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { f64::NAN } else { sum / count as f64 }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
