/// Raw ADP transect (.T) file parser.
///
/// The raw dump is whitespace-delimited text made of fixed-length blocks,
/// one per profiling cycle. Each block has 6 header rows followed by one
/// row per depth bin:
///
/// ```text
/// row 0   Y M D h m s . . . . . heading      start time (block 0 only), ADP heading (col 11)
/// row 1   . . . . . . . . d1 d2 d3           depth triple (cols 8-10), averaged
/// row 2   . . . . dmg                        cumulative distance made good (col 4)
/// row 3   lat lon interval                   position, sampling interval in seconds
/// row 4   (unused)
/// row 5   nbins                              depth bins per block
/// row 6+  depth V dir Vx Vy Vz a1..a6 flag   one row per depth bin (13 columns)
/// ```
///
/// The block length is not fixed by the format: it is `nbins + 6`, read
/// from block 0, and every later block is sliced with it. XYZ-frame
/// exports only; ENU and BEAM exports use different header offsets.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::fs;
use std::path::Path;

use crate::model::{AdpError, DepthBin, Profile, Transect, BIN_COLUMNS, CM_PER_M, HEADER_ROWS};
use crate::quality;

// ---------------------------------------------------------------------------
// Header cell offsets (row within block, column)
// ---------------------------------------------------------------------------

const START_TIME_ROW: usize = 0;
const HEADING_CELL: (usize, usize) = (0, 11);
const DEPTH_TRIPLE_ROW: usize = 1;
const DEPTH_TRIPLE_COLS: [usize; 3] = [8, 9, 10];
const DISTANCE_CELL: (usize, usize) = (2, 4);
const LATITUDE_CELL: (usize, usize) = (3, 0);
const LONGITUDE_CELL: (usize, usize) = (3, 1);
const INTERVAL_CELL: (usize, usize) = (3, 2);
const BIN_COUNT_CELL: (usize, usize) = (5, 0);

// ---------------------------------------------------------------------------
// Format descriptor
// ---------------------------------------------------------------------------

/// Block layout of one raw file, read once from block 0 and validated
/// against the total row count before any slicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub bins_per_profile: usize,
    /// Rows per block: `bins_per_profile + HEADER_ROWS`.
    pub block_length: usize,
    pub profile_count: usize,
}

impl FormatDescriptor {
    /// Reads the bin count from block 0 and checks it against the number
    /// of non-blank rows in the file.
    ///
    /// # Errors
    /// - `MissingHeaderField`: the bin-count cell is absent or not numeric.
    /// - `FormatError`: the bin count is not a positive integer, the file
    ///   is shorter than one block, or the row count is not a whole number
    ///   of blocks.
    pub fn read(rows: &[Vec<&str>]) -> Result<Self, AdpError> {
        let raw = header_number(rows, 0, BIN_COUNT_CELL)?;
        let bins_per_profile = positive_count(raw).ok_or_else(|| {
            AdpError::FormatError(format!(
                "bin count at row {} must be a positive integer, got {}",
                BIN_COUNT_CELL.0, raw
            ))
        })?;

        // A declared count beyond the row count cannot fit, however large.
        let block_length = bins_per_profile
            .checked_add(HEADER_ROWS)
            .filter(|&len| len <= rows.len())
            .ok_or_else(|| {
                AdpError::FormatError(format!(
                    "file has {} rows, shorter than one declared block of {} bins plus {} header rows",
                    rows.len(),
                    raw,
                    HEADER_ROWS
                ))
            })?;
        if rows.len() % block_length != 0 {
            return Err(AdpError::FormatError(format!(
                "{} rows is not a whole number of {}-row blocks ({} left over)",
                rows.len(),
                block_length,
                rows.len() % block_length
            )));
        }

        Ok(FormatDescriptor {
            bins_per_profile,
            block_length,
            profile_count: rows.len() / block_length,
        })
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Splits raw text into whitespace-delimited rows, skipping blank lines.
fn tokenize(text: &str) -> Vec<Vec<&str>> {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .filter(|tokens| !tokens.is_empty())
        .collect()
}

fn positive_count(value: f64) -> Option<usize> {
    if value.is_finite() && value >= 1.0 && value.fract() == 0.0 {
        Some(value as usize)
    } else {
        None
    }
}

/// Reads a numeric header cell at `(row, column)` relative to `block_start`.
fn header_number(
    rows: &[Vec<&str>],
    block_start: usize,
    (row, column): (usize, usize),
) -> Result<f64, AdpError> {
    let row = block_start + row;
    let cell = header_text(rows, row, column)?;
    cell.parse::<f64>().map_err(|_| AdpError::MissingHeaderField {
        row,
        column,
        detail: format!("expected a number, found '{}'", cell),
    })
}

fn header_text<'a>(rows: &[Vec<&'a str>], row: usize, column: usize) -> Result<&'a str, AdpError> {
    rows.get(row)
        .and_then(|r| r.get(column))
        .copied()
        .ok_or_else(|| AdpError::MissingHeaderField {
            row,
            column,
            detail: "cell is absent".to_string(),
        })
}

/// Reads an integer header cell of block 0 into `T`, rejecting fractions
/// and values outside `T`'s range instead of truncating them.
fn header_integer<T: TryFrom<i64>>(rows: &[Vec<&str>], row: usize, column: usize) -> Result<T, AdpError> {
    let value = header_number(rows, 0, (row, column))?;
    let out_of_range = || AdpError::MissingHeaderField {
        row,
        column,
        detail: format!("expected an integer in range, found {}", value),
    };
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    if value.fract() != 0.0 || !value.is_finite() || value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(out_of_range());
    }
    T::try_from(value as i64).map_err(|_| out_of_range())
}

/// Assembles the first cycle's start time from the six integer cells of
/// block 0, row 0.
fn start_timestamp(rows: &[Vec<&str>]) -> Result<NaiveDateTime, AdpError> {
    let year: i32 = header_integer(rows, START_TIME_ROW, 0)?;
    let mut parts = [0u32; 5];
    for (offset, part) in parts.iter_mut().enumerate() {
        *part = header_integer(rows, START_TIME_ROW, offset + 1)?;
    }
    let [month, day, hour, minute, second] = parts;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or_else(|| {
            AdpError::FormatError(format!(
                "invalid start time {}-{}-{} {}:{}:{}",
                year, month, day, hour, minute, second
            ))
        })
}

/// Sampling interval in seconds. The cell is read as text and must be a
/// positive number.
fn sampling_interval(rows: &[Vec<&str>]) -> Result<f64, AdpError> {
    let (row, column) = INTERVAL_CELL;
    let cell = header_text(rows, row, column)?;
    match cell.parse::<f64>() {
        Ok(seconds) if seconds > 0.0 && seconds.is_finite() => Ok(seconds),
        _ => Err(AdpError::MissingHeaderField {
            row,
            column,
            detail: format!("sampling interval must be a positive number of seconds, found '{}'", cell),
        }),
    }
}

/// Offset of cycle `k` from the start time: `k × interval`. None when the
/// offset does not fit a `TimeDelta`.
fn cycle_offset(k: usize, interval_s: f64) -> Option<TimeDelta> {
    let ms = (k as f64 * interval_s * 1000.0).round();
    if !ms.is_finite() || ms.abs() >= i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(ms as i64)
}

/// Timestamp of cycle `k`, or `MissingHeaderField` on the interval cell
/// when the sequence runs past the representable time range.
fn cycle_timestamp(start: NaiveDateTime, k: usize, interval_s: f64) -> Result<NaiveDateTime, AdpError> {
    cycle_offset(k, interval_s)
        .and_then(|offset| start.checked_add_signed(offset))
        .ok_or_else(|| AdpError::MissingHeaderField {
            row: INTERVAL_CELL.0,
            column: INTERVAL_CELL.1,
            detail: format!(
                "sampling interval of {} s puts cycle {} beyond the representable time range",
                interval_s,
                k + 1
            ),
        })
}

fn bin_value(row: &[&str], row_idx: usize, column: usize) -> Result<f64, AdpError> {
    row[column].parse::<f64>().map_err(|_| {
        AdpError::FormatError(format!(
            "row {}, column {}: expected a number, found '{}'",
            row_idx, column, row[column]
        ))
    })
}

/// Parses one depth-bin row, converting velocities from cm/s to m/s.
fn parse_bin(row: &[&str], row_idx: usize) -> Result<DepthBin, AdpError> {
    if row.len() != BIN_COLUMNS {
        return Err(AdpError::FormatError(format!(
            "row {}: depth-bin rows have {} columns, found {}",
            row_idx,
            BIN_COLUMNS,
            row.len()
        )));
    }

    let mut values = [0.0f64; BIN_COLUMNS];
    for (column, value) in values.iter_mut().enumerate() {
        *value = bin_value(row, row_idx, column)?;
    }

    let bin_depth = values[0];
    if !bin_depth.is_finite() {
        return Err(AdpError::FormatError(format!(
            "row {}: bin depth must be finite, found {}",
            row_idx, bin_depth
        )));
    }

    let mut auxiliary = [0.0f64; 6];
    auxiliary.copy_from_slice(&values[6..12]);

    Ok(DepthBin::new(
        bin_depth,
        values[1] / CM_PER_M,
        values[2],
        [values[3] / CM_PER_M, values[4] / CM_PER_M, values[5] / CM_PER_M],
        auxiliary,
        values[12],
    ))
}

/// Parses raw transect text into a `Transect`, one `Profile` per block in
/// file order, with bad bins already masked.
///
/// # Arguments
/// * `text` - Raw .T file contents
/// * `flag_threshold` - Bins with a quality flag above this are masked
///
/// # Errors
/// - `FormatError`: block structure or a depth-bin value is invalid.
/// - `MissingHeaderField`: a required header cell is absent or not numeric.
pub fn parse_transect(text: &str, flag_threshold: f64) -> Result<Transect, AdpError> {
    let rows = tokenize(text);
    if rows.is_empty() {
        return Err(AdpError::FormatError("raw transect file is empty".to_string()));
    }

    let format = FormatDescriptor::read(&rows)?;
    let start = start_timestamp(&rows)?;
    let interval_s = sampling_interval(&rows)?;

    let mut profiles = Vec::with_capacity(format.profile_count);
    let mut previous_distance = None;

    for k in 0..format.profile_count {
        let block = k * format.block_length;

        let declared = header_number(&rows, block, BIN_COUNT_CELL)?;
        if positive_count(declared) != Some(format.bins_per_profile) {
            return Err(AdpError::FormatError(format!(
                "block {} declares {} bins but block 0 declared {}",
                k + 1,
                declared,
                format.bins_per_profile
            )));
        }

        let mut depth_sum = 0.0;
        for column in DEPTH_TRIPLE_COLS {
            depth_sum += header_number(&rows, block, (DEPTH_TRIPLE_ROW, column))?;
        }
        let avg_depth = depth_sum / DEPTH_TRIPLE_COLS.len() as f64;

        let distance = header_number(&rows, block, DISTANCE_CELL)?;
        let delta_distance_made_good = match previous_distance {
            Some(prev) => distance - prev,
            None => distance,
        };
        previous_distance = Some(distance);

        let mut bins = Vec::with_capacity(format.bins_per_profile);
        for row_idx in (block + HEADER_ROWS)..(block + format.block_length) {
            bins.push(parse_bin(&rows[row_idx], row_idx)?);
        }

        let mut profile = Profile {
            profile_index: (k + 1) as u32,
            timestamp: cycle_timestamp(start, k, interval_s)?,
            latitude: header_number(&rows, block, LATITUDE_CELL)?,
            longitude: header_number(&rows, block, LONGITUDE_CELL)?,
            adp_heading: header_number(&rows, block, HEADING_CELL)?,
            avg_depth,
            delta_distance_made_good,
            bins,
        };
        quality::mask_profile(&mut profile, flag_threshold);
        profiles.push(profile);
    }

    Ok(Transect::new(profiles, interval_s, format.bins_per_profile))
}

/// Reads and parses a raw transect file from disk.
pub fn read_transect<P: AsRef<Path>>(path: P, flag_threshold: f64) -> Result<Transect, AdpError> {
    let text = fs::read_to_string(path)?;
    parse_transect(&text, flag_threshold)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
