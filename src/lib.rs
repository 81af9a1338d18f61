/// adp_transect: ADP transect processing into a normalized discharge grid.
///
/// # Module structure
///
/// ```text
/// adp_transect
/// ├── model       — shared data types (Transect, Profile, DepthBin, DischargeLogRecord, AdpError)
/// ├── config      — processing configuration loader (adp.toml)
/// ├── geometry    — great-circle initial bearing, single-wrap direction sum
/// ├── quality     — bin flag masking and discharge-log DQI filter
/// ├── ingest
/// │   ├── tfile   — raw ADP transect (.T) block parser
/// │   ├── dis     — discharge log (.dis) reader, bearing and summary
/// │   └── fixtures (test only) — synthetic raw and discharge-log files
/// ├── analysis
/// │   ├── derived   — true water direction, cross-sectional velocity, discharge estimate
/// │   ├── normalize — discharge-log join and vessel-motion removal
/// │   └── grid      — profile × depth pivot of the five variables
/// ├── pipeline    — parse → derive → join → grid, as one batch run
/// └── export      — CSV and JSON writers
/// ```

/// Public modules
pub mod analysis;
pub mod config;
pub mod export;
pub mod geometry;
pub mod ingest;
pub mod model;
pub mod pipeline;
pub mod quality;
