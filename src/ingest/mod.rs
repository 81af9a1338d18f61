/// Readers for the two survey input files.
///
/// - `tfile` — raw ADP transect dump (.T): fixed-length blocks → `Transect`
/// - `dis`   — vessel-tracked discharge log (.dis CSV) → `DischargeLog`
/// - `fixtures` (test only) — small synthetic input files

pub mod dis;
pub mod tfile;

#[cfg(test)]
pub(crate) mod fixtures;
