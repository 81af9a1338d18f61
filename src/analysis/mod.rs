/// Transect analysis, run in this order by `pipeline`:
///
/// - `derived`   — true water direction, cross-sectional velocity and
///   discharge estimate per bin; fixes the transect bearing and bin thickness.
/// - `normalize` — joins the transect with the discharge log and removes
///   vessel motion.
/// - `grid`      — pivots the normalized table into a profile × depth grid.

pub mod derived;
pub mod grid;
pub mod normalize;
