//! Slope angle (Horn method).
//!
//! Computes slope in degrees at every cell using Horn's (1981) 3×3 weighted
//! finite difference. Boundary cells use edge replication.
use tracing::debug;

use crate::grid::Grid;
use super::gradient::map_gradient;

/// Slope in degrees, `atan(√(dz_dx² + dz_dy²))`, range [0, 90].
///
/// Gradients use the grid's own `cell_width` / `cell_height`, so elevation
/// units should match the extent units. No-data anywhere in a cell's 3×3
/// window gives NaN.
pub fn slope(grid: &Grid) -> Grid {
    debug!(rows = grid.rows(), cols = grid.cols(), "slope");
    map_gradient(grid, slope_deg)
}

#[inline]
pub(crate) fn slope_rad(dz_dx: f64, dz_dy: f64) -> f64 {
    dz_dx.hypot(dz_dy).atan()
}

fn slope_deg(dz_dx: f64, dz_dy: f64) -> f64 {
    slope_rad(dz_dx, dz_dy).to_degrees()
}
