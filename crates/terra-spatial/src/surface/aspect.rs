//! Aspect: compass bearing of steepest descent.
use tracing::debug;

use crate::grid::Grid;
use super::gradient::map_gradient;

/// Value written for cells with a zero gradient.
pub const FLAT_ASPECT: f64 = -1.0;

/// Aspect in degrees clockwise from north, [0, 360), pointing downhill.
///
/// Convention: the descent vector is `(−dz_dx, −dz_dy)` in (east, north), so
/// `aspect = atan2(−dz_dx, −dz_dy)` normalised to [0°, 360°). Cells with
/// `dz_dx == dz_dy == 0` get [`FLAT_ASPECT`]; no-data windows give NaN.
pub fn aspect(grid: &Grid) -> Grid {
    debug!(rows = grid.rows(), cols = grid.cols(), "aspect");
    map_gradient(grid, aspect_deg)
}

pub(crate) fn aspect_deg(dz_dx: f64, dz_dy: f64) -> f64 {
    if dz_dx == 0.0 && dz_dy == 0.0 {
        return FLAT_ASPECT;
    }
    let mut deg = (-dz_dx).atan2(-dz_dy).to_degrees();
    if deg < 0.0 {
        deg += 360.0;
    }
    if deg >= 360.0 { 0.0 } else { deg }
}
