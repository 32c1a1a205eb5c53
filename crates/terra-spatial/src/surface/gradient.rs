//! Shared Horn (1981) 3×3 gradient helpers used by slope, aspect and hillshade.

use crate::edge::horn_window;
use crate::grid::Grid;
use crate::parallel::*;

/// Horn (1981) weighted 3×3 gradient of a window from [`horn_window`].
///
/// Returns `(dz_dx, dz_dy)` as rise/run, with x eastward and y northward.
///
/// 3×3 neighbourhood layout (row index grows northward):
/// ```text
///   NW w[2][0]  N w[2][1]  NE w[2][2]
///   W  w[1][0]  *          E  w[1][2]
///   SW w[0][0]  S w[0][1]  SE w[0][2]
/// ```
///
/// `dz/dx = ((NE + 2E + SE) − (NW + 2W + SW)) / (8 · cell_width)`
/// `dz/dy = ((NW + 2N + NE) − (SW + 2S + SE)) / (8 · cell_height)`
#[inline]
pub(crate) fn horn_gradient(w: &[[f64; 3]; 3], cell_width: f64, cell_height: f64) -> (f64, f64) {
    let (sw, s, se) = (w[0][0], w[0][1], w[0][2]);
    let (wst, est) = (w[1][0], w[1][2]);
    let (nw, n, ne) = (w[2][0], w[2][1], w[2][2]);

    let dz_dx = ((ne + 2.0 * est + se) - (nw + 2.0 * wst + sw)) / (8.0 * cell_width);
    let dz_dy = ((nw + 2.0 * n + ne) - (sw + 2.0 * s + se)) / (8.0 * cell_height);
    (dz_dx, dz_dy)
}

/// Apply `f(dz_dx, dz_dy)` at every cell, writing NaN where the replicated
/// window is unavailable (no-data in the window, or a 1-wide axis).
pub(crate) fn map_gradient<F>(grid: &Grid, f: F) -> Grid
where
    F: Fn(f64, f64) -> f64 + Sync,
{
    let (rows, cols) = grid.shape();
    let cw = grid.cell_width();
    let ch = grid.cell_height();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|r| {
            (0..cols)
                .map(|c| match horn_window(grid, r, c) {
                    Some(w) => {
                        let (dz_dx, dz_dy) = horn_gradient(&w, cw, ch);
                        f(dz_dx, dz_dy)
                    }
                    None => f64::NAN,
                })
                .collect::<Vec<f64>>()
        })
        .collect();

    grid.like(data)
}
