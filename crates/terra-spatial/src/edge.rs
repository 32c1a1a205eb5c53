//! Boundary policies shared by the neighbourhood operators.
//!
//! Two policies exist:
//! - [`replicate`] / [`horn_window`]: out-of-grid neighbours take the value of
//!   the nearest in-grid cell (slope, aspect, hillshade).
//! - [`neighbours_within`]: out-of-grid neighbours are absent (mean filter).
use crate::grid::Grid;

/// Clamp a possibly out-of-range index onto `0..len`.
#[inline]
pub fn replicate(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

/// 3×3 neighbourhood around `(row, col)` with edge replication, indexed
/// `[dr + 1][dc + 1]` where `dr = +1` is the northern (higher) row and
/// `dc = +1` is the eastern column.
///
/// Returns None when either grid dimension is 1 (there is no neighbour to
/// replicate from along that axis) or when any value in the window is
/// no-data.
pub fn horn_window(grid: &Grid, row: usize, col: usize) -> Option<[[f64; 3]; 3]> {
    let (rows, cols) = grid.shape();
    if rows < 2 || cols < 2 {
        return None;
    }
    let mut w = [[0.0f64; 3]; 3];
    for dr in -1isize..=1 {
        let r = replicate(row as isize + dr, rows);
        for dc in -1isize..=1 {
            let c = replicate(col as isize + dc, cols);
            let v = grid.get(r, c);
            if grid.is_nodata(v) {
                return None;
            }
            w[(dr + 1) as usize][(dc + 1) as usize] = v;
        }
    }
    Some(w)
}

/// In-grid cells of the 3×3 block centred on `(row, col)`, centre included.
/// Corners yield 4 cells, edges 6, interior cells 9.
pub fn neighbours_within(
    row: usize,
    col: usize,
    rows: usize,
    cols: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let r_lo = row.saturating_sub(1);
    let r_hi = (row + 1).min(rows - 1);
    let c_lo = col.saturating_sub(1);
    let c_hi = (col + 1).min(cols - 1);
    (r_lo..=r_hi).flat_map(move |r| (c_lo..=c_hi).map(move |c| (r, c)))
}
