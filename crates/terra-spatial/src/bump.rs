//! Bump mapping: random point features stamped onto a grid.
//!
//! Locations are drawn from a caller-owned RNG, so a seeded `StdRng` makes
//! placement reproducible. Heights come from a caller closure that sees the
//! whole batch at once (e.g. to keep bumps inside an elevation band).
use rand::Rng;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::grid::Grid;

/// Integer cell location of a bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub row: usize,
    pub col: usize,
}

/// Height function giving every location the same height.
pub fn constant_height(h: f64) -> impl FnOnce(&[Location]) -> Vec<f64> {
    move |locs| vec![h; locs.len()]
}

/// Place `count` bumps on an all-zero grid `cols` wide and `rows` tall, with
/// unit cells.
///
/// `height_fn` receives all drawn locations and must return one height per
/// location (`ShapeMismatch` otherwise). Zero heights place nothing. Each
/// bump adds `h · (1 − d / spread)` to every cell at cell distance
/// `d < spread` from its centre; `spread = 1` touches only the centre.
/// Overlapping bumps sum.
pub fn bump<R, F>(
    cols: usize,
    rows: usize,
    count: usize,
    spread: usize,
    rng: &mut R,
    height_fn: F,
) -> Result<Grid>
where
    R: Rng,
    F: FnOnce(&[Location]) -> Vec<f64>,
{
    let template = Grid::zeros(rows, cols)?;
    bump_like(&template, count, spread, rng, height_fn)
}

/// As [`bump`], with the output taking `template`'s shape and extent (its
/// values are ignored), so the bumps can be added onto that grid cell by cell.
pub fn bump_like<R, F>(
    template: &Grid,
    count: usize,
    spread: usize,
    rng: &mut R,
    height_fn: F,
) -> Result<Grid>
where
    R: Rng,
    F: FnOnce(&[Location]) -> Vec<f64>,
{
    if spread == 0 {
        return Err(Error::invalid("spread", spread, "must be at least 1"));
    }
    let (rows, cols) = template.shape();
    debug!(rows, cols, count, spread, "placing bumps");

    let locs: Vec<Location> = (0..count)
        .map(|_| Location {
            col: rng.gen_range(0..cols),
            row: rng.gen_range(0..rows),
        })
        .collect();

    let heights = height_fn(&locs);
    if heights.len() != locs.len() {
        return Err(Error::ShapeMismatch {
            expected: (locs.len(), 1),
            actual: (heights.len(), 1),
        });
    }
    if let Some(bad) = heights.iter().find(|h| !h.is_finite()) {
        return Err(Error::invalid("height", bad, "bump heights must be finite"));
    }

    let mut out = template.like(vec![0.0; rows * cols]);
    let mut placed = 0usize;
    for (loc, &h) in locs.iter().zip(&heights) {
        if h == 0.0 {
            continue;
        }
        stamp(&mut out, *loc, h, spread);
        placed += 1;
    }
    trace!(placed, skipped = count - placed, "bumps stamped");

    Ok(out)
}

/// Add a linearly decaying radial kernel of height `h` centred on `loc`.
fn stamp(out: &mut Grid, loc: Location, h: f64, spread: usize) {
    let (rows, cols) = out.shape();
    let radius = spread - 1;
    let s = spread as f64;
    let r_lo = loc.row.saturating_sub(radius);
    let r_hi = (loc.row + radius).min(rows - 1);
    let c_lo = loc.col.saturating_sub(radius);
    let c_hi = (loc.col + radius).min(cols - 1);

    for r in r_lo..=r_hi {
        for c in c_lo..=c_hi {
            let dr = r as f64 - loc.row as f64;
            let dc = c as f64 - loc.col as f64;
            let d = dr.hypot(dc);
            if d < s {
                let v = out.get(r, c) + h * (1.0 - d / s);
                out.set(r, c, v);
            }
        }
    }
}
