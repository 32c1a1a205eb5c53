//! Iterative 3×3 mean smoothing with value masking.
use tracing::{debug, trace};

use crate::edge::neighbours_within;
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::parallel::*;

/// Smooth `grid` with `passes` rounds of an unweighted 3×3 mean.
///
/// Each pass replaces every cell that is neither no-data nor listed in
/// `excludes` with the mean of the in-grid, non-excluded, non-no-data cells
/// of its 3×3 block (itself included). Excluded and no-data cells keep their
/// value. Each pass reads only the previous pass's output.
pub fn mean(grid: &Grid, passes: usize, excludes: &[f64]) -> Result<Grid> {
    if passes < 1 {
        return Err(Error::invalid("passes", passes, "at least one pass is required"));
    }
    debug!(rows = grid.rows(), cols = grid.cols(), passes, excludes = excludes.len(), "mean filter");

    let mut current = grid.clone();
    for pass in 0..passes {
        current = mean_pass(&current, excludes);
        trace!(pass, "mean pass done");
    }
    Ok(current)
}

fn mean_pass(prev: &Grid, excludes: &[f64]) -> Grid {
    let (rows, cols) = prev.shape();
    let skip = |v: f64| prev.is_nodata(v) || excludes.contains(&v);

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|r| {
            (0..cols)
                .map(|c| {
                    let v = prev.get(r, c);
                    if skip(v) {
                        return v;
                    }
                    let (sum, n) = neighbours_within(r, c, rows, cols)
                        .map(|(nr, nc)| prev.get(nr, nc))
                        .filter(|&z| !skip(z))
                        .fold((0.0f64, 0usize), |(s, n), z| (s + z, n + 1));
                    sum / n as f64
                })
                .collect::<Vec<f64>>()
        })
        .collect();

    // Masked cells pass through unchanged, sentinel included.
    prev.like(data).with_nodata(prev.nodata())
}
