//! Distance to the nearest target cell, plus the value of and bearing to it.
//!
//! Targets are the cells whose value is in `target_values`, or every non-zero
//! valid cell when no values are given. Distances are measured between cell
//! centres in world units (columns step by the cell width, rows by the cell
//! height).
mod transform;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::grid::Grid;
use transform::{nearest_targets, Nearest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    /// Sum of the horizontal and vertical offsets.
    Manhattan,
    /// Largest of the horizontal and vertical offsets.
    Chebyshev,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityParams {
    /// Values that mark a target cell. None targets every non-zero cell.
    pub target_values: Option<Vec<f64>>,
    pub metric: DistanceMetric,
    /// Cells farther than this from every target become no-data.
    pub max_distance: Option<f64>,
}

impl ProximityParams {
    pub fn targets(values: impl Into<Vec<f64>>) -> Self {
        Self { target_values: Some(values.into()), ..Self::default() }
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = Some(max_distance);
        self
    }

    fn validate(&self) -> Result<()> {
        if let Some(values) = &self.target_values {
            if values.is_empty() {
                return Err(Error::invalid("target_values", "[]", "at least one target value is required"));
            }
        }
        if let Some(d) = self.max_distance {
            if d.is_nan() || d < 0.0 {
                return Err(Error::invalid("max_distance", d, "must be non-negative"));
            }
        }
        Ok(())
    }
}

/// Distance from every cell to the nearest target.
///
/// Target cells are 0. With no targets in the grid every cell is NaN.
pub fn proximity(grid: &Grid, params: &ProximityParams) -> Result<Grid> {
    debug!(rows = grid.rows(), cols = grid.cols(), metric = ?params.metric, "proximity");
    resolve(grid, params, |dist, _, _| dist)
}

/// Value of the nearest target, for every cell.
pub fn allocation(grid: &Grid, params: &ProximityParams) -> Result<Grid> {
    debug!(rows = grid.rows(), cols = grid.cols(), metric = ?params.metric, "allocation");
    resolve(grid, params, |_, _, target| grid.data()[target])
}

/// Compass bearing in degrees from every cell to its nearest target.
///
/// Bearings lie in `(0, 360]` with 90 = east and 360 = north; target cells
/// themselves are 0.
pub fn direction(grid: &Grid, params: &ProximityParams) -> Result<Grid> {
    debug!(rows = grid.rows(), cols = grid.cols(), metric = ?params.metric, "direction");
    let cols = grid.cols();
    let (cw, ch) = (grid.cell_width(), grid.cell_height());
    resolve(grid, params, |_, cell, target| {
        if cell == target {
            return 0.0;
        }
        let dx = ((target % cols) as f64 - (cell % cols) as f64) * cw;
        let dy = ((target / cols) as f64 - (cell / cols) as f64) * ch;
        let bearing = dx.atan2(dy).to_degrees();
        if bearing <= 0.0 { bearing + 360.0 } else { bearing }
    })
}

/// Run the transform and map each reachable cell through `f(dist, cell, target)`.
/// Unreachable cells, and cells beyond `max_distance`, become NaN.
fn resolve<F>(grid: &Grid, params: &ProximityParams, f: F) -> Result<Grid>
where
    F: Fn(f64, usize, usize) -> f64,
{
    params.validate()?;
    let (rows, cols) = grid.shape();

    let is_target: Vec<bool> = grid
        .data()
        .iter()
        .map(|&v| {
            !grid.is_nodata(v)
                && match &params.target_values {
                    Some(values) => values.contains(&v),
                    None => v != 0.0,
                }
        })
        .collect();

    let n_targets = is_target.iter().filter(|&&t| t).count();
    trace!(n_targets, "targets located");
    if n_targets == 0 {
        return Ok(grid.like(vec![f64::NAN; rows * cols]));
    }

    let Nearest { dist, target } =
        nearest_targets(&is_target, rows, cols, grid.cell_width(), grid.cell_height(), params.metric);
    let limit = params.max_distance.unwrap_or(f64::INFINITY);

    let data = dist
        .iter()
        .zip(&target)
        .enumerate()
        .map(|(cell, (&d, &t))| if d.is_finite() && d <= limit { f(d, cell, t) } else { f64::NAN })
        .collect();
    Ok(grid.like(data))
}
