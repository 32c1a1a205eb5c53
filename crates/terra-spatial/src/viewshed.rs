//! Line-of-sight visibility from a single observer.
//!
//! Rays are cast in index space from the observer's position. Each ray steps
//! half a cell at a time, samples the surface bilinearly and keeps the
//! steepest elevation gradient seen so far; a sample whose gradient reaches
//! that maximum marks its cell visible.
use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::parallel::*;

/// Radial and (at the farthest cell) angular sample spacing, in cells.
const STEP: f64 = 0.5;

/// Rays cast per parallel batch.
const RAY_BATCH: usize = 1024;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewshedParams {
    /// Observer position in the grid's coordinate space.
    pub x: f64,
    pub y: f64,
    /// Eye height above the ground at the observer.
    pub observer_elevation: f64,
    /// Height added to every target sample (e.g. a mast or a person).
    pub target_elevation: f64,
    /// Ray length limit in world units; cells beyond it stay not visible.
    pub max_distance: Option<f64>,
}

impl ViewshedParams {
    pub fn at(x: f64, y: f64) -> Self {
        Self { x, y, ..Self::default() }
    }

    pub fn with_observer_elevation(mut self, elevation: f64) -> Self {
        self.observer_elevation = elevation;
        self
    }

    pub fn with_target_elevation(mut self, elevation: f64) -> Self {
        self.target_elevation = elevation;
        self
    }

    pub fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = Some(max_distance);
        self
    }

    fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("x", self.x),
            ("y", self.y),
            ("observer_elevation", self.observer_elevation),
            ("target_elevation", self.target_elevation),
        ] {
            if !v.is_finite() {
                return Err(Error::invalid(name, v, "must be finite"));
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

/// Visibility grid: 1.0 where the surface can be seen from the observer,
/// 0.0 elsewhere. The observer's own cell is always 1.0.
///
/// Fails with `OutOfBounds` when the observer lies outside the grid extent
/// and `InvalidParameter` when it stands on a no-data cell.
pub fn viewshed(grid: &Grid, params: &ViewshedParams) -> Result<Grid> {
    params.validate()?;
    let (rows, cols) = grid.shape();
    let (orow, ocol) = grid.cell_of(params.x, params.y).ok_or(Error::OutOfBounds {
        x: params.x,
        y: params.y,
        x_range: grid.x_range(),
        y_range: grid.y_range(),
    })?;
    let ground = grid.get(orow, ocol);
    if grid.is_nodata(ground) {
        return Err(Error::invalid(
            "observer",
            format!("({}, {})", params.x, params.y),
            "observer stands on a no-data cell",
        ));
    }

    let eye = ground + params.observer_elevation;
    let origin = grid.index_position(params.x, params.y);
    let reach = farthest_centre(origin, rows, cols);
    let n_rays = ((TAU * reach / STEP).ceil() as usize).max(8);
    let n_steps = (reach / STEP).ceil() as usize;
    debug!(rows, cols, orow, ocol, eye, n_rays, n_steps, "viewshed");

    let ray = Ray {
        grid,
        origin,
        eye,
        target_elevation: params.target_elevation,
        max_distance: params.max_distance.unwrap_or(f64::INFINITY),
        n_steps,
    };
    // Rays are merged a batch at a time so only one batch of hit lists is live.
    let mut out = vec![0.0; rows * cols];
    let mut visible_hits = 0usize;
    for start in (0..n_rays).step_by(RAY_BATCH) {
        let hits: Vec<Vec<usize>> = (start..(start + RAY_BATCH).min(n_rays))
            .into_par_iter()
            .map(|k| ray.cast(TAU * k as f64 / n_rays as f64))
            .collect();
        for idx in hits.into_iter().flatten() {
            visible_hits += 1;
            out[idx] = 1.0;
        }
    }
    trace!(visible_hits, "rays cast");
    out[orow * cols + ocol] = 1.0;
    Ok(grid.like(out))
}

/// Index-space distance from `origin` to the farthest cell centre.
fn farthest_centre((fr, fc): (f64, f64), rows: usize, cols: usize) -> f64 {
    let (last_r, last_c) = ((rows - 1) as f64, (cols - 1) as f64);
    [(0.0, 0.0), (0.0, last_c), (last_r, 0.0), (last_r, last_c)]
        .iter()
        .map(|&(r, c)| (r - fr).hypot(c - fc))
        .fold(0.0, f64::max)
}

struct Ray<'a> {
    grid: &'a Grid,
    origin: (f64, f64),
    eye: f64,
    target_elevation: f64,
    max_distance: f64,
    n_steps: usize,
}

impl Ray<'_> {
    /// Flat indices of the cells this ray sees, walking outward at `angle`
    /// (radians, counter-clockwise from east in index space). A cell is
    /// listed once per run of samples that fall in it.
    fn cast(&self, angle: f64) -> Vec<usize> {
        let (rows, cols) = self.grid.shape();
        let (cw, ch) = (self.grid.cell_width(), self.grid.cell_height());
        let (dr, dc) = angle.sin_cos();
        let mut steepest = f64::NEG_INFINITY;
        let mut seen = Vec::new();

        for s in 1..=self.n_steps {
            let t = s as f64 * STEP;
            let fr = self.origin.0 + t * dr;
            let fc = self.origin.1 + t * dc;
            let (rr, rc) = (fr.round(), fc.round());
            if rr < 0.0 || rc < 0.0 || rr > (rows - 1) as f64 || rc > (cols - 1) as f64 {
                break;
            }
            let dist = (t * dr * ch).hypot(t * dc * cw);
            if dist > self.max_distance {
                break;
            }
            let z = self.grid.interpolate(fr, fc);
            if z.is_nan() {
                continue;
            }
            let idx = rr as usize * cols + rc as usize;
            if (z + self.target_elevation - self.eye) / dist >= steepest && seen.last() != Some(&idx) {
                seen.push(idx);
            }
            steepest = steepest.max((z - self.eye) / dist);
        }
        seen
    }
}
