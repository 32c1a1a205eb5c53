//! Hillshade (shaded relief).
//!
//! Illumination of each cell by a distant light source, from the cell's
//! Horn slope and aspect.
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::grid::Grid;
use super::gradient::map_gradient;
use super::slope::slope_rad;

/// Light source for [`hillshade`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HillshadeParams {
    /// Light azimuth in degrees (0 = north, clockwise).
    pub azimuth: f64,
    /// Light altitude in degrees above the horizon, [0, 90].
    pub altitude: f64,
    /// Vertical exaggeration applied to the gradient.
    pub z_factor: f64,
}

impl Default for HillshadeParams {
    fn default() -> Self {
        Self {
            azimuth: 315.0,
            altitude: 45.0,
            z_factor: 1.0,
        }
    }
}

/// Illumination in [0, 1]:
/// `cos(zenith)·cos(slope) + sin(zenith)·sin(slope)·cos(azimuth − aspect)`,
/// clipped, with `zenith = 90° − altitude` and aspect the downhill bearing.
/// No-data windows give NaN.
pub fn hillshade(grid: &Grid, params: HillshadeParams) -> Result<Grid> {
    if !params.azimuth.is_finite() {
        return Err(Error::invalid("azimuth", params.azimuth, "must be finite"));
    }
    if !(0.0..=90.0).contains(&params.altitude) {
        return Err(Error::invalid("altitude", params.altitude, "must lie in [0, 90]"));
    }
    if !(params.z_factor.is_finite() && params.z_factor > 0.0) {
        return Err(Error::invalid("z_factor", params.z_factor, "must be finite and > 0"));
    }
    debug!(
        rows = grid.rows(),
        cols = grid.cols(),
        azimuth = params.azimuth,
        altitude = params.altitude,
        "hillshade"
    );

    let zenith = (90.0 - params.altitude).to_radians();
    let (sin_zenith, cos_zenith) = zenith.sin_cos();
    let azimuth = params.azimuth.to_radians();
    let z = params.z_factor;

    Ok(map_gradient(grid, |dz_dx, dz_dy| {
        let (dz_dx, dz_dy) = (dz_dx * z, dz_dy * z);
        let slope = slope_rad(dz_dx, dz_dy);
        // Downhill bearing; for flat cells sin(slope) = 0 so any value works.
        let aspect = (-dz_dx).atan2(-dz_dy);
        let shade = cos_zenith * slope.cos() + sin_zenith * slope.sin() * (azimuth - aspect).cos();
        shade.clamp(0.0, 1.0)
    }))
}
