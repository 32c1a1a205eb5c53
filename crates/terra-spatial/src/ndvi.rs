//! Normalized-difference spectral indices.
use tracing::debug;

use crate::error::Result;
use crate::grid::Grid;
use crate::parallel::*;

/// Generic normalized difference `(a − b) / (a + b)`.
///
/// Both grids must share a shape (`ShapeMismatch` otherwise). A zero sum or
/// a no-data input gives NaN at that cell. The output keeps `a`'s extent.
pub fn normalized_difference(a: &Grid, b: &Grid) -> Result<Grid> {
    a.check_same_shape(b)?;
    let (rows, cols) = a.shape();
    debug!(rows, cols, "normalized difference");

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|r| {
            (0..cols)
                .map(|c| {
                    let va = a.get(r, c);
                    let vb = b.get(r, c);
                    if a.is_nodata(va) || b.is_nodata(vb) {
                        return f64::NAN;
                    }
                    let sum = va + vb;
                    if sum == 0.0 { f64::NAN } else { (va - vb) / sum }
                })
                .collect::<Vec<f64>>()
        })
        .collect();

    Ok(a.like(data))
}

/// Normalized Difference Vegetation Index: `(NIR − Red) / (NIR + Red)`.
pub fn ndvi(nir: &Grid, red: &Grid) -> Result<Grid> {
    normalized_difference(nir, red)
}

/// Normalized Difference Water Index (McFeeters): `(Green − NIR) / (Green + NIR)`.
pub fn ndwi(green: &Grid, nir: &Grid) -> Result<Grid> {
    normalized_difference(green, nir)
}
