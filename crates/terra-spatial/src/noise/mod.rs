pub mod fbm;
pub mod params;

use tracing::debug;

use crate::error::Result;
use crate::grid::Grid;
use crate::parallel::*;
use fbm::Fbm;
use params::TerrainParams;

/// Generate a synthetic elevation grid with default [`TerrainParams`].
pub fn generate_terrain(
    rows: usize,
    cols: usize,
    x_range: (f64, f64),
    y_range: (f64, f64),
    seed: u32,
) -> Result<Grid> {
    generate_terrain_with(&TerrainParams::default(), rows, cols, x_range, y_range, seed)
}

/// Generate a synthetic elevation grid.
///
/// Pipeline:
///   1. Map each cell centre into noise space: its offset within the
///      reference extent, scaled by `base_frequency` per axis.
///   2. Evaluate fBm (Perlin octaves seeded `seed`, `seed + 1`, ...).
///   3. Normalize: `v = 0.5 + fbm / amplitude_sum`, clamped to [0, 1].
///   4. Remap: sea below `sea_level`, power curve above, times `z_factor`.
///
/// Every step is a pure function of seed and coordinates, so the same inputs
/// always produce bit-identical grids regardless of threading.
pub fn generate_terrain_with(
    params: &TerrainParams,
    rows: usize,
    cols: usize,
    x_range: (f64, f64),
    y_range: (f64, f64),
    seed: u32,
) -> Result<Grid> {
    params.validate()?;
    let grid = Grid::filled(rows, cols, x_range, y_range, 0.0)?;
    debug!(rows, cols, seed, octaves = params.octaves, "generating terrain");

    let (ref_x, ref_y) = params.full_extent.unwrap_or((x_range, y_range));
    let fx = params.base_frequency / (ref_x.1 - ref_x.0);
    let fy = params.base_frequency / (ref_y.1 - ref_y.0);

    let fbm = Fbm::new(seed, params.octaves, params.lacunarity, params.persistence);
    let norm = fbm.amplitude_sum();
    let xs = grid.x_coords();
    let ys = grid.y_coords();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|r| {
            let ny = (ys[r] - ref_y.0) * fy;
            xs.iter()
                .map(|&x| {
                    let nx = (x - ref_x.0) * fx;
                    let v = (0.5 + fbm.sample(nx, ny) / norm).clamp(0.0, 1.0);
                    params.remap(v)
                })
                .collect::<Vec<f64>>()
        })
        .collect();

    Ok(grid.like(data))
}
