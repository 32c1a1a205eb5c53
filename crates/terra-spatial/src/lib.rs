//! Raster geoprocessing over regular planar grids.
//!
//! Every operator takes its input grids by reference and returns a new
//! [`Grid`] with the same extent, so operators compose freely:
//!
//! ```
//! use terra_spatial::{generate_terrain, hillshade, slope, HillshadeParams};
//!
//! let dem = generate_terrain(64, 64, (0.0, 6400.0), (0.0, 6400.0), 7)?;
//! let steepness = slope(&dem);
//! let shaded = hillshade(&dem, HillshadeParams::default())?;
//! assert_eq!(steepness.shape(), shaded.shape());
//! # Ok::<(), terra_spatial::Error>(())
//! ```
//!
//! No-data cells (NaN or the grid's sentinel) never contribute to a result;
//! operators write NaN where an output cell has no defined value.
//!
//! Enable the `threading` feature to fan rows, columns and rays out over rayon.
pub mod bump;
pub mod coords;
pub mod edge;
pub mod error;
pub mod grid;
pub mod ndvi;
pub mod noise;
pub(crate) mod parallel;
pub mod proximity;
pub mod smoothing;
pub mod surface;
pub mod viewshed;
pub mod zonal;

pub use bump::{bump, bump_like, constant_height, Location};
pub use coords::{lnglat_to_meters, LngLat};
pub use error::{Error, Result};
pub use grid::Grid;
pub use ndvi::{ndvi, ndwi, normalized_difference};
pub use noise::params::TerrainParams;
pub use noise::{generate_terrain, generate_terrain_with};
pub use proximity::{allocation, direction, proximity, DistanceMetric, ProximityParams};
pub use surface::{aspect, hillshade, slope, HillshadeParams, FLAT_ASPECT};
pub use viewshed::{viewshed, ViewshedParams};
pub use zonal::{default_stats, zonal_stats, Statistic, ZonalTable, ZoneRow};
