use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Parameters for fractal terrain synthesis.
///
/// Defaults give mostly low-lying land with about a third of the area at
/// sea level (0) and sparse peaks approaching `z_factor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainParams {
    /// Number of Perlin octaves (≥ 1).
    pub octaves: u32,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    /// Noise cycles of the first octave across the reference extent.
    pub base_frequency: f64,
    /// Normalized height in [0, 1) at and below which cells become 0.
    pub sea_level: f64,
    /// Power applied to the above-sea-level fraction; > 1 flattens lowlands.
    pub exponent: f64,
    /// Elevation of a normalized height of 1.
    pub z_factor: f64,
    /// Reference extent `(x_range, y_range)` the noise frequency is tied to.
    /// When set, tiles over sub-extents line up with one another; when None
    /// the grid's own extent is used.
    pub full_extent: Option<((f64, f64), (f64, f64))>,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            octaves: 6,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 4.0,
            sea_level: 0.45,
            exponent: 1.6,
            z_factor: 4000.0,
            full_extent: None,
        }
    }
}

impl TerrainParams {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.octaves == 0 {
            return Err(Error::invalid("octaves", self.octaves, "need at least one octave"));
        }
        for (name, v) in [
            ("lacunarity", self.lacunarity),
            ("persistence", self.persistence),
            ("base_frequency", self.base_frequency),
            ("exponent", self.exponent),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(Error::invalid(name, v, "must be finite and > 0"));
            }
        }
        if !(0.0..1.0).contains(&self.sea_level) {
            return Err(Error::invalid("sea_level", self.sea_level, "must lie in [0, 1)"));
        }
        if !self.z_factor.is_finite() {
            return Err(Error::invalid("z_factor", self.z_factor, "must be finite"));
        }
        if let Some(((x0, x1), (y0, y1))) = self.full_extent {
            if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite())
                || x1 <= x0
                || y1 <= y0
            {
                return Err(Error::invalid(
                    "full_extent",
                    format!("(({x0}, {x1}), ({y0}, {y1}))"),
                    "must be finite with max > min",
                ));
            }
        }
        Ok(())
    }

    /// Map a normalized fBm value in [0, 1] to an elevation.
    pub(crate) fn remap(&self, v: f64) -> f64 {
        if v <= self.sea_level {
            return 0.0;
        }
        let land = (v - self.sea_level) / (1.0 - self.sea_level);
        land.powf(self.exponent) * self.z_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(TerrainParams::default().validate().is_ok());
    }

    #[test]
    fn remap_is_monotone_with_flat_sea() {
        let p = TerrainParams::default();
        assert_eq!(p.remap(0.0), 0.0);
        assert_eq!(p.remap(p.sea_level), 0.0);
        assert!((p.remap(1.0) - p.z_factor).abs() < 1e-9);
        let mut prev = 0.0;
        for i in 0..=100 {
            let cur = p.remap(i as f64 / 100.0);
            assert!(cur >= prev, "remap should be non-decreasing");
            prev = cur;
        }
    }

    #[test]
    fn bad_values_rejected() {
        let mut p = TerrainParams { octaves: 0, ..TerrainParams::default() };
        assert!(p.validate().is_err());
        p = TerrainParams { sea_level: 1.0, ..TerrainParams::default() };
        assert!(p.validate().is_err());
        p = TerrainParams { full_extent: Some(((1.0, 0.0), (0.0, 1.0))), ..TerrainParams::default() };
        assert!(p.validate().is_err());
    }

    #[test]
    fn params_round_trip_through_json() {
        let p = TerrainParams { full_extent: Some(((0.0, 10.0), (-5.0, 5.0))), ..TerrainParams::default() };
        let back: TerrainParams = serde_json::from_str(&serde_json::to_string(&p).unwrap()).unwrap();
        assert_eq!(back, p);
    }
}
