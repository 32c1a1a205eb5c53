/// Geographic → planar coordinate conversion (spherical Web Mercator).
/// All coordinate math uses f64 for precision.
use std::f64::consts::PI;

use crate::error::{Error, Result};

/// WGS84 semi-major axis used as the sphere radius (metres).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Half the projected world width: π · R (metres).
pub const ORIGIN_SHIFT: f64 = PI * EARTH_RADIUS_M;

/// A point in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLat {
    /// Longitude in degrees, -180 to +180.
    pub lng: f64,
    /// Latitude in degrees, -90 to +90.
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Project to Web-Mercator metres. At ±90° latitude y diverges (huge or infinite).
    pub fn to_meters(self) -> (f64, f64) {
        let x = self.lng * ORIGIN_SHIFT / 180.0;
        let y = ((90.0 + self.lat) * PI / 360.0).tan().ln() / (PI / 180.0);
        (x, y * ORIGIN_SHIFT / 180.0)
    }
}

/// Project parallel longitude/latitude sequences to Web-Mercator metres.
///
/// Returns `(xs, ys)` in input order. Fails with `ShapeMismatch` when the
/// sequences differ in length.
pub fn lnglat_to_meters(longitudes: &[f64], latitudes: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
    if longitudes.len() != latitudes.len() {
        return Err(Error::ShapeMismatch {
            expected: (longitudes.len(), 1),
            actual: (latitudes.len(), 1),
        });
    }
    Ok(longitudes
        .iter()
        .zip(latitudes)
        .map(|(&lng, &lat)| LngLat::new(lng, lat).to_meters())
        .unzip())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_maps_to_zero() {
        let (x, y) = LngLat::new(0.0, 0.0).to_meters();
        assert!(x.abs() < 1e-9 && y.abs() < 1e-6);
    }

    #[test]
    fn antimeridian_is_origin_shift() {
        let (x, _) = LngLat::new(180.0, 0.0).to_meters();
        assert!((x - 20_037_508.342_789_244).abs() < 1e-6);
        let (x, _) = LngLat::new(-180.0, 0.0).to_meters();
        assert!((x + 20_037_508.342_789_244).abs() < 1e-6);
    }

    #[test]
    fn mercator_square_limit() {
        // ±85.0511° is where the projected world becomes square.
        let (_, y) = LngLat::new(0.0, 85.051_128_779_806_59).to_meters();
        assert!((y - ORIGIN_SHIFT).abs() < 1e-3, "y = {y}");
    }

    #[test]
    fn poles_leave_the_projected_world() {
        // tan(π/2) is huge but finite in f64, so the north pole lands far
        // outside ±ORIGIN_SHIFT; the south pole hits ln(0).
        let (_, y) = LngLat::new(0.0, 90.0).to_meters();
        assert!(y > 10.0 * ORIGIN_SHIFT);
        let (_, y) = LngLat::new(0.0, -90.0).to_meters();
        assert!(y.is_infinite() && y < 0.0);
    }

    #[test]
    fn vectorized_matches_scalar_and_is_monotone() {
        let mut rng_state: u64 = 42;
        let mut lngs = Vec::new();
        let mut lats = Vec::new();
        for _ in 0..200 {
            // LCG for deterministic pseudo-random
            rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            lats.push((rng_state as f64 / u64::MAX as f64) * 170.0 - 85.0);
            rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            lngs.push((rng_state as f64 / u64::MAX as f64) * 360.0 - 180.0);
        }
        let (xs, ys) = lnglat_to_meters(&lngs, &lats).unwrap();
        for i in 0..lngs.len() {
            let (x, y) = LngLat::new(lngs[i], lats[i]).to_meters();
            assert_eq!(xs[i], x);
            assert_eq!(ys[i], y);
            assert_eq!(ys[i] > 0.0, lats[i] > 0.0);
        }
    }

    #[test]
    fn unequal_lengths_rejected() {
        let err = lnglat_to_meters(&[0.0, 1.0], &[0.0]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }
}
