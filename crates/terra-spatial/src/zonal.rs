//! Per-zone summary statistics.
//!
//! A zone grid labels cells with positive integer IDs; 0, negative values and
//! no-data are unzoned. For every zone present, the valid cells of a value
//! grid are reduced by each requested [`Statistic`].
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::parallel::*;

/// User reduction over a zone's valid values. Never called with an empty slice.
pub type Reducer = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

#[derive(Clone)]
pub enum Statistic {
    Mean,
    Max,
    Min,
    Sum,
    /// Population standard deviation.
    Std,
    Count,
    Custom(String, Reducer),
}

impl Statistic {
    pub fn custom(name: impl Into<String>, f: impl Fn(&[f64]) -> f64 + Send + Sync + 'static) -> Self {
        Statistic::Custom(name.into(), Arc::new(f))
    }

    pub fn name(&self) -> &str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Max => "max",
            Statistic::Min => "min",
            Statistic::Sum => "sum",
            Statistic::Std => "std",
            Statistic::Count => "count",
            Statistic::Custom(name, _) => name.as_str(),
        }
    }

    /// Reduce a zone's values. An empty zone has count 0 and NaN otherwise.
    fn reduce(&self, values: &[f64]) -> f64 {
        if let Statistic::Count = self {
            return values.len() as f64;
        }
        if values.is_empty() {
            return f64::NAN;
        }
        let n = values.len() as f64;
        match self {
            Statistic::Mean => values.iter().sum::<f64>() / n,
            Statistic::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Statistic::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Statistic::Sum => values.iter().sum(),
            Statistic::Std => {
                let mean = values.iter().sum::<f64>() / n;
                (values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n).sqrt()
            }
            Statistic::Custom(_, f) => f(values),
            Statistic::Count => n,
        }
    }
}

impl fmt::Debug for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statistic::Custom(name, _) => write!(f, "Custom({name:?})"),
            other => f.write_str(other.name()),
        }
    }
}

/// mean, max, min, sum, std, count
pub fn default_stats() -> Vec<Statistic> {
    vec![
        Statistic::Mean,
        Statistic::Max,
        Statistic::Min,
        Statistic::Sum,
        Statistic::Std,
        Statistic::Count,
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneRow {
    pub zone: u64,
    /// One value per statistic, in [`ZonalTable::stats`] order.
    pub values: Vec<f64>,
}

/// Zonal result: one row per zone, ascending by zone ID.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZonalTable {
    pub stats: Vec<String>,
    pub rows: Vec<ZoneRow>,
}

impl ZonalTable {
    pub fn zones(&self) -> impl Iterator<Item = u64> + '_ {
        self.rows.iter().map(|r| r.zone)
    }

    pub fn row(&self, zone: u64) -> Option<&ZoneRow> {
        self.rows
            .binary_search_by_key(&zone, |r| r.zone)
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Value of statistic `stat` for `zone`.
    pub fn get(&self, zone: u64, stat: &str) -> Option<f64> {
        let col = self.stats.iter().position(|s| s == stat)?;
        self.row(zone).map(|r| r.values[col])
    }

    /// Serialize to JSON; NaN statistics are written as `null`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Summarize `values` over the zones of `zones` with each of `stats`.
pub fn zonal_stats(zones: &Grid, values: &Grid, stats: &[Statistic]) -> Result<ZonalTable> {
    zones.check_same_shape(values)?;
    if stats.is_empty() {
        return Err(Error::invalid("stats", "[]", "at least one statistic is required"));
    }
    debug!(rows = zones.rows(), cols = zones.cols(), n_stats = stats.len(), "zonal stats");

    let mut groups: BTreeMap<u64, Vec<f64>> = BTreeMap::new();
    for (&z, &v) in zones.data().iter().zip(values.data()) {
        let Some(zone) = zone_id(zones, z)? else {
            continue;
        };
        let bucket = groups.entry(zone).or_default();
        if !values.is_nodata(v) {
            bucket.push(v);
        }
    }
    trace!(n_zones = groups.len(), "cells grouped");

    let groups: Vec<(u64, Vec<f64>)> = groups.into_iter().collect();
    let rows = groups
        .into_par_iter()
        .map(|(zone, vals)| ZoneRow {
            zone,
            values: stats.iter().map(|s| s.reduce(&vals)).collect(),
        })
        .collect();

    Ok(ZonalTable {
        stats: stats.iter().map(|s| s.name().to_string()).collect(),
        rows,
    })
}

/// Zone ID of a zone-grid cell; None for unzoned cells.
fn zone_id(zones: &Grid, z: f64) -> Result<Option<u64>> {
    if zones.is_nodata(z) || z <= 0.0 {
        return Ok(None);
    }
    if z.fract() != 0.0 || z > u64::MAX as f64 {
        return Err(Error::invalid("zones", z, "zone ids must be positive integers"));
    }
    Ok(Some(z as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn values() -> Grid {
        Grid::from_fn(4, 4, (0.0, 4.0), (0.0, 4.0), |r, c| (r * 4 + c) as f64 + 1.0).unwrap()
    }

    /// Left half zone 1, right half zone 2.
    fn halves() -> Grid {
        Grid::from_fn(4, 4, (0.0, 4.0), (0.0, 4.0), |_, c| if c < 2 { 1.0 } else { 2.0 }).unwrap()
    }

    #[test]
    fn single_zone_matches_global_summary() {
        let v = values();
        let zones = Grid::filled(4, 4, (0.0, 4.0), (0.0, 4.0), 1.0).unwrap();
        let t = zonal_stats(&zones, &v, &default_stats()).unwrap();
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.get(1, "min"), v.min_value());
        assert_eq!(t.get(1, "max"), v.max_value());
        assert_abs_diff_eq!(t.get(1, "mean").unwrap(), 8.5, epsilon = 1e-12);
        assert_abs_diff_eq!(t.get(1, "sum").unwrap(), 136.0, epsilon = 1e-12);
        assert_eq!(t.get(1, "count"), Some(16.0));
        // Population std of 1..=16.
        assert_abs_diff_eq!(t.get(1, "std").unwrap(), (255.0f64 / 12.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn rows_ordered_by_zone() {
        let zones = Grid::from_fn(2, 3, (0.0, 3.0), (0.0, 2.0), |r, c| [[7.0, 3.0, 12.0], [3.0, 7.0, 1.0]][r][c]).unwrap();
        let v = Grid::filled(2, 3, (0.0, 3.0), (0.0, 2.0), 1.0).unwrap();
        let t = zonal_stats(&zones, &v, &[Statistic::Count]).unwrap();
        assert_eq!(t.zones().collect::<Vec<_>>(), vec![1, 3, 7, 12]);
        assert_eq!(t.get(3, "count"), Some(2.0));
    }

    #[test]
    fn split_zones() {
        let t = zonal_stats(&halves(), &values(), &default_stats()).unwrap();
        // Zone 1 holds columns 0-1: 1, 2, 5, 6, 9, 10, 13, 14.
        assert_abs_diff_eq!(t.get(1, "mean").unwrap(), 7.5, epsilon = 1e-12);
        assert_eq!(t.get(1, "min"), Some(1.0));
        assert_eq!(t.get(2, "max"), Some(16.0));
        assert_eq!(t.get(2, "count"), Some(8.0));
    }

    #[test]
    fn all_nodata_zone_is_count_zero() {
        let v = Grid::filled(4, 4, (0.0, 4.0), (0.0, 4.0), f64::NAN).unwrap();
        let t = zonal_stats(&halves(), &v, &default_stats()).unwrap();
        assert_eq!(t.rows.len(), 2);
        for zone in [1, 2] {
            assert_eq!(t.get(zone, "count"), Some(0.0));
            for stat in ["mean", "max", "min", "sum", "std"] {
                assert!(t.get(zone, stat).unwrap().is_nan(), "zone {zone} {stat}");
            }
        }
    }

    #[test]
    fn nodata_values_are_skipped() {
        let mut v = values();
        v.set(0, 0, f64::NAN);
        let t = zonal_stats(&halves(), &v, &[Statistic::Count, Statistic::Min]).unwrap();
        assert_eq!(t.get(1, "count"), Some(7.0));
        assert_eq!(t.get(1, "min"), Some(2.0));
    }

    #[test]
    fn custom_statistic() {
        let range = Statistic::custom("range", |vals: &[f64]| {
            let lo = vals.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            hi - lo
        });
        let t = zonal_stats(&halves(), &values(), &[range]).unwrap();
        assert_eq!(t.stats, vec!["range".to_string()]);
        assert_eq!(t.get(1, "range"), Some(13.0));
    }

    #[test]
    fn custom_statistic_not_called_on_empty_zone() {
        let v = Grid::filled(4, 4, (0.0, 4.0), (0.0, 4.0), f64::NAN).unwrap();
        let boom = Statistic::custom("boom", |vals: &[f64]| {
            assert!(!vals.is_empty());
            0.0
        });
        let t = zonal_stats(&halves(), &v, &[boom]).unwrap();
        assert!(t.get(1, "boom").unwrap().is_nan());
    }

    #[test]
    fn unzoned_cells_are_ignored() {
        let zones = Grid::new(1, 4, (0.0, 4.0), (0.0, 1.0), vec![0.0, -3.0, f64::NAN, 5.0]).unwrap();
        let v = Grid::new(1, 4, (0.0, 4.0), (0.0, 1.0), vec![10.0, 20.0, 30.0, 40.0]).unwrap();
        let t = zonal_stats(&zones, &v, &[Statistic::Sum]).unwrap();
        assert_eq!(t.zones().collect::<Vec<_>>(), vec![5]);
        assert_eq!(t.get(5, "sum"), Some(40.0));
    }

    #[test]
    fn fractional_zone_rejected() {
        let zones = Grid::new(1, 2, (0.0, 2.0), (0.0, 1.0), vec![1.0, 2.5]).unwrap();
        let v = Grid::zeros(1, 2).unwrap();
        assert!(matches!(
            zonal_stats(&zones, &v, &default_stats()),
            Err(Error::InvalidParameter { name: "zones", .. })
        ));
    }

    #[test]
    fn shape_mismatch_rejected() {
        let v = Grid::zeros(4, 5).unwrap();
        assert!(matches!(
            zonal_stats(&halves(), &v, &default_stats()),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn table_serializes_nan_as_null() {
        let v = Grid::filled(4, 4, (0.0, 4.0), (0.0, 4.0), f64::NAN).unwrap();
        let t = zonal_stats(&halves(), &v, &[Statistic::Mean, Statistic::Count]).unwrap();
        let json = t.to_json().unwrap();
        assert!(json.contains(r#""stats":["mean","count"]"#));
        assert!(json.contains(r#"{"zone":1,"values":[null,0.0]}"#));
    }
}
