use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A 2D scalar field with an explicit planar extent, stored row-major as f64.
///
/// Row 0 is the minimum-y (southernmost) row; rows increase northward and
/// columns increase eastward. A cell is no-data when it is NaN or equals the
/// grid's `nodata` sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    #[serde(with = "nullable::seq")]
    data: Vec<f64>,
    rows: usize,
    cols: usize,
    x_range: (f64, f64),
    y_range: (f64, f64),
    #[serde(with = "nullable::scalar")]
    nodata: f64,
}

impl Grid {
    /// Build a grid from row-major `data`, validating shape and extent.
    pub fn new(
        rows: usize,
        cols: usize,
        x_range: (f64, f64),
        y_range: (f64, f64),
        data: Vec<f64>,
    ) -> Result<Self> {
        validate_shape(rows, cols)?;
        validate_range("x_range", x_range)?;
        validate_range("y_range", y_range)?;
        if data.len() != rows * cols {
            return Err(Error::invalid(
                "data",
                data.len(),
                format!("expected {} values for a {rows}x{cols} grid", rows * cols),
            ));
        }
        Ok(Self { data, rows, cols, x_range, y_range, nodata: f64::NAN })
    }

    /// Grid filled with `fill` over the given extent.
    pub fn filled(
        rows: usize,
        cols: usize,
        x_range: (f64, f64),
        y_range: (f64, f64),
        fill: f64,
    ) -> Result<Self> {
        validate_shape(rows, cols)?;
        Self::new(rows, cols, x_range, y_range, vec![fill; rows * cols])
    }

    /// All-zero grid with unit cells: extent `(0, cols) × (0, rows)`.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        Self::filled(rows, cols, (0.0, cols as f64), (0.0, rows as f64), 0.0)
    }

    /// Grid whose cell `(row, col)` is `f(row, col)`.
    pub fn from_fn(
        rows: usize,
        cols: usize,
        x_range: (f64, f64),
        y_range: (f64, f64),
        mut f: impl FnMut(usize, usize) -> f64,
    ) -> Result<Self> {
        validate_shape(rows, cols)?;
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self::new(rows, cols, x_range, y_range, data)
    }

    /// Replace the no-data sentinel.
    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = nodata;
        self
    }

    /// Same extent, new cell values, NaN as the only no-data value. `data`
    /// must hold `rows * cols` values; every operator builds it from this
    /// grid's shape. The input sentinel is not carried over: it may coincide
    /// with a valid output value (a flat aspect of -1, a slope of 0).
    pub(crate) fn like(&self, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), self.rows * self.cols);
        Self {
            data,
            rows: self.rows,
            cols: self.cols,
            x_range: self.x_range,
            y_range: self.y_range,
            nodata: f64::NAN,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn x_range(&self) -> (f64, f64) {
        self.x_range
    }

    pub fn y_range(&self) -> (f64, f64) {
        self.y_range
    }

    pub fn cell_width(&self) -> f64 {
        (self.x_range.1 - self.x_range.0) / self.cols as f64
    }

    pub fn cell_height(&self) -> f64 {
        (self.y_range.1 - self.y_range.0) / self.rows as f64
    }

    pub fn nodata(&self) -> f64 {
        self.nodata
    }

    /// Row-major cell values.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: f64) {
        self.data[row * self.cols + col] = val;
    }

    /// True when `v` is NaN or equals this grid's sentinel.
    #[inline]
    pub fn is_nodata(&self, v: f64) -> bool {
        v.is_nan() || v == self.nodata
    }

    /// Cell-centre x coordinates, one per column.
    pub fn x_coords(&self) -> Vec<f64> {
        let cw = self.cell_width();
        (0..self.cols).map(|c| self.x_range.0 + (c as f64 + 0.5) * cw).collect()
    }

    /// Cell-centre y coordinates, one per row (ascending).
    pub fn y_coords(&self) -> Vec<f64> {
        let ch = self.cell_height();
        (0..self.rows).map(|r| self.y_range.0 + (r as f64 + 0.5) * ch).collect()
    }

    /// Whether `(x, y)` lies inside the extent (edges inclusive).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_range.0 && x <= self.x_range.1 && y >= self.y_range.0 && y <= self.y_range.1
    }

    /// `(row, col)` of the cell covering `(x, y)`, or None outside the extent.
    /// Points on the max edge belong to the last row/column.
    pub fn cell_of(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        if !self.contains(x, y) {
            return None;
        }
        let col = ((x - self.x_range.0) / self.cell_width()).floor() as usize;
        let row = ((y - self.y_range.0) / self.cell_height()).floor() as usize;
        Some((row.min(self.rows - 1), col.min(self.cols - 1)))
    }

    /// Fractional index-space position `(row, col)` of `(x, y)`, where cell
    /// centres sit on integers.
    pub(crate) fn index_position(&self, x: f64, y: f64) -> (f64, f64) {
        let fc = (x - self.x_range.0) / self.cell_width() - 0.5;
        let fr = (y - self.y_range.0) / self.cell_height() - 0.5;
        (fr, fc)
    }

    /// Sample the field at `(x, y)` using bilinear interpolation between the
    /// four surrounding cell centres. Positions in the outer half-cell clamp
    /// to the edge. Returns None outside the extent or when any contributing
    /// cell is no-data.
    pub fn sample(&self, x: f64, y: f64) -> Option<f64> {
        if !self.contains(x, y) {
            return None;
        }
        let (fr, fc) = self.index_position(x, y);
        let v = self.interpolate(fr, fc);
        if v.is_nan() { None } else { Some(v) }
    }

    /// Bilinear interpolation in index space; NaN when a contributing cell is
    /// no-data. Uses the lerp form so that a constant neighbourhood returns
    /// that constant exactly.
    pub(crate) fn interpolate(&self, fr: f64, fc: f64) -> f64 {
        let fr = fr.clamp(0.0, (self.rows - 1) as f64);
        let fc = fc.clamp(0.0, (self.cols - 1) as f64);

        let r0 = fr.floor() as usize;
        let c0 = fc.floor() as usize;
        let r1 = (r0 + 1).min(self.rows - 1);
        let c1 = (c0 + 1).min(self.cols - 1);

        let tr = fr - r0 as f64;
        let tc = fc - c0 as f64;

        let v00 = self.get(r0, c0);
        let v01 = self.get(r0, c1);
        let v10 = self.get(r1, c0);
        let v11 = self.get(r1, c1);
        if [v00, v01, v10, v11].iter().any(|&v| self.is_nodata(v)) {
            return f64::NAN;
        }

        let south = v00 + (v01 - v00) * tc;
        let north = v10 + (v11 - v10) * tc;
        south + (north - south) * tr
    }

    /// Smallest valid value; None when every cell is no-data.
    pub fn min_value(&self) -> Option<f64> {
        self.valid_values().reduce(f64::min)
    }

    /// Largest valid value; None when every cell is no-data.
    pub fn max_value(&self) -> Option<f64> {
        self.valid_values().reduce(f64::max)
    }

    /// Number of cells that are not no-data.
    pub fn count_valid(&self) -> usize {
        self.valid_values().count()
    }

    fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().copied().filter(move |&v| !self.is_nodata(v))
    }

    /// Fail with `ShapeMismatch` unless `other` has the same rows and cols.
    pub fn check_same_shape(&self, other: &Grid) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::ShapeMismatch {
                expected: self.shape(),
                actual: other.shape(),
            });
        }
        Ok(())
    }

    /// Serialize to JSON; no-data cells that are NaN are written as `null`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a grid written by [`Grid::to_json`], re-validating its invariants.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn validate_shape(rows: usize, cols: usize) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Err(Error::invalid(
            "shape",
            format!("{rows}x{cols}"),
            "rows and cols must be at least 1",
        ));
    }
    Ok(())
}

fn validate_range(name: &'static str, (lo, hi): (f64, f64)) -> Result<()> {
    if !lo.is_finite() || !hi.is_finite() || hi <= lo {
        return Err(Error::invalid(name, format!("({lo}, {hi})"), "must be finite with max > min"));
    }
    Ok(())
}

/// Deserialization target; converted through [`Grid::new`] so JSON input
/// obeys the same invariants as code-built grids.
#[derive(Deserialize)]
struct RawGrid {
    #[serde(with = "nullable::seq")]
    data: Vec<f64>,
    rows: usize,
    cols: usize,
    x_range: (f64, f64),
    y_range: (f64, f64),
    #[serde(with = "nullable::scalar")]
    nodata: f64,
}

impl TryFrom<RawGrid> for Grid {
    type Error = Error;

    fn try_from(raw: RawGrid) -> Result<Self> {
        Ok(Grid::new(raw.rows, raw.cols, raw.x_range, raw.y_range, raw.data)?.with_nodata(raw.nodata))
    }
}

/// JSON has no NaN; NaN travels as `null`.
mod nullable {
    pub mod seq {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(data: &[f64], s: S) -> Result<S::Ok, S::Error> {
            s.collect_seq(data.iter().map(|v| if v.is_nan() { None } else { Some(*v) }))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<f64>, D::Error> {
            let raw = Vec::<Option<f64>>::deserialize(d)?;
            Ok(raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
        }
    }

    pub mod scalar {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
            if v.is_nan() { s.serialize_none() } else { s.serialize_some(v) }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
            Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners() -> Grid {
        let mut g = Grid::filled(4, 4, (0.0, 4.0), (0.0, 4.0), 0.0).unwrap();
        g.set(0, 0, 10.0);
        g.set(0, 3, 20.0);
        g.set(3, 0, 30.0);
        g.set(3, 3, 40.0);
        g
    }

    #[test]
    fn sample_corners_return_exact_values() {
        let g = corners();
        assert!((g.sample(0.0, 0.0).unwrap() - 10.0).abs() < 1e-12);
        assert!((g.sample(4.0, 0.0).unwrap() - 20.0).abs() < 1e-12);
        assert!((g.sample(0.0, 4.0).unwrap() - 30.0).abs() < 1e-12);
        assert!((g.sample(4.0, 4.0).unwrap() - 40.0).abs() < 1e-12);
    }

    #[test]
    fn sample_between_centres_interpolates() {
        let g = Grid::from_fn(2, 2, (0.0, 2.0), (0.0, 2.0), |_, c| c as f64 * 10.0).unwrap();
        // Halfway between the centres at x=0.5 and x=1.5.
        assert!((g.sample(1.0, 1.0).unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn sample_out_of_bounds_returns_none() {
        let g = corners();
        assert!(g.sample(-0.1, 1.0).is_none());
        assert!(g.sample(1.0, 4.5).is_none());
    }

    #[test]
    fn rejects_empty_and_inverted_grids() {
        assert!(matches!(Grid::zeros(0, 3), Err(Error::InvalidParameter { .. })));
        assert!(matches!(
            Grid::filled(2, 2, (1.0, 0.0), (0.0, 1.0), 0.0),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(matches!(
            Grid::new(2, 2, (0.0, 1.0), (0.0, 1.0), vec![0.0; 3]),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn cell_geometry_follows_extent() {
        let g = Grid::filled(2, 4, (100.0, 140.0), (-10.0, 10.0), 0.0).unwrap();
        assert_eq!(g.cell_width(), 10.0);
        assert_eq!(g.cell_height(), 10.0);
        assert_eq!(g.x_coords(), vec![105.0, 115.0, 125.0, 135.0]);
        assert_eq!(g.y_coords(), vec![-5.0, 5.0]);
        assert_eq!(g.cell_of(101.0, -9.0), Some((0, 0)));
        assert_eq!(g.cell_of(140.0, 10.0), Some((1, 3)));
        assert_eq!(g.cell_of(141.0, 0.0), None);
    }

    #[test]
    fn custom_sentinel_is_nodata() {
        let g = Grid::new(1, 3, (0.0, 3.0), (0.0, 1.0), vec![1.0, -9999.0, 3.0])
            .unwrap()
            .with_nodata(-9999.0);
        assert!(g.is_nodata(-9999.0));
        assert!(g.is_nodata(f64::NAN));
        assert_eq!(g.count_valid(), 2);
        assert_eq!(g.min_value(), Some(1.0));
        assert_eq!(g.max_value(), Some(3.0));
    }

    #[test]
    fn json_round_trip_keeps_nodata() {
        let g = Grid::new(1, 3, (0.0, 3.0), (0.0, 1.0), vec![1.0, f64::NAN, 3.0]).unwrap();
        let json = g.to_json().unwrap();
        assert!(json.contains("null"));
        let back = Grid::from_json(&json).unwrap();
        assert_eq!(back.shape(), (1, 3));
        assert!(back.get(0, 1).is_nan());
        assert_eq!(back.get(0, 2), 3.0);
        assert!(back.nodata().is_nan());
    }

    #[test]
    fn json_with_bad_shape_is_rejected() {
        let json = r#"{"data":[1.0],"rows":2,"cols":2,"x_range":[0.0,1.0],"y_range":[0.0,1.0],"nodata":null}"#;
        assert!(matches!(Grid::from_json(json), Err(Error::Json(_))));
    }
}
