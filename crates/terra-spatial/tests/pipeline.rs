//! End-to-end composition: synthesize a DEM, derive surfaces from it, and
//! summarize the results per zone.
use rand::rngs::StdRng;
use rand::SeedableRng;
use terra_spatial::smoothing;
use terra_spatial::*;

const N: usize = 48;
const EXTENT: (f64, f64) = (0.0, 4800.0);

fn dem() -> Grid {
    generate_terrain(N, N, EXTENT, EXTENT, 3).unwrap()
}

/// `(row, col)` of the highest cell.
fn peak(g: &Grid) -> (usize, usize) {
    let top = g.max_value().unwrap();
    let i = g.data().iter().position(|&v| v == top).unwrap();
    (i / g.cols(), i % g.cols())
}

#[test]
fn derivatives_stay_in_range() {
    let dem = dem();
    let s = slope(&dem);
    let a = aspect(&dem);
    let h = hillshade(&dem, HillshadeParams::default()).unwrap();

    assert!(s.data().iter().all(|&v| (0.0..=90.0).contains(&v)));
    assert!(a.data().iter().all(|&v| v == FLAT_ASPECT || (0.0..360.0).contains(&v)));
    assert!(h.data().iter().all(|&v| (0.0..=1.0).contains(&v)));
    assert_eq!(s.x_range(), dem.x_range());
}

#[test]
fn smoothing_stays_within_input_bounds() {
    let dem = dem();
    let (lo, hi) = (dem.min_value().unwrap(), dem.max_value().unwrap());
    let smooth = smoothing::mean(&dem, 3, &[]).unwrap();
    assert!(smooth.data().iter().all(|&v| v >= lo - 1e-9 && v <= hi + 1e-9));
}

#[test]
fn distance_and_visibility_from_the_peak() {
    let dem = dem();
    let (pr, pc) = peak(&dem);

    let dist = proximity(&dem, &ProximityParams::targets([dem.get(pr, pc)])).unwrap();
    assert_eq!(dist.get(pr, pc), 0.0);
    assert!(dist.data().iter().all(|&d| d.is_finite() && d >= 0.0));

    let (x, y) = (dem.x_coords()[pc], dem.y_coords()[pr]);
    let seen = viewshed(&dem, &ViewshedParams::at(x, y).with_observer_elevation(2.0)).unwrap();
    assert_eq!(seen.get(pr, pc), 1.0);
    assert!(seen.data().iter().all(|&v| v == 0.0 || v == 1.0));
    assert!(seen.data().iter().filter(|&&v| v == 1.0).count() > 1);
}

#[test]
fn bumps_on_land_then_zonal_summary() {
    let dem = dem();
    let mut rng = StdRng::seed_from_u64(21);
    let bumps = bump_like(&dem, 40, 3, &mut rng, constant_height(25.0)).unwrap();
    let summed = dem.data().iter().zip(bumps.data()).map(|(a, b)| a + b).collect();
    let bumped = Grid::new(N, N, EXTENT, EXTENT, summed).unwrap();

    // Quadrant zones 1..=4.
    let zones = Grid::from_fn(N, N, EXTENT, EXTENT, |r, c| (1 + 2 * (r / (N / 2)) + c / (N / 2)) as f64).unwrap();
    let table = zonal_stats(&zones, &slope(&bumped), &default_stats()).unwrap();

    assert_eq!(table.zones().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    let total: f64 = table.zones().map(|z| table.get(z, "count").unwrap()).sum();
    assert_eq!(total, (N * N) as f64);
    for z in table.zones() {
        let (lo, mean, hi) = (
            table.get(z, "min").unwrap(),
            table.get(z, "mean").unwrap(),
            table.get(z, "max").unwrap(),
        );
        assert!(lo <= mean && mean <= hi, "zone {z}: {lo} {mean} {hi}");
    }
}

#[test]
fn grid_json_round_trip_preserves_operator_output() {
    let dem = dem();
    let back = Grid::from_json(&dem.to_json().unwrap()).unwrap();
    assert_eq!(back.shape(), dem.shape());
    for (a, b) in slope(&back).data().iter().zip(slope(&dem).data()) {
        assert!((a - b).abs() < 1e-9);
    }
}

#[test]
fn wide_bump_field_smooths_and_shades() {
    let mut rng = StdRng::seed_from_u64(21);
    let field = bump(30, 12, 15, 4, &mut rng, constant_height(8.0)).unwrap();
    assert_eq!(field.shape(), (12, 30));
    assert_eq!(field.x_range(), (0.0, 30.0));
    let smooth = smoothing::mean(&field, 2, &[]).unwrap();
    assert_eq!(smooth.shape(), (12, 30));
    let shade = hillshade(&smooth, HillshadeParams::default()).unwrap();
    assert_eq!(shade.shape(), (12, 30));
}
