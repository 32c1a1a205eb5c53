//! Exact separable distance transforms with nearest-site tracking.
//!
//! Pass 1 (per column): distance from every cell to the nearest target in its
//! own column, `g`. Pass 2 (per row): combine `g` across columns with the
//! metric's 1D operator:
//!
//! | metric    | row operator                          | method                         |
//! |-----------|---------------------------------------|--------------------------------|
//! | euclidean | `min_q g(q)² + (w·|p−q|)²`            | Felzenszwalb–Huttenlocher envelope |
//! | manhattan | `min_q g(q) + w·|p−q|`                | forward/backward sweep         |
//! | chebyshev | `min_q max(g(q), w·|p−q|)`            | monotone stack + binary search |
//!
//! All three are exact, and cost O(n) or O(n log n) per line.
use super::DistanceMetric;
use crate::parallel::*;

/// Per-cell distance to, and flat index of, the nearest target.
pub(crate) struct Nearest {
    /// `f64::INFINITY` where no target exists.
    pub dist: Vec<f64>,
    /// Row-major index of the nearest target; only meaningful when `dist` is finite.
    pub target: Vec<usize>,
}

/// Nearest target for every cell of a `rows × cols` grid whose targets are
/// flagged in `is_target`. Column steps cost `cell_width`, row steps `cell_height`.
pub(crate) fn nearest_targets(
    is_target: &[bool],
    rows: usize,
    cols: usize,
    cell_width: f64,
    cell_height: f64,
    metric: DistanceMetric,
) -> Nearest {
    let (col_dist, col_row) = column_pass(is_target, rows, cols, cell_height);

    let lines: Vec<Vec<(f64, usize)>> = (0..rows)
        .into_par_iter()
        .map(|r| {
            let g = &col_dist[r * cols..(r + 1) * cols];
            let line = match metric {
                DistanceMetric::Euclidean => euclidean_line(g, cell_width),
                DistanceMetric::Manhattan => manhattan_line(g, cell_width),
                DistanceMetric::Chebyshev => chebyshev_line(g, cell_width),
            };
            line.into_iter()
                .map(|(d, c)| {
                    let target = if d.is_finite() { col_row[r * cols + c] * cols + c } else { 0 };
                    (d, target)
                })
                .collect::<Vec<(f64, usize)>>()
        })
        .collect();

    let (dist, target) = lines.into_iter().flatten().unzip();
    Nearest { dist, target }
}

/// Vertical distance to, and row of, the nearest target in each column.
fn column_pass(is_target: &[bool], rows: usize, cols: usize, step: f64) -> (Vec<f64>, Vec<usize>) {
    let per_col: Vec<Vec<(f64, usize)>> = (0..cols)
        .into_par_iter()
        .map(|c| {
            let flags: Vec<bool> = (0..rows).map(|r| is_target[r * cols + c]).collect();
            nearest_in_line(&flags, step)
        })
        .collect();

    let mut dist = vec![f64::INFINITY; rows * cols];
    let mut row = vec![0usize; rows * cols];
    for (c, line) in per_col.iter().enumerate() {
        for (r, &(d, t)) in line.iter().enumerate() {
            dist[r * cols + c] = d;
            row[r * cols + c] = t;
        }
    }
    (dist, row)
}

/// 1D nearest flagged index by a forward and a backward scan.
fn nearest_in_line(flags: &[bool], step: f64) -> Vec<(f64, usize)> {
    let n = flags.len();
    let mut out = vec![(f64::INFINITY, 0usize); n];

    let mut last = None;
    for i in 0..n {
        if flags[i] {
            last = Some(i);
        }
        if let Some(t) = last {
            out[i] = ((i - t) as f64 * step, t);
        }
    }

    let mut next = None;
    for i in (0..n).rev() {
        if flags[i] {
            next = Some(i);
        }
        if let Some(t) = next {
            let d = (t - i) as f64 * step;
            if d < out[i].0 {
                out[i] = (d, t);
            }
        }
    }
    out
}

/// Lower envelope of parabolas `g(q)² + (w·(p − q))²` over columns with a
/// finite `g` (Felzenszwalb & Huttenlocher 2012). Returns `(distance, q)`.
fn euclidean_line(g: &[f64], w: f64) -> Vec<(f64, usize)> {
    let n = g.len();
    let f = |q: usize| g[q] * g[q];
    let w2 = w * w;
    // Abscissa where the parabolas of sites v < q intersect.
    let meet = |v: usize, q: usize| {
        let (vf, qf) = (v as f64, q as f64);
        ((f(q) + w2 * qf * qf) - (f(v) + w2 * vf * vf)) / (2.0 * w2 * (qf - vf))
    };

    // sites[i] owns the envelope from bounds[i] up to bounds[i + 1].
    let mut sites: Vec<usize> = Vec::with_capacity(n);
    let mut bounds: Vec<f64> = Vec::with_capacity(n);
    for q in (0..n).filter(|&q| g[q].is_finite()) {
        let mut s = f64::NEG_INFINITY;
        while let Some(&top) = sites.last() {
            s = meet(top, q);
            if s <= bounds[bounds.len() - 1] {
                sites.pop();
                bounds.pop();
                s = f64::NEG_INFINITY;
            } else {
                break;
            }
        }
        sites.push(q);
        bounds.push(s);
    }

    if sites.is_empty() {
        return vec![(f64::INFINITY, 0); n];
    }

    let mut out = Vec::with_capacity(n);
    let mut k = 0usize;
    for p in 0..n {
        while k + 1 < sites.len() && bounds[k + 1] < p as f64 {
            k += 1;
        }
        let q = sites[k];
        let dx = w * (p as f64 - q as f64);
        out.push(((f(q) + dx * dx).sqrt(), q));
    }
    out
}

/// `min_q g(q) + w·|p − q|` by a forward and a backward relaxation sweep.
fn manhattan_line(g: &[f64], w: f64) -> Vec<(f64, usize)> {
    let n = g.len();
    let mut out: Vec<(f64, usize)> = g.iter().enumerate().map(|(q, &d)| (d, q)).collect();
    for p in 1..n {
        let (d, q) = out[p - 1];
        if d + w < out[p].0 {
            out[p] = (d + w, q);
        }
    }
    for p in (0..n.saturating_sub(1)).rev() {
        let (d, q) = out[p + 1];
        if d + w < out[p].0 {
            out[p] = (d + w, q);
        }
    }
    out
}

/// `min_q max(g(q), w·|p − q|)`, scanning left-to-right then right-to-left.
fn chebyshev_line(g: &[f64], w: f64) -> Vec<(f64, usize)> {
    let n = g.len();
    let mut out = chebyshev_sweep(g, w, 0..n);
    let back = chebyshev_sweep(g, w, (0..n).rev());
    for p in 0..n {
        if back[p].0 < out[p].0 {
            out[p] = back[p];
        }
    }
    out
}

/// One-directional pass over candidates already visited by `order`.
///
/// A visited candidate whose `g` is at least that of a newer one can never
/// win again, so the stack keeps `g` strictly increasing toward the top while
/// the horizontal term `w·|p − q|` decreases toward the top. The cost
/// `max(g, horizontal)` is therefore valley-shaped along the stack and its
/// minimum sits where `g` first reaches the horizontal term.
fn chebyshev_sweep(g: &[f64], w: f64, order: impl Iterator<Item = usize>) -> Vec<(f64, usize)> {
    let mut out = vec![(f64::INFINITY, 0usize); g.len()];
    let mut stack: Vec<usize> = Vec::new();
    for p in order {
        if g[p].is_finite() {
            while stack.last().is_some_and(|&top| g[top] >= g[p]) {
                stack.pop();
            }
            stack.push(p);
        }
        if stack.is_empty() {
            continue;
        }
        let horizontal = |q: usize| w * (p as f64 - q as f64).abs();
        let cost = |q: usize| g[q].max(horizontal(q));
        let split = stack.partition_point(|&q| g[q] < horizontal(q));
        for i in [split.checked_sub(1), Some(split)].into_iter().flatten() {
            if let Some(&q) = stack.get(i) {
                let d = cost(q);
                if d < out[p].0 {
                    out[p] = (d, q);
                }
            }
        }
    }
    out
}
