//! Fractional Brownian Motion noise synthesis.
//!
//! fBm: sum of octaves with amplitude = persistence^i and
//! frequency = lacunarity^i. Each octave draws from its own Perlin
//! permutation (seed + i) so octaves stay decorrelated.
use noise::{NoiseFn, Perlin};

pub struct Fbm {
    pub lacunarity: f64,
    pub persistence: f64,
    octaves: Vec<Perlin>,
}

impl Fbm {
    /// Construct an fBm with `octaves` layers seeded from `seed`.
    pub fn new(seed: u32, octaves: u32, lacunarity: f64, persistence: f64) -> Self {
        let octaves = (0..octaves).map(|i| Perlin::new(seed.wrapping_add(i))).collect();
        Self { lacunarity, persistence, octaves }
    }

    pub fn octaves(&self) -> usize {
        self.octaves.len()
    }

    /// Sum of octave amplitudes; bounds `|sample|` up to Perlin's own range.
    pub fn amplitude_sum(&self) -> f64 {
        let mut amp = 1.0f64;
        let mut total = 0.0f64;
        for _ in 0..self.octaves.len() {
            total += amp;
            amp *= self.persistence;
        }
        total
    }

    /// Evaluate fBm at `(x, y)` in noise space (dimensionless).
    /// Returns an unscaled value in roughly `±amplitude_sum()`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let mut value = 0.0f64;
        let mut amp = 1.0f64;
        let mut freq = 1.0f64;
        for perlin in &self.octaves {
            value += amp * perlin.get([x * freq, y * freq]);
            amp *= self.persistence;
            freq *= self.lacunarity;
        }
        value
    }
}
