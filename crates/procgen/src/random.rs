//! Seeded deterministic random source.

use rand::prelude::*;

/// Deterministic float stream. Two sources built from the same seed yield the
/// same sequence for the same call pattern.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform float in `[lo, hi)`; exactly `lo` when the range is empty.
    ///
    /// Computed as `lo + (hi - lo) * u` so a reversed range is tolerated
    /// instead of panicking.
    #[inline]
    pub fn next_float_range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.rng.gen::<f32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RandomSource::new(42);
        let mut b = RandomSource::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_float_range(-5.0, 5.0), b.next_float_range(-5.0, 5.0));
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = RandomSource::new(1);
        let mut b = RandomSource::new(2);
        let xs: Vec<f32> = (0..8).map(|_| a.next_float_range(0.0, 1.0)).collect();
        let ys: Vec<f32> = (0..8).map(|_| b.next_float_range(0.0, 1.0)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn values_stay_in_range() {
        let mut rng = RandomSource::new(7);
        for _ in 0..10_000 {
            let v = rng.next_float_range(-3.0, 3.0);
            assert!((-3.0..3.0).contains(&v), "{v} escaped [-3, 3)");
        }
    }

    #[test]
    fn empty_range_returns_lower_bound() {
        let mut rng = RandomSource::new(7);
        assert_eq!(rng.next_float_range(0.0, 0.0), 0.0);
        assert_eq!(rng.next_float_range(12.5, 12.5), 12.5);
    }
}
