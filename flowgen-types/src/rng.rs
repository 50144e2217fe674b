use rand_mt::Mt19937GenRand32;

/// Seed used when none is given on the command line.
pub const DEFAULT_SEED: u32 = 5489;

/// The single random source. Every component draws from one seeded MT19937
/// stream, so the ordering of draws is the reproducibility contract: the same
/// configuration and seed replay the same artifact byte for byte.
#[derive(Debug, Clone)]
pub struct Rng {
    inner: Mt19937GenRand32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self {
            inner: Mt19937GenRand32::new(seed),
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    /// Uniform draw in `[min, max]` by modulo reduction. The full range is a
    /// passthrough so it costs exactly one word either way.
    pub fn next_range(&mut self, min: u32, max: u32) -> u32 {
        if min == 0 && max == u32::MAX {
            self.next_u32()
        } else {
            min + self.next_u32() % (max - min + 1)
        }
    }

    /// Uniform index into a non-empty slice of `len` elements.
    pub fn next_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        self.next_range(0, (len - 1) as u32) as usize
    }

    /// Signed uniform draw in `[min, max]` by modulo reduction.
    pub fn next_i64(&mut self, min: i64, max: i64) -> i64 {
        min + i64::from(self.next_u32()) % (max - min + 1)
    }

    /// Uniform draw in `[min, max]`, inclusive of both endpoints.
    pub fn next_f64(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * f64::from(self.next_u32()) / 4_294_967_295.0
    }
}

impl Default for Rng {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_mt19937_stream() {
        // first outputs of mt19937ar seeded with 5489
        let mut rng = Rng::new(DEFAULT_SEED);
        assert_eq!(rng.next_u32(), 3499211612);
        assert_eq!(rng.next_u32(), 581869302);
        assert_eq!(rng.next_u32(), 3890346734);
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = Rng::new(42);
        let mut b = Rng::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn ranges_are_inclusive() {
        let mut rng = Rng::new(7);
        for _ in 0..64 {
            let v = rng.next_range(3, 5);
            assert!((3..=5).contains(&v));
            let s = rng.next_i64(-4, 4);
            assert!((-4..=4).contains(&s));
            let f = rng.next_f64(0.0, 1.0);
            assert!((0.0..=1.0).contains(&f));
        }
    }
}
