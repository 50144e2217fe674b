use flowgen_types::Rng;

/// Pareto(α, β) copy-count source controlling spatial locality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pareto {
    alpha: f64,
    beta: f64,
}

impl Pareto {
    pub const fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// `⌈β / (1−u)^{1/α}⌉` with `u` uniform on `[0, 1−10⁻⁹]`; a zero scale
    /// collapses to single copies.
    pub fn copy_count(&self, rng: &mut Rng) -> u32 {
        if self.beta == 0.0 {
            return 1;
        }
        let u = rng.next_f64(0.0, 1.0 - 1e-9);
        (self.beta / (1.0 - u).powf(1.0 / self.alpha)).ceil() as u32
    }
}

/// Allocate `total` units into groups of Pareto-drawn sizes, at most
/// `group_count` of them. Leftover units are spread over the formed groups
/// by a size-weighted CDF whose last entry is forced to 1.0.
pub fn allocate(total: u32, group_count: u32, distribution: &Pareto, rng: &mut Rng) -> Vec<u32> {
    let mut result = Vec::new();
    let mut remain = total;
    while remain > 0 {
        let count = distribution.copy_count(rng).min(remain);
        result.push(count);
        remain -= count;
        if result.len() as u32 == group_count {
            break;
        }
    }
    if remain > 0 {
        let sum: f64 = result.iter().map(|&c| f64::from(c)).sum();
        let mut cdf: Vec<f64> = Vec::with_capacity(result.len());
        let mut acc = 0.0;
        for &count in &result {
            acc += f64::from(count);
            cdf.push(acc / sum);
        }
        if let Some(last) = cdf.last_mut() {
            *last = 1.0;
        }
        while remain > 0 {
            let r = rng.next_f64(0.0, 1.0);
            let index = cdf.partition_point(|&w| w < r).min(result.len() - 1);
            result[index] += 1;
            remain -= 1;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_scale_means_single_copies() {
        let mut rng = Rng::new(1);
        let distribution = Pareto::new(1.0, 0.0);
        assert_eq!(distribution.copy_count(&mut rng), 1);
    }

    #[test]
    fn allocation_is_exhaustive() {
        let mut rng = Rng::new(2);
        let distribution = Pareto::new(1.2, 0.8);
        for total in [1u32, 10, 100, 2000] {
            let groups = allocate(total, u32::MAX, &distribution, &mut rng);
            assert_eq!(groups.iter().sum::<u32>(), total);
            assert!(groups.iter().all(|&c| c > 0));
        }
    }

    #[test]
    fn group_cap_spreads_the_leftover() {
        let mut rng = Rng::new(3);
        let distribution = Pareto::new(1.5, 1.0);
        let groups = allocate(500, 8, &distribution, &mut rng);
        assert!(groups.len() <= 8);
        assert_eq!(groups.iter().sum::<u32>(), 500);
    }

    #[test]
    fn heavier_tails_make_bigger_groups() {
        let mut rng = Rng::new(4);
        let light = Pareto::new(3.0, 1.0);
        let heavy = Pareto::new(0.8, 1.0);
        let light_groups = allocate(5000, u32::MAX, &light, &mut rng).len();
        let heavy_groups = allocate(5000, u32::MAX, &heavy, &mut rng).len();
        assert!(heavy_groups < light_groups);
    }
}
