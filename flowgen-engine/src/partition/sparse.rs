use std::collections::VecDeque;

use flowgen_types::Rng;

use crate::config::Config;
use crate::params::ParamCalc;
use crate::split::split_rule;
use crate::state::ProblemState;

/// Equal-split partitioning for sparse targets: double the bucket count
/// until the problem fits the bit budget, as long as the buckets together
/// can still realize the parameter.
#[derive(Debug)]
pub struct SparsePartition {
    n: u32,
    p: u32,
    total_width: u32,
    part_count: u32,
}

impl SparsePartition {
    pub fn new(n: u32, p: u32, total_width: u32) -> Self {
        Self {
            n,
            p,
            total_width,
            part_count: 1,
        }
    }

    pub fn part_count(&self) -> u32 {
        self.part_count
    }

    /// Double the bucket count. Inadmissible once the buckets outnumber the
    /// rules or the bits, or can no longer reach the parameter.
    pub fn add_partition(&mut self, calc: &mut ParamCalc) -> bool {
        self.part_count *= 2;
        if self.part_count > self.n
            || f64::from(self.part_count).log2() > f64::from(self.total_width)
        {
            return false;
        }
        let small = self.n / self.part_count;
        let large = small + 1;
        let large_count = self.n % self.part_count;
        let small_count = self.part_count - large_count;
        let reachable = small_count * calc.at(small) + large_count * calc.at(large);
        reachable >= self.p
    }

    /// Split the wildcard into `part_count` disjoint origins and balance the
    /// per-bucket sizes and parameters. The parameters sum to the target
    /// whenever the caps allow; a residue that cannot be placed is dropped
    /// (the run then undershoots the target). Only a failed origin split
    /// aborts the export.
    pub fn export_origins(
        &self,
        config: &Config,
        calc: &mut ParamCalc,
        rng: &mut Rng,
        origins: &mut VecDeque<ProblemState>,
    ) -> bool {
        let mut queue = VecDeque::new();
        queue.push_back(config.layout.wildcard_rule());
        while (queue.len() as u32) < self.part_count && !queue.is_empty() {
            let rule = queue.pop_front().expect("non-empty");
            if let Some((low, high)) =
                split_rule(&rule, &config.layout, |i| config.field_weight(i), rng)
            {
                queue.push_back(low);
                queue.push_back(high);
            }
        }
        if queue.len() as u32 != self.part_count {
            return false;
        }
        let small = self.n / self.part_count;
        let large = small + 1;
        let large_count = self.n % self.part_count;
        let small_count = self.part_count - large_count;
        let small_parameter = calc.at(small).min(self.p / small_count);
        let mut large_budget = self.p - small_parameter * small_count;
        for _ in 0..small_count {
            let parent = queue.pop_front().expect("counted");
            origins.push_back(ProblemState::new(small, small_parameter, true, parent, config));
        }
        for i in 0..large_count {
            let large_parameter = calc.at(large).min(large_budget / (large_count - i));
            let parent = queue.pop_front().expect("counted");
            origins.push_back(ProblemState::new(large, large_parameter, true, parent, config));
            large_budget -= large_parameter;
        }
        if large_budget != 0 {
            tracing::debug!(residue = large_budget, "parameter residue dropped");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgen_rule::{MatchType, RuleLayout};

    fn config(widths: &[u8]) -> Config {
        let mut layout = RuleLayout::with_field_count(widths.len());
        for (i, w) in widths.iter().enumerate() {
            layout.set_kind(i, MatchType::Lpm);
            layout.set_width(i, *w);
        }
        Config::new(layout)
    }

    #[test]
    fn single_bucket_export() {
        let config = config(&[8, 8]);
        let mut calc = ParamCalc::new(16);
        let mut rng = Rng::new(1);
        let partition = SparsePartition::new(16, 10, 16);
        let mut origins = VecDeque::new();
        assert!(partition.export_origins(&config, &mut calc, &mut rng, &mut origins));
        assert_eq!(origins.len(), 1);
        let origin = &origins[0];
        assert_eq!((origin.n, origin.p), (16, 10));
        assert!(origin.parent.is_wildcard());
    }

    #[test]
    fn doubling_respects_the_budget() {
        let mut calc = ParamCalc::new(16);
        // 16 rules over 16 bits; parameter 10 survives a few doublings
        let mut partition = SparsePartition::new(16, 10, 16);
        assert!(partition.add_partition(&mut calc)); // 2 buckets: 2·MP(8) = 44
        assert!(partition.add_partition(&mut calc)); // 4 buckets: 4·MP(4) = 24
        assert!(!partition.add_partition(&mut calc)); // 8 buckets: 8·MP(2) = 8 < 10
    }

    #[test]
    fn origins_are_pairwise_disjoint_and_balanced() {
        let config = config(&[8, 8]);
        let mut calc = ParamCalc::new(16);
        let mut rng = Rng::new(2);
        let mut partition = SparsePartition::new(15, 6, 16);
        assert!(partition.add_partition(&mut calc));
        assert!(partition.add_partition(&mut calc));
        let mut origins = VecDeque::new();
        assert!(partition.export_origins(&config, &mut calc, &mut rng, &mut origins));
        assert_eq!(origins.len(), 4);
        let origins: Vec<ProblemState> = origins.into_iter().collect();
        for (i, a) in origins.iter().enumerate() {
            for b in &origins[i + 1..] {
                assert!(!a.parent.overlap(&b.parent));
            }
        }
        assert_eq!(origins.iter().map(|o| o.n).sum::<u32>(), 15);
        assert_eq!(origins.iter().map(|o| o.p).sum::<u32>(), 6);
        // 15 over 4 buckets: three of 4, one of 3
        let mut sizes: Vec<u32> = origins.iter().map(|o| o.n).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![3, 4, 4, 4]);
    }
}
