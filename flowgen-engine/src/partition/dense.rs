use std::collections::VecDeque;

use flowgen_rule::Rule;
use flowgen_types::Rng;

use crate::config::Config;
use crate::params::ParamCalc;
use crate::split::split_rule;
use crate::state::ProblemState;

/// Trie partitioning for dense targets. Internal nodes are solid rules
/// committed up front (each covers its whole subtree); leaves host the
/// subproblems. Height grows until the trie both fits the bit budget and
/// reaches the parameter.
#[derive(Debug)]
pub struct DensePartition {
    n: u32,
    p: u32,
    total_width: u32,
    height: u32,
    trie: Trie,
}

impl DensePartition {
    pub fn new(n: u32, p: u32, total_width: u32) -> Self {
        Self {
            n,
            p,
            total_width,
            height: 0,
            trie: Trie::default(),
        }
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raise the trie height until a feasible allocation builds; refuse once
    /// the height exhausts the bit budget.
    pub fn add_partition(&mut self, calc: &mut ParamCalc) -> bool {
        loop {
            self.height += 1;
            if self.total_width < self.height {
                return false;
            }
            // five bits buy a bucket of four rules at each remaining level
            let log2_leaf = 0.4 * f64::from(self.total_width - self.height);
            let part_count = 2f64.powi(self.height as i32);
            let spare = f64::from(self.n) - part_count + 1.0;
            if spare > 0.0 && log2_leaf < (spare / part_count).log2() {
                return false;
            }
            if self.trie.build(self.n, self.height, self.p, log2_leaf, calc) {
                return true;
            }
        }
    }

    /// Walk the trie: every internal node emits its rule (before its
    /// descendants, covering rules first) and splits; every leaf emits one
    /// subproblem from the three-bucket parameter allocation.
    pub fn export_origins(
        &self,
        config: &Config,
        rng: &mut Rng,
        final_set: &mut Vec<Rule>,
        origins: &mut VecDeque<ProblemState>,
    ) -> bool {
        let Some(root) = &self.trie.root else {
            return false;
        };
        let mut leaf_index = 0u32;
        self.export_node(
            root,
            config.layout.wildcard_rule(),
            config,
            rng,
            final_set,
            origins,
            &mut leaf_index,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn export_node(
        &self,
        node: &TrieNode,
        rule: Rule,
        config: &Config,
        rng: &mut Rng,
        final_set: &mut Vec<Rule>,
        origins: &mut VecDeque<ProblemState>,
        leaf_index: &mut u32,
    ) -> bool {
        if node.is_leaf {
            let (parameter, part) = self.trie.leaf_budget(*leaf_index);
            *leaf_index += 1;
            origins.push_back(ProblemState::new(part, parameter, true, rule, config));
            return true;
        }
        final_set.push(rule.clone());
        let halves = split_rule(&rule, &config.layout, |i| config.field_weight(i), rng);
        let mut ok = true;
        match halves {
            Some((low, high)) => {
                if let Some(child) = &node.children[0] {
                    ok &= self.export_node(child, low, config, rng, final_set, origins, leaf_index);
                }
                if let Some(child) = &node.children[1] {
                    ok &=
                        self.export_node(child, high, config, rng, final_set, origins, leaf_index);
                }
            }
            None => {
                ok = node.children.iter().all(Option::is_none);
            }
        }
        ok
    }
}

#[derive(Debug, Default)]
struct Trie {
    root: Option<Box<TrieNode>>,
    leaf_parameter: u32,
    internal_parameter: u32,
    leaf_count: u32,
    internal_count: u32,
    large_part: u32,
    small_part: u32,
    large_count: u32,
    small_count: u32,
    full_large_count: u32,
    full_large_parameter: u32,
    full_small_count: u32,
    full_small_parameter: u32,
    partial_parameter: u32,
}

#[derive(Debug)]
struct TrieNode {
    count: u32,
    is_leaf: bool,
    children: [Option<Box<TrieNode>>; 2],
}

impl Trie {
    /// Build a height-`h` trie allocating `n` rules, leaves capped at
    /// `2^log2_leaf`. Fails when the allocation cannot land exactly on `n`
    /// or the achievable parameter band misses `p`.
    fn build(&mut self, n: u32, h: u32, p: u32, log2_leaf: f64, calc: &mut ParamCalc) -> bool {
        *self = Trie::default();
        let mut remaining = n;
        let (root, _) = self.build_node(&mut remaining, h, 0, log2_leaf, calc);
        self.root = root;
        if self.leaf_count == 0
            || remaining != 0
            || self.leaf_parameter + self.internal_parameter < p
            || self.internal_parameter > p
        {
            return false;
        }
        self.arrange(n, p, calc);
        true
    }

    fn build_node(
        &mut self,
        remaining: &mut u32,
        h: u32,
        depth: u32,
        log2_leaf: f64,
        calc: &mut ParamCalc,
    ) -> (Option<Box<TrieNode>>, u32) {
        if *remaining == 0 {
            return (None, 0);
        }
        if depth == h || *remaining == 1 {
            self.leaf_count += 1;
            let count;
            if f64::from(*remaining).log2() <= log2_leaf {
                count = *remaining;
                if *remaining < self.large_count {
                    self.small_part = *remaining;
                    self.small_count += 1;
                } else {
                    self.large_part = *remaining;
                    self.large_count += 1;
                }
                *remaining = 0;
            } else {
                count = log2_leaf.exp2().round() as u32;
                *remaining -= count;
                self.large_part = count;
                self.large_count += 1;
            }
            self.leaf_parameter += calc.at(count);
            let node = TrieNode {
                count,
                is_leaf: true,
                children: [None, None],
            };
            (Some(Box::new(node)), 1)
        } else {
            self.internal_count += 1;
            *remaining -= 1;
            let (child0, left) = self.build_node(remaining, h, depth + 1, log2_leaf, calc);
            let (child1, right) = self.build_node(remaining, h, depth + 1, log2_leaf, calc);
            self.internal_parameter += left + right;
            let node = TrieNode {
                count: 1,
                is_leaf: false,
                children: [child0, child1],
            };
            (Some(Box::new(node)), left + right + 1)
        }
    }

    /// Distribute `p` over the leaves: the partial leaf takes a proportional
    /// share, the full leaves split the rest into large/small halves exactly.
    fn arrange(&mut self, n: u32, p: u32, calc: &mut ParamCalc) {
        let leaf_parts = n - self.internal_count;
        let mut leaf_budget = p - self.internal_parameter;
        self.partial_parameter =
            (leaf_budget / leaf_parts * self.small_part).min(calc.at(self.small_part));
        leaf_budget -= self.partial_parameter;
        if self.large_count > 0 {
            self.full_small_parameter = leaf_budget / self.large_count;
            self.full_large_parameter = self.full_small_parameter + 1;
            self.full_large_count = leaf_budget % self.large_count;
            self.full_small_count = self.large_count - self.full_large_count;
        } else {
            self.full_small_parameter = 0;
            self.full_large_parameter = 0;
            self.full_large_count = 0;
            self.full_small_count = 0;
        }
    }

    /// (parameter, rule count) of the leaf at pre-order position `index`.
    fn leaf_budget(&self, index: u32) -> (u32, u32) {
        if index < self.full_large_count {
            (self.full_large_parameter, self.large_part)
        } else if index < self.full_large_count + self.full_small_count {
            (self.full_small_parameter, self.large_part)
        } else {
            (self.partial_parameter, self.small_part)
        }
    }
}
