use flowgen_rule::{EdgeType, Rule};

use crate::quad_dag::QuadDag;
use crate::target::TargetKind;

/// A candidate rule set annotated with per-rule dependency attributes:
/// `d` is the length of the longest chain of non-None edges ending at the
/// rule, `e` its in-degree, `s` whether the rule equals some solid rule.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    rules: Vec<Rule>,
    dependency_length: Vec<u8>,
    edge_count: Vec<u8>,
    solid: Vec<bool>,
}

impl CandidateSet {
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule(&self, index: usize) -> &Rule {
        &self.rules[index]
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Append one rule with its attributes (profile stream loading).
    pub fn push_profiled(&mut self, rule: Rule, d: u8, e: u8, s: bool) {
        self.rules.push(rule);
        self.dependency_length.push(d);
        self.edge_count.push(e);
        self.solid.push(s);
    }

    pub fn dependency_length(&self, index: usize) -> u8 {
        self.dependency_length[index]
    }

    pub fn edge_count(&self, index: usize) -> u8 {
        self.edge_count[index]
    }

    pub fn is_solid(&self, index: usize) -> bool {
        self.solid[index]
    }

    pub fn parameter(&self, index: usize, kind: TargetKind) -> u8 {
        match kind {
            TargetKind::DependencyLength => self.dependency_length[index],
            TargetKind::EdgeCount => self.edge_count[index],
        }
    }

    pub fn min_parameter(&self, kind: TargetKind) -> u8 {
        let values = match kind {
            TargetKind::DependencyLength => &self.dependency_length,
            TargetKind::EdgeCount => &self.edge_count,
        };
        values.iter().copied().min().unwrap_or(0)
    }

    pub fn max_parameter(&self, kind: TargetKind) -> u8 {
        let values = match kind {
            TargetKind::DependencyLength => &self.dependency_length,
            TargetKind::EdgeCount => &self.edge_count,
        };
        values.iter().copied().max().unwrap_or(0)
    }

    /// Attribute the rules as the solid set of `dag`: chains and in-degrees
    /// follow the tagged edges, every rule is solid.
    pub fn profile_as_solids(&mut self, dag: &QuadDag) {
        let n = self.rules.len();
        self.dependency_length = vec![0; n];
        self.edge_count = vec![0; n];
        self.solid = vec![true; n];
        for i in 0..n {
            for j in 0..i {
                if dag.edge(j, i) != EdgeType::None {
                    self.dependency_length[i] =
                        self.dependency_length[i].max(self.dependency_length[j] + 1);
                    self.edge_count[i] += 1;
                }
            }
        }
    }

    /// Attribute the rules as the virtual set implied by `solids`.
    pub fn profile_as_virtuals(&mut self, solids: &CandidateSet) {
        let n = self.rules.len();
        self.dependency_length = vec![0; n];
        self.edge_count = vec![0; n];
        self.solid = vec![false; n];
        for i in 0..n {
            for j in 0..solids.len() {
                if solids.rule(j).edge_type_to(&self.rules[i]) != EdgeType::None {
                    self.dependency_length[i] = self.dependency_length[i]
                        .max(solids.dependency_length(j) + 1);
                    self.edge_count[i] += 1;
                }
                if solids.rule(j) == &self.rules[i] {
                    self.solid[i] = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgen_rule::Field;
    use flowgen_types::parse_binary;

    fn lpm_rule(specs: &[&str]) -> Rule {
        Rule::new(
            specs
                .iter()
                .map(|s| {
                    if *s == "*" {
                        Field::lpm_any()
                    } else {
                        Field::lpm(parse_binary(s).unwrap(), s.len() as u8)
                    }
                })
                .collect(),
        )
    }

    #[test]
    fn chain_attributes() {
        // 0 covers 1 covers 2 covers 3
        let mut dag = QuadDag::new();
        for (src, dst) in [(0, 1), (1, 2), (2, 3), (0, 2), (0, 3), (1, 3)] {
            dag.set_edge(src, dst, EdgeType::Cover);
        }
        let rules = vec![
            lpm_rule(&["*", "*", "*"]),
            lpm_rule(&["0", "*", "*"]),
            lpm_rule(&["00", "*", "*"]),
            lpm_rule(&["000", "*", "*"]),
        ];
        let mut set = CandidateSet::from_rules(rules);
        set.profile_as_solids(&dag);
        assert_eq!(
            (0..4).map(|i| set.dependency_length(i)).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
        assert_eq!(
            (0..4).map(|i| set.edge_count(i)).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
        assert_eq!(set.parameter(3, TargetKind::DependencyLength), 3);
        assert_eq!(set.max_parameter(TargetKind::EdgeCount), 3);
    }

    #[test]
    fn virtual_attributes_count_covering_solids() {
        let mut dag = QuadDag::new();
        dag.set_edge(0, 1, EdgeType::Cover);
        let solids = vec![
            lpm_rule(&["0", "*", "*"]),
            lpm_rule(&["00", "*", "*"]),
            lpm_rule(&["10", "*", "*"]),
            lpm_rule(&["11", "*", "*"]),
        ];
        let mut solid_set = CandidateSet::from_rules(solids);
        solid_set.profile_as_solids(&dag);
        let virtuals = vec![lpm_rule(&["00", "*", "*"]), lpm_rule(&["01", "*", "*"])];
        let mut virtual_set = CandidateSet::from_rules(virtuals);
        virtual_set.profile_as_virtuals(&solid_set);
        // "00" is inside solids 0 and 1 and equals solid 1
        assert_eq!(virtual_set.edge_count(0), 2);
        assert_eq!(virtual_set.dependency_length(0), 2);
        assert!(virtual_set.is_solid(0));
        // "01" is only inside solid 0
        assert_eq!(virtual_set.edge_count(1), 1);
        assert!(!virtual_set.is_solid(1));
    }
}
