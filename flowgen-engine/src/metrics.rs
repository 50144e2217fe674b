use flowgen_dag::TargetKind;
use flowgen_rule::{EdgeType, Rule};

/// Measure the dependency parameter a rule set realizes: the sum over rules
/// of either the longest chain of non-None edges ending there, or the
/// in-degree. Quadratic; meant for tests and reports, not the hot path.
pub fn total_parameter(rules: &[Rule], kind: TargetKind) -> u32 {
    let mut chain = vec![0u32; rules.len()];
    let mut total = 0u32;
    for i in 0..rules.len() {
        let mut in_degree = 0u32;
        for j in 0..i {
            if rules[j].edge_type_to(&rules[i]) != EdgeType::None {
                chain[i] = chain[i].max(chain[j] + 1);
                in_degree += 1;
            }
        }
        total += match kind {
            TargetKind::DependencyLength => chain[i],
            TargetKind::EdgeCount => in_degree,
        };
    }
    total
}
