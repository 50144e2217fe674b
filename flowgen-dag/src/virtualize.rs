use flowgen_rule::{Rule, CANDIDATE_FIELD_COUNT};

use crate::trie::Trie;

/// Expand 4 solid candidate rules into the complete virtual-rule set: the
/// cartesian product of per-field trie leaves. Every product cell is either
/// disjoint from or contained in each solid, which is what lets a cell serve
/// as a recursion anchor with exactly accounted dependencies.
pub fn virtualize(solids: &[Rule]) -> Vec<Rule> {
    let mut tries: Vec<Trie> = (0..CANDIDATE_FIELD_COUNT).map(|_| Trie::new()).collect();
    for rule in solids {
        for (index, trie) in tries.iter_mut().enumerate() {
            trie.insert(rule.field(index));
        }
    }
    let leaves: Vec<_> = tries.iter().map(Trie::leaves).collect();
    let mut out = Vec::new();
    for a in &leaves[0] {
        for b in &leaves[1] {
            for c in &leaves[2] {
                out.push(Rule::new(vec![a.clone(), b.clone(), c.clone()]));
            }
        }
    }
    out
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
    fn product_over_leaf_partitions() {
        let solids = vec![
            lpm_rule(&["*", "*", "*"]),
            lpm_rule(&["0", "*", "*"]),
            lpm_rule(&["1", "0", "*"]),
            lpm_rule(&["1", "1", "*"]),
        ];
        let virtuals = virtualize(&solids);
        // field 0 leaves: {0, 1}; field 1 leaves: {0, 1}; field 2: {*}
        assert_eq!(virtuals.len(), 4);
        // every virtual is contained in or disjoint from every solid
        for v in &virtuals {
            for s in &solids {
                assert!(s.cover(v) || !s.overlap(v));
            }
        }
    }
}
