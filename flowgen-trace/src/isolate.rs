use itertools::Itertools;
use tracing::debug;

use flowgen_rule::{rule_set, Field, Rule, RuleLayout};

/// A flat list of pairwise non-overlapping rules carved from one input rule.
#[derive(Debug, Default)]
struct IsolateSet {
    rules: Vec<Rule>,
}

impl IsolateSet {
    fn new(rule: Rule) -> Self {
        Self { rules: vec![rule] }
    }

    /// Re-carve every member overlapping `rule` into the cartesian product
    /// of per-field differences over the fields where they differ. Members
    /// whose remainder is unrepresentable are subsumed by `rule` and drop
    /// out. `false` when the set carved itself away entirely.
    fn split_by(&mut self, rule: &Rule) -> bool {
        let mut carved = Vec::new();
        for member in self.rules.drain(..) {
            let Some(different) = different_fields(&member, rule) else {
                // disjoint somewhere, nothing to carve
                carved.push(member);
                continue;
            };
            if different.is_empty() {
                // the member is identical to the splitting rule
                continue;
            }
            let Some(pieces) = field_differences(&member, rule, &different) else {
                continue;
            };
            for combination in pieces.iter().map(|p| p.iter()).multi_cartesian_product() {
                let mut piece = member.clone();
                for (&index, field) in different.iter().zip(combination) {
                    piece.set_field(index, field.clone());
                }
                carved.push(piece);
            }
        }
        self.rules = carved;
        !self.rules.is_empty()
    }
}

/// Field indexes where the rules overlap but differ; `None` when the rules
/// are disjoint in some field.
fn different_fields(a: &Rule, b: &Rule) -> Option<Vec<usize>> {
    let mut different = Vec::new();
    for index in 0..a.field_count() {
        if !a.field(index).overlap(b.field(index)) {
            return None;
        }
        if a.field(index) != b.field(index) {
            different.push(index);
        }
    }
    Some(different)
}

fn field_differences(a: &Rule, b: &Rule, different: &[usize]) -> Option<Vec<Vec<Field>>> {
    different
        .iter()
        .map(|&index| {
            a.field(index)
                .difference(b.field(index))
                .filter(|pieces| !pieces.is_empty())
        })
        .collect()
}

/// Split a rule set into pairwise non-overlapping rules covering the same
/// match space, sorted ascending by available width. When isolation is
/// unrepresentable (a set carves itself away) or fast mode is requested, the
/// input is used as-is.
pub fn isolate(rules: &[Rule], layout: &RuleLayout, fast: bool) -> Vec<Rule> {
    let mut out = if fast {
        rules.to_vec()
    } else {
        match isolate_sets(rules) {
            Some(sets) => sets,
            None => {
                debug!("isolation collapsed a rule; falling back to fast mode");
                rules.to_vec()
            }
        }
    };
    rule_set::sort_by_available_width(&mut out, layout);
    out
}

fn isolate_sets(rules: &[Rule]) -> Option<Vec<Rule>> {
    let mut sets: Vec<IsolateSet> = Vec::with_capacity(rules.len());
    for rule in rules {
        for set in sets.iter_mut() {
            if !set.split_by(rule) {
                return None;
            }
        }
        sets.push(IsolateSet::new(rule.clone()));
    }
    Some(sets.into_iter().flat_map(|set| set.rules).collect())
}
