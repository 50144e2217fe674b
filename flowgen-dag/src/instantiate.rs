use flowgen_rule::{rule_set, Field, Rule, RuleLayout, CANDIDATE_FIELD_COUNT};
use flowgen_types::Key;

use crate::analyze::satisfies;
use crate::quad_dag::{QuadDag, VERTEX_COUNT};

const MAX_BIT_WIDTH: u8 = 4;
const MIN_SUM_BIT_WIDTH: u8 = 2;
const MAX_SUM_BIT_WIDTH: u8 = 5;

/// Solid-rule search strategy. Normal extensions always append a fresh low
/// bit, which keeps every rule hittable by some packet; dense extensions may
/// reuse the committed width, spending fewer bits overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstantiateMode {
    Normal,
    Dense,
}

impl InstantiateMode {
    fn next_bit_width(self, width: u8) -> u8 {
        match self {
            InstantiateMode::Normal => width + 1,
            InstantiateMode::Dense => width,
        }
    }
}

/// Search for 4 solid candidate rules realizing `dag`, minimizing the total
/// bit width first and the used field count second. `None` when the tagging
/// cannot be realized within the budgets.
pub fn instantiate(dag: &QuadDag, mode: InstantiateMode) -> Option<Vec<Rule>> {
    let layout = RuleLayout::candidate();
    for sum_bit_width in MIN_SUM_BIT_WIDTH..=MAX_SUM_BIT_WIDTH {
        for field_count in 1..=CANDIDATE_FIELD_COUNT {
            let mut search = Search {
                mode,
                sum_bit_width,
                field_count,
                possible: init_possible_fields(MAX_BIT_WIDTH.min(sum_bit_width)),
            };
            let mut rules = vec![layout.wildcard_rule(); VERTEX_COUNT];
            if search.instantiate_rule(dag, &mut rules, 0, 0) {
                return Some(rules);
            }
        }
    }
    None
}

struct Search {
    mode: InstantiateMode,
    sum_bit_width: u8,
    field_count: usize,
    // per-field pools of admissible LPM values, grown around committed rules
    possible: Vec<Vec<Field>>,
}

fn init_possible_fields(max_bit_width: u8) -> Vec<Vec<Field>> {
    (0..CANDIDATE_FIELD_COUNT)
        .map(|_| {
            (0..=max_bit_width)
                .map(|len| Field::lpm(Key::ZERO, len))
                .collect()
        })
        .collect()
}

fn prefix_len(field: &Field) -> u8 {
    match field {
        Field::Lpm { len, .. } => *len,
        _ => 0,
    }
}

impl Search {
    fn instantiate_rule(
        &mut self,
        dag: &QuadDag,
        rules: &mut Vec<Rule>,
        rule_index: usize,
        used_field_count: usize,
    ) -> bool {
        if rule_index == VERTEX_COUNT {
            return true;
        }
        let mut field_index = [0usize; CANDIDATE_FIELD_COUNT];
        loop {
            let mut new_used_field_count = 0;
            for i in 0..self.field_count {
                if field_index[i] > 0 {
                    new_used_field_count = new_used_field_count.max(i + 1);
                }
                rules[rule_index].set_field(i, self.possible[i][field_index[i]].clone());
            }
            if rule_set::is_sorted(rules, rule_index) && satisfies(dag, rules, rule_index) {
                let saved: Vec<usize> = self.possible.iter().map(Vec::len).collect();
                let committed = rules[rule_index].clone();
                for i in 0..CANDIDATE_FIELD_COUNT {
                    self.extend(i, committed.field(i));
                }
                if self.instantiate_rule(dag, rules, rule_index + 1, new_used_field_count) {
                    return true;
                }
                for (pool, len) in self.possible.iter_mut().zip(saved) {
                    pool.truncate(len);
                }
            }
            if !self.next_field_index(&mut field_index, used_field_count) {
                return false;
            }
        }
    }

    /// Advance to the next field combination within the bit-sum budget.
    fn next_field_index(
        &self,
        field_index: &mut [usize; CANDIDATE_FIELD_COUNT],
        used_field_count: usize,
    ) -> bool {
        loop {
            let mut all_max = true;
            for i in 0..self.field_count {
                if field_index[i] < self.possible[i].len() - 1 {
                    field_index[i] += 1;
                    all_max = false;
                    break;
                }
                field_index[i] = usize::from(i >= used_field_count);
            }
            if all_max {
                return false;
            }
            let sum: u8 = (0..self.field_count)
                .map(|i| prefix_len(&self.possible[i][field_index[i]]))
                .sum();
            if sum <= self.sum_bit_width {
                return true;
            }
        }
    }

    /// Widen the pool of field `index` with values adjacent to a committed
    /// field: each bit of the committed prefix flipped, at every admissible
    /// deeper width.
    fn extend(&mut self, index: usize, field: &Field) {
        let (prefix, cur_len) = match field {
            Field::Lpm { prefix, len } if *len > 0 => (*prefix, *len),
            _ => return,
        };
        let max_bit_width = MAX_BIT_WIDTH.min(self.sum_bit_width);
        for i in 1..=cur_len {
            let flipped = prefix ^ Key::HIGH_BIT.shr(u32::from(i) - 1);
            for len in self.mode.next_bit_width(i)..=max_bit_width {
                // keep the prefix canonical: no bits below the prefix length
                let masked = flipped & !Key::MAX.shr(u32::from(len));
                let candidate = Field::lpm(masked, len);
                if !self.possible[index].contains(&candidate) {
                    self.possible[index].push(candidate);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::{dag_is_valid, enumerate_dags};
    use flowgen_rule::EdgeType;

    #[test]
    fn realizes_the_empty_dag() {
        let dag = QuadDag::new();
        let rules = instantiate(&dag, InstantiateMode::Normal).expect("NNNNNN is realizable");
        assert_eq!(rules.len(), 4);
        for i in 0..4 {
            for j in 0..i {
                assert_eq!(rules[j].edge_type_to(&rules[i]), EdgeType::None);
            }
        }
    }

    #[test]
    fn realizes_the_full_chain() {
        let dag: QuadDag = "CCCCCC".parse().unwrap();
        let rules = instantiate(&dag, InstantiateMode::Normal).expect("chain is realizable");
        for i in 0..4 {
            for j in 0..i {
                assert_eq!(rules[j].edge_type_to(&rules[i]), EdgeType::Cover);
            }
        }
    }

    #[test]
    fn every_valid_dag_reconstructs_its_edges() {
        let mut realized = 0usize;
        for dag in enumerate_dags() {
            if !dag_is_valid(&dag) {
                continue;
            }
            if let Some(rules) = instantiate(&dag, InstantiateMode::Normal) {
                realized += 1;
                for dst in 0..4 {
                    assert!(satisfies(&dag, &rules, dst), "dag {dag}");
                }
            }
        }
        assert!(realized > 100, "only {realized} taggings realized");
    }
}
