use flowgen_dag::QuadDagProfile;
use flowgen_rule::{Field, MatchType, Rule, CANDIDATE_FIELD_COUNT};
use flowgen_types::{Key, Rng};

use crate::config::Config;
use crate::error::Error;
use crate::sampler::weighted_choice;
use crate::state::ProblemState;

/// XOR fresh random masks into every candidate rule's LPM prefixes so the
/// generated prefixes do not all grow from zero. Prefix lengths and the
/// pairwise relations are preserved.
pub fn instantiate_bits(rules: &mut [Rule], rng: &mut Rng) {
    let mut masks = [Key::ZERO; CANDIDATE_FIELD_COUNT];
    for mask in masks.iter_mut() {
        *mask = Key::from_top32(rng.next_u32());
    }
    for rule in rules.iter_mut() {
        for (index, mask) in masks.iter().enumerate() {
            rule.field_mut(index).xor_prefix(*mask);
        }
    }
}

fn prefix_len(field: &Field) -> u8 {
    match field {
        Field::Lpm { len, .. } => *len,
        _ => 0,
    }
}

/// Map candidate fields onto user fields and convert the mixed candidate set
/// into user rules. Candidate fields are placed in decreasing order of
/// required width via weighted draws; exact-match fields encountered on the
/// way are remembered and later pinned to one shared random value.
pub fn instantiate_fields(
    rules: &[Rule],
    state: &ProblemState,
    profile: &QuadDagProfile,
    config: &Config,
    rng: &mut Rng,
) -> Result<Vec<Rule>, Error> {
    let user_fields = config.layout.field_count();
    let actual = usize::from(profile.actual_field_count());
    let mut mapping: [Option<usize>; CANDIDATE_FIELD_COUNT] = [None; CANDIDATE_FIELD_COUNT];
    let mut weights = state.field_weights.clone();
    let mut mapped = vec![false; user_fields];
    let mut em_fields: Vec<usize> = Vec::new();

    let mut required = [0u8; CANDIDATE_FIELD_COUNT];
    for rule in rules {
        for (slot, width) in required.iter_mut().enumerate().take(actual) {
            *width = (*width).max(prefix_len(rule.field(slot)));
        }
    }
    let mut order: [usize; CANDIDATE_FIELD_COUNT] = [0, 1, 2];
    order[..actual].sort_by(|&a, &b| required[b].cmp(&required[a]));

    for &slot in &order[..actual] {
        let width = required[slot];
        loop {
            let index = weighted_choice(&weights, rng)?;
            weights[index] = 0.0;
            if state.available_widths[index] >= width {
                mapping[slot] = Some(index);
                mapped[index] = true;
                break;
            } else if config.layout.kind(index) == MatchType::Em {
                em_fields.push(index);
            }
        }
    }
    // leftover candidate slots take the next free user fields, when any
    let mut next_free = 0usize;
    for slot in actual..CANDIDATE_FIELD_COUNT {
        while next_free < user_fields && mapped[next_free] {
            next_free += 1;
        }
        if next_free < user_fields {
            mapping[slot] = Some(next_free);
            next_free += 1;
        }
    }

    let mut out: Vec<Rule> = rules
        .iter()
        .map(|rule| Rule::from_candidate(rule, &mapping, &config.layout))
        .collect();
    for &index in &em_fields {
        let mut field = Field::em_any();
        field.randomize(config.layout.class(index), rng);
        for rule in &mut out {
            rule.set_field(index, field.clone());
        }
    }
    Ok(out)
}

/// Compose every rule into the parent's match space, field by field.
pub fn instantiate_rules(rules: &mut [Rule], parent: &Rule) {
    for index in 0..parent.field_count() {
        for rule in rules.iter_mut() {
            rule.field_mut(index).set_parent(parent.field(index));
        }
    }
}

/// Arbitrary-range diversification: nudge each range field by shrinking
/// random offsets, keeping the first perturbation that leaves the overlap
/// signature against every other rule unchanged.
pub fn perturb(rules: &mut Vec<Rule>, parent: &Rule, config: &Config, rng: &mut Rng) {
    if !config.arbitrary_range {
        return;
    }
    for index in 0..config.layout.field_count() {
        if config.layout.kind(index) != MatchType::Rm {
            continue;
        }
        let parent_min = i64::from(parent.field(index).min().top32());
        let parent_max = i64::from(parent.field(index).max().top32());
        for j in 0..rules.len() {
            let min = i64::from(rules[j].field(index).min().top32());
            let max = i64::from(rules[j].field(index).max().top32());
            let range = max - min + 1;
            let mut radius = range / 4;
            while radius > 0 {
                let offset_min = rng.next_i64(-radius, radius);
                let offset_max = rng.next_i64(-radius, radius);
                let new_min = (min + offset_min).max(parent_min);
                let new_max = (max + offset_max).min(parent_max);
                if new_min <= new_max {
                    let mut candidate = rules[j].clone();
                    candidate.set_field(index, Field::rm32(new_min as u32, new_max as u32));
                    let signature_kept = rules.iter().enumerate().all(|(k, other)| {
                        k == j || other.overlap(&rules[j]) == other.overlap(&candidate)
                    });
                    if signature_kept {
                        rules[j] = candidate;
                        break;
                    }
                }
                radius /= 2;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgen_dag::{InstantiateMode, QuadDagPool};
    use flowgen_rule::{EdgeType, RuleLayout};

    fn lpm_config(widths: &[u8]) -> Config {
        let mut layout = RuleLayout::with_field_count(widths.len());
        for (i, w) in widths.iter().enumerate() {
            layout.set_kind(i, MatchType::Lpm);
            layout.set_width(i, *w);
        }
        Config::new(layout)
    }

    #[test]
    fn masks_preserve_relations() {
        let pool = QuadDagPool::generate(InstantiateMode::Normal);
        let mut rng = Rng::new(20);
        for id in [0usize, 5, 50] {
            let mut rules = pool.profile(id).solids().rules().to_vec();
            let before: Vec<Vec<EdgeType>> = rules
                .iter()
                .map(|a| rules.iter().map(|b| a.edge_type_to(b)).collect())
                .collect();
            instantiate_bits(&mut rules, &mut rng);
            let after: Vec<Vec<EdgeType>> = rules
                .iter()
                .map(|a| rules.iter().map(|b| a.edge_type_to(b)).collect())
                .collect();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn field_mapping_lands_in_wide_enough_fields() {
        let pool = QuadDagPool::generate(InstantiateMode::Normal);
        let config = lpm_config(&[8, 8, 8]);
        let mut rng = Rng::new(21);
        let parent = config.layout.wildcard_rule();
        let state = ProblemState::new(4, 0, true, parent, &config);
        for id in 0..20 {
            let rules = pool.profile(id).solids().rules().to_vec();
            let out =
                instantiate_fields(&rules, &state, pool.profile(id), &config, &mut rng).unwrap();
            assert_eq!(out.len(), rules.len());
            // relations survive the re-shaping
            for (a_idx, a) in rules.iter().enumerate() {
                for (b_idx, b) in rules.iter().enumerate() {
                    assert_eq!(
                        a.edge_type_to(b),
                        out[a_idx].edge_type_to(&out[b_idx]),
                        "profile {id} rules {a_idx},{b_idx}"
                    );
                }
            }
        }
    }

    #[test]
    fn narrow_layout_cannot_hold_wide_profiles() {
        let pool = QuadDagPool::generate(InstantiateMode::Normal);
        // one 2-bit field cannot host profiles needing 3+ bits in one field
        let config = lpm_config(&[2]);
        let mut rng = Rng::new(22);
        let parent = config.layout.wildcard_rule();
        let state = ProblemState::new(4, 0, true, parent, &config);
        let wide = pool
            .iter()
            .position(|p| p.field_bit_width(0) > 2)
            .expect("some profile needs more than 2 bits");
        let rules = pool.profile(wide).solids().rules().to_vec();
        let result = instantiate_fields(&rules, &state, pool.profile(wide), &config, &mut rng);
        assert_eq!(result.unwrap_err(), Error::NoCandidate);
    }

    #[test]
    fn parent_composition_nests_rules() {
        let config = lpm_config(&[8]);
        let mut parent = config.layout.wildcard_rule();
        parent
            .field_mut(0)
            .add_suffix(1, 2)
            .unwrap(); // parent prefix 01
        let mut rules = vec![config.layout.wildcard_rule()];
        rules[0].field_mut(0).add_suffix(1, 1).unwrap(); // child suffix 1
        instantiate_rules(&mut rules, &parent);
        match rules[0].field(0) {
            Field::Lpm { prefix, len } => {
                assert_eq!(*len, 3);
                assert_eq!(prefix.to_binary(3), "011");
            }
            _ => unreachable!(),
        }
        assert!(parent.cover(&rules[0]));
    }
}
