use flowgen_dag::{QuadDagPool, TargetKind, VERTEX_COUNT};
use flowgen_rule::Rule;
use flowgen_types::Rng;

use crate::config::Config;
use crate::divider::quarters;
use crate::error::Error;
use crate::instantiate::{instantiate_bits, instantiate_fields, instantiate_rules, perturb};
use crate::params::ParamCalc;
use crate::select::SelectorIndex;
use crate::state::ProblemState;
use crate::virtuals::{select_virtuals, split_virtuals, SplitOutcome, VirtualSelection};

/// Result of one recursion node: rules for the final set and the child
/// subproblems anchored at the splitted virtual parents.
#[derive(Debug)]
pub struct LocalOutcome {
    pub emitted: Vec<Rule>,
    pub children: Vec<ProblemState>,
}

/// Solve one `ProblemState`: select a profile, pick and uniquify virtual
/// parents when the problem spans more than one fragment, instantiate the
/// mixed candidate set into the parent's match space, and hand back the
/// solids plus the child states.
pub fn solve_local(
    state: &ProblemState,
    config: &Config,
    pool: &QuadDagPool,
    index: &SelectorIndex,
    kind: TargetKind,
    calc: &mut ParamCalc,
    rng: &mut Rng,
) -> Result<LocalOutcome, Error> {
    let profile_id = index.select(state, calc, rng)?;
    let profile = pool.profile(profile_id);

    let selection = if state.n > VERTEX_COUNT as u32 {
        select_virtuals(state, profile, kind, calc, rng)?
    } else {
        VirtualSelection {
            picks: Vec::new(),
            parameters: Vec::new(),
        }
    };

    let SplitOutcome {
        mut rules,
        allow_wildcard,
    } = split_virtuals(state, profile, &selection.picks, rng)?;
    instantiate_bits(&mut rules, rng);
    let mut user_rules = instantiate_fields(&rules, state, profile, config, rng)?;
    instantiate_rules(&mut user_rules, &state.parent);
    perturb(&mut user_rules, &state.parent, config, rng);

    let solid_count = (state.n as usize).min(VERTEX_COUNT);
    let parent_rules = user_rules.split_off(solid_count);
    let pieces: Vec<u32> = quarters(state.n.saturating_sub(VERTEX_COUNT as u32))
        .into_iter()
        .filter(|&d| d > 0)
        .collect();
    debug_assert_eq!(parent_rules.len(), pieces.len());
    let children = parent_rules
        .into_iter()
        .zip(pieces)
        .zip(selection.parameters.iter().zip(allow_wildcard))
        .map(|((parent, n), (&p, wildcard))| ProblemState::new(n, p, wildcard, parent, config))
        .collect();

    Ok(LocalOutcome {
        emitted: user_rules,
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgen_dag::{InstantiateMode, QuadDagPool};
    use flowgen_rule::{rule_set, MatchType, RuleLayout};

    fn lpm_config(widths: &[u8]) -> Config {
        let mut layout = RuleLayout::with_field_count(widths.len());
        for (i, w) in widths.iter().enumerate() {
            layout.set_kind(i, MatchType::Lpm);
            layout.set_width(i, *w);
        }
        Config::new(layout)
    }

    #[test]
    fn remainder_node_emits_exactly_n_rules() {
        let pool = QuadDagPool::generate(InstantiateMode::Normal);
        let kind = TargetKind::DependencyLength;
        let index = SelectorIndex::build(&pool, kind);
        let config = lpm_config(&[8, 8, 8]);
        let mut calc = ParamCalc::new(16);
        let mut rng = Rng::new(7);
        let state = ProblemState::new(4, 6, true, config.layout.wildcard_rule(), &config);
        let outcome =
            solve_local(&state, &config, &pool, &index, kind, &mut calc, &mut rng).unwrap();
        assert_eq!(outcome.emitted.len(), 4);
        assert!(outcome.children.is_empty());
        for i in 0..4 {
            assert!(rule_set::is_sorted(&outcome.emitted, i));
        }
        // a p = 6 fragment carries a full dependency chain
        for i in 0..3 {
            assert_ne!(
                outcome.emitted[i].edge_type_to(&outcome.emitted[i + 1]),
                flowgen_rule::EdgeType::None
            );
        }
    }

    #[test]
    fn union_node_spawns_children_inside_their_parents() {
        let pool = QuadDagPool::generate(InstantiateMode::Normal);
        let kind = TargetKind::DependencyLength;
        let index = SelectorIndex::build(&pool, kind);
        let config = lpm_config(&[16, 16, 16]);
        let mut calc = ParamCalc::new(64);
        let mut rng = Rng::new(8);
        let state = ProblemState::new(16, 0, true, config.layout.wildcard_rule(), &config);
        let outcome =
            solve_local(&state, &config, &pool, &index, kind, &mut calc, &mut rng).unwrap();
        assert_eq!(outcome.emitted.len(), 4);
        assert_eq!(outcome.children.len(), 4);
        let total_child_rules: u32 = outcome.children.iter().map(|c| c.n).sum();
        assert_eq!(total_child_rules, 12);
        for child in &outcome.children {
            assert_eq!(child.p, 0);
            assert!(state.parent.cover(&child.parent));
        }
    }
}
