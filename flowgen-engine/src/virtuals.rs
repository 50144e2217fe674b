use flowgen_dag::{QuadDagProfile, TargetKind, VERTEX_COUNT};
use flowgen_rule::Rule;
use flowgen_types::Rng;

use crate::divider::quarters;
use crate::error::Error;
use crate::gaussian::Gaussian;
use crate::params::ParamCalc;
use crate::sampler::weighted_choice;
use crate::state::ProblemState;

const P2_WEIGHT: Gaussian = Gaussian::new(
    0.0,
    (VERTEX_COUNT as f64 / 2.0) * (VERTEX_COUNT as f64 / 2.0),
);

/// The virtual parents chosen for the next recursion layer: one pool index
/// per nonempty divider piece, plus the parameter allocated to each child.
#[derive(Debug, Clone)]
pub struct VirtualSelection {
    pub picks: Vec<usize>,
    pub parameters: Vec<u32>,
}

/// Weighted choice of virtual parents. Weights accumulate across the divider
/// pieces: each piece widens the admissible parameter band and re-draws over
/// the running weight vector.
pub fn select_virtuals(
    state: &ProblemState,
    profile: &QuadDagProfile,
    kind: TargetKind,
    calc: &mut ParamCalc,
    rng: &mut Rng,
) -> Result<VirtualSelection, Error> {
    let n = state.n;
    let rest = n - VERTEX_COUNT as u32;
    let pieces = quarters(rest);
    let sum_of_max: u32 = pieces.iter().map(|&piece| calc.at(piece)).sum();
    let alpha2 = VERTEX_COUNT as f64 * f64::from(state.p) / f64::from(calc.at(n));
    let p1 = u32::from(profile.total_parameter(kind));
    let mut remaining = i64::from(state.p) - i64::from(p1);

    let virtuals = profile.virtuals();
    let virtual_max = i64::from(virtuals.max_parameter(kind));
    let virtual_min = i64::from(virtuals.min_parameter(kind));
    let mut weights = vec![0f64; virtuals.len()];
    let mut picks = Vec::new();
    let mut nonempty = Vec::new();
    for i in 0..VERTEX_COUNT {
        if pieces[i] == 0 {
            continue;
        }
        nonempty.push(pieces[i]);
        let tail: i64 = pieces[i + 1..].iter().map(|&d| i64::from(d)).sum();
        let piece = i64::from(pieces[i]);
        let max_p2 = {
            let spare = (remaining - virtual_min * tail) as f64 / piece as f64;
            spare.floor().min(VERTEX_COUNT as f64)
        };
        let min_p2 = {
            let spare = (remaining - i64::from(sum_of_max) - virtual_max * tail) as f64
                / piece as f64;
            spare.ceil().max(0.0)
        };
        for (j, weight) in weights.iter_mut().enumerate() {
            let p2 = f64::from(virtuals.parameter(j, kind));
            if p2 >= min_p2 && p2 <= max_p2 {
                *weight += P2_WEIGHT.density(p2 - alpha2);
            }
        }
        let pick = weighted_choice(&weights, rng)?;
        picks.push(pick);
        remaining -= piece * i64::from(virtuals.parameter(pick, kind));
    }
    if remaining < 0 {
        // the accumulated weights drew a parent outside the current band;
        // the inherited edges alone would overshoot the target
        return Err(Error::NoCandidate);
    }

    let parameters = allocate_parameters(&nonempty, remaining, sum_of_max, calc);
    Ok(VirtualSelection { picks, parameters })
}

/// Spread the remaining parameter over the children proportionally to their
/// maxima, then repair the rounding drift one unit at a time under the
/// per-child caps.
fn allocate_parameters(
    pieces: &[u32],
    remaining: i64,
    sum_of_max: u32,
    calc: &mut ParamCalc,
) -> Vec<u32> {
    if sum_of_max == 0 {
        return vec![0; pieces.len()];
    }
    let caps: Vec<u32> = pieces.iter().map(|&d| calc.at(d)).collect();
    let ratio = remaining as f64 / f64::from(sum_of_max);
    let mut parameters: Vec<u32> = caps.iter().map(|&cap| (f64::from(cap) * ratio) as u32).collect();
    let mut drift = remaining - parameters.iter().map(|&p| i64::from(p)).sum::<i64>();
    while drift > 0 {
        let mut moved = false;
        for (parameter, &cap) in parameters.iter_mut().zip(&caps) {
            if drift == 0 {
                break;
            }
            if *parameter < cap {
                *parameter += 1;
                drift -= 1;
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }
    while drift < 0 {
        let mut moved = false;
        for parameter in parameters.iter_mut() {
            if drift == 0 {
                break;
            }
            if *parameter > 0 {
                *parameter -= 1;
                drift += 1;
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }
    parameters
}

/// Materialize the mixed candidate set: the first min(n, 4) solids, then the
/// chosen virtual parents, uniquified with occurrence-counter suffixes when a
/// parent repeats. Split or originally-virtual parents admit wildcard-root
/// profiles downstream; unsplit solid parents do not.
#[derive(Debug)]
pub struct SplitOutcome {
    pub rules: Vec<Rule>,
    pub allow_wildcard: Vec<bool>,
}

pub fn split_virtuals(
    state: &ProblemState,
    profile: &QuadDagProfile,
    picks: &[usize],
    rng: &mut Rng,
) -> Result<SplitOutcome, Error> {
    let solid_count = (state.n as usize).min(VERTEX_COUNT);
    let mut rules: Vec<Rule> = (0..solid_count)
        .map(|i| profile.solids().rule(i).clone())
        .collect();
    if state.n <= VERTEX_COUNT as u32 {
        return Ok(SplitOutcome {
            rules,
            allow_wildcard: Vec::new(),
        });
    }

    let conflict_field = rng.next_index(usize::from(profile.actual_field_count().max(1)));
    let virtuals = profile.virtuals();
    let mut counter = vec![0u32; virtuals.len()];
    let mut conflict = vec![false; virtuals.len()];
    let mut max_counter = 0u32;
    for &pick in picks {
        counter[pick] += 1;
        if counter[pick] > 1 {
            conflict[pick] = true;
        }
        max_counter = max_counter.max(counter[pick]);
    }
    let mut conflict_width = 0u8;
    while (1u32 << conflict_width) < max_counter {
        conflict_width += 1;
    }

    let mut allow_wildcard = Vec::with_capacity(picks.len());
    for &pick in picks {
        let mut rule = virtuals.rule(pick).clone();
        if conflict_width > 0 && conflict[pick] {
            counter[pick] -= 1;
            rule.field_mut(conflict_field)
                .add_suffix(counter[pick], conflict_width)?;
        }
        rules.push(rule);
        allow_wildcard.push(!virtuals.is_solid(pick) || conflict[pick]);
    }
    Ok(SplitOutcome {
        rules,
        allow_wildcard,
    })
}
