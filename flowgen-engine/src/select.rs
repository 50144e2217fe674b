use flowgen_dag::{QuadDagPool, TargetKind, PAIR_COUNT, VERTEX_COUNT};
use flowgen_rule::CANDIDATE_FIELD_COUNT;
use flowgen_types::Rng;

use crate::divider::quarters;
use crate::error::Error;
use crate::gaussian::Gaussian;
use crate::params::ParamCalc;
use crate::sampler::weighted_choice;
use crate::state::ProblemState;

const P_DIM: usize = PAIR_COUNT + 1;

// lut[n-1][k-1][p]: profiles whose first n solid rules use at most k fields
// and have cumulative parameter exactly p.
type RemainderTable = [[[Vec<u32>; P_DIM]; CANDIDATE_FIELD_COUNT]; VERTEX_COUNT];
// lut[k-1][p1][Mp2-1][mp2]: profiles using at most k fields, intra-fragment
// parameter p1, virtual max parameter >= Mp2 and virtual min parameter <= mp2.
type UnionTable = [[[[Vec<u32>; VERTEX_COUNT]; VERTEX_COUNT]; P_DIM]; CANDIDATE_FIELD_COUNT];

const P1_WEIGHT: Gaussian = Gaussian::new(0.0, (PAIR_COUNT as f64 / 2.0) * (PAIR_COUNT as f64 / 2.0));

/// Materialized admissibility indexes over the profile pool. Selection in
/// the inner recursion is an O(1) bucket lookup plus a uniform draw.
#[derive(Debug)]
pub struct SelectorIndex {
    remainder: Box<RemainderTable>,
    remainder_nw: Box<RemainderTable>,
    union_all: Box<UnionTable>,
    union_nw: Box<UnionTable>,
}

impl SelectorIndex {
    pub fn build(pool: &QuadDagPool, kind: TargetKind) -> Self {
        let mut index = Self {
            remainder: Box::default(),
            remainder_nw: Box::default(),
            union_all: Box::default(),
            union_nw: Box::default(),
        };
        for (id, profile) in pool.iter().enumerate() {
            let id = id as u32;
            let first_field = usize::from(profile.actual_field_count().max(1)) - 1;
            let solids = profile.solids();
            let mut cumulative = 0usize;
            for n in 0..VERTEX_COUNT {
                cumulative += usize::from(solids.parameter(n, kind));
                for k in first_field..CANDIDATE_FIELD_COUNT {
                    index.remainder[n][k][cumulative].push(id);
                    if !profile.exist_wildcard() {
                        index.remainder_nw[n][k][cumulative].push(id);
                    }
                }
            }
            let p1 = usize::from(profile.total_parameter(kind));
            let virtual_max = usize::from(profile.virtuals().max_parameter(kind));
            let virtual_min = usize::from(profile.virtuals().min_parameter(kind));
            for k in first_field..CANDIDATE_FIELD_COUNT {
                for cap in 0..virtual_max.min(VERTEX_COUNT) {
                    for floor in virtual_min..VERTEX_COUNT {
                        index.union_all[k][p1][cap][floor].push(id);
                        if !profile.exist_wildcard() {
                            index.union_nw[k][p1][cap][floor].push(id);
                        }
                    }
                }
            }
        }
        index
    }

    /// Pick a profile for `state`: remainder path for n <= 4, union path
    /// above.
    pub fn select(
        &self,
        state: &ProblemState,
        calc: &mut ParamCalc,
        rng: &mut Rng,
    ) -> Result<usize, Error> {
        if state.n <= VERTEX_COUNT as u32 {
            self.select_remainder(state, rng)
        } else {
            self.select_union(state, calc, rng)
        }
    }

    fn select_remainder(&self, state: &ProblemState, rng: &mut Rng) -> Result<usize, Error> {
        let k = usize::from(state.k.clamp(1, CANDIDATE_FIELD_COUNT as u8));
        let n = state.n as usize;
        if state.p as usize >= P_DIM {
            return Err(Error::NoCandidate);
        }
        let table = if state.allow_wildcard {
            &self.remainder
        } else {
            &self.remainder_nw
        };
        let bucket = &table[n - 1][k - 1][state.p as usize];
        if bucket.is_empty() {
            return Err(Error::NoCandidate);
        }
        Ok(bucket[rng.next_index(bucket.len())] as usize)
    }

    fn select_union(
        &self,
        state: &ProblemState,
        calc: &mut ParamCalc,
        rng: &mut Rng,
    ) -> Result<usize, Error> {
        let k = usize::from(state.k.clamp(1, CANDIDATE_FIELD_COUNT as u8));
        let n = state.n;
        let p = state.p;
        let rest = n - VERTEX_COUNT as u32;
        let sum_of_max: u32 = quarters(rest).iter().map(|&piece| calc.at(piece)).sum();
        let max_p1 = p.min(PAIR_COUNT as u32);
        let floor_bound = VERTEX_COUNT as u32 * rest + sum_of_max;
        let min_p1 = p.saturating_sub(floor_bound);
        let alpha1 = PAIR_COUNT as f64 * f64::from(p) / f64::from(calc.at(n));
        let table = if state.allow_wildcard {
            &self.union_all
        } else {
            &self.union_nw
        };
        let mut weights = [0f64; P_DIM];
        let mut buckets: [Option<&Vec<u32>>; P_DIM] = [None; P_DIM];
        for p1 in min_p1..=max_p1 {
            let spare = f64::from(p) - f64::from(p1) - f64::from(sum_of_max);
            let min_max_p2 = (spare / f64::from(rest)).ceil().max(1.0) as usize;
            let max_min_p2 = ((p - p1) / rest).min(VERTEX_COUNT as u32 - 1) as usize;
            if min_max_p2 > VERTEX_COUNT {
                continue;
            }
            let bucket = &table[k - 1][p1 as usize][min_max_p2 - 1][max_min_p2];
            if !bucket.is_empty() {
                weights[p1 as usize] = P1_WEIGHT.density(f64::from(p1) - alpha1);
                buckets[p1 as usize] = Some(bucket);
            }
        }
        let p1 = weighted_choice(&weights, rng)?;
        let bucket = buckets[p1].ok_or(Error::NoCandidate)?;
        Ok(bucket[rng.next_index(bucket.len())] as usize)
    }
}
