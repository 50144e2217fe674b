use std::collections::VecDeque;

use tracing::{debug, info};

use flowgen_dag::{QuadDagPool, TargetKind};
use flowgen_rule::Rule;
use flowgen_types::Rng;

use crate::config::{Config, Target, TargetValue};
use crate::error::Error;
use crate::local::solve_local;
use crate::params::ParamCalc;
use crate::partition::{DensePartition, Partition, SparsePartition};
use crate::select::SelectorIndex;
use crate::state::ProblemState;

/// The global driver: owns the RNG, the memoized calculator and the selector
/// indexes, and runs the partition-retry loop around the recursive solver.
pub struct Generator<'a> {
    config: &'a Config,
    pool: &'a QuadDagPool,
    rng: Rng,
    calc: ParamCalc,
    index: SelectorIndex,
    kind: TargetKind,
    target: u32,
    attempts: u32,
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a Config, pool: &'a QuadDagPool) -> Self {
        let mut rng = Rng::new(config.seed);
        let mut calc = ParamCalc::new(config.rule_count);
        let (kind, target) = resolve_target(config, &mut calc, &mut rng);
        let index = SelectorIndex::build(pool, kind);
        Self {
            config,
            pool,
            rng,
            calc,
            index,
            kind,
            target,
            attempts: 0,
        }
    }

    pub fn target_kind(&self) -> TargetKind {
        self.kind
    }

    pub fn target_value(&self) -> u32 {
        self.target
    }

    /// Partition attempts consumed by the last `solve` call.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Produce the rule set: pick a partitioner by target density, then
    /// export origins and drain the subproblem queues, re-partitioning from
    /// scratch on every recoverable failure.
    pub fn solve(&mut self) -> Result<Vec<Rule>, Error> {
        let n = self.config.rule_count;
        let width = self.config.layout.available_bit_count();
        let mut partition = if self.target > self.calc.at(n) {
            Partition::Dense(DensePartition::new(n, self.target, width))
        } else {
            Partition::Sparse(SparsePartition::new(n, self.target, width))
        };
        if !partition.prepare(&mut self.calc) {
            return Err(Error::NoCandidate);
        }
        self.attempts = 0;
        loop {
            self.attempts += 1;
            let mut final_set = Vec::new();
            let mut origins = VecDeque::new();
            let exported = partition.export_origins(
                self.config,
                &mut self.calc,
                &mut self.rng,
                &mut final_set,
                &mut origins,
            );
            if exported {
                match self.solve_all(&mut final_set, &mut origins) {
                    Ok(()) => {
                        info!(
                            rules = final_set.len(),
                            attempts = self.attempts,
                            partition = %partition.describe(),
                            "rule set solved"
                        );
                        return Ok(final_set);
                    }
                    Err(error) => {
                        debug!(%error, partition = %partition.describe(), "attempt failed");
                    }
                }
            } else {
                debug!(partition = %partition.describe(), "origin export failed");
            }
            if !partition.add_partition(&mut self.calc) {
                return Err(Error::NoCandidate);
            }
        }
    }

    fn solve_all(
        &mut self,
        final_set: &mut Vec<Rule>,
        origins: &mut VecDeque<ProblemState>,
    ) -> Result<(), Error> {
        while let Some(origin) = origins.pop_front() {
            let mut states = VecDeque::new();
            states.push_back(origin);
            while let Some(state) = states.pop_front() {
                let outcome = solve_local(
                    &state,
                    self.config,
                    self.pool,
                    &self.index,
                    self.kind,
                    &mut self.calc,
                    &mut self.rng,
                )?;
                final_set.extend(outcome.emitted);
                states.extend(outcome.children);
            }
        }
        Ok(())
    }
}

fn resolve_target(config: &Config, calc: &mut ParamCalc, rng: &mut Rng) -> (TargetKind, u32) {
    match config.target {
        Some(Target {
            kind,
            value: TargetValue::Absolute(value),
        }) => (kind, value),
        Some(Target {
            kind,
            value: TargetValue::Relative(fraction),
        }) => {
            let max = calc.at(config.rule_count);
            (kind, (fraction * f64::from(max)) as u32)
        }
        None => {
            // unspecified runs get a random relative dependency-length target;
            // the draw happens first so the stream position is stable
            let fraction = rng.next_f64(0.0, 1.0);
            let max = calc.at(config.rule_count);
            (
                TargetKind::DependencyLength,
                (fraction * f64::from(max)) as u32,
            )
        }
    }
}
