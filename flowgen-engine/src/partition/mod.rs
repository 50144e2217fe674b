//! Decomposition of the global problem when the bit budget is tight: split
//! the wildcard into disjoint origins first, then solve each origin as its
//! own subproblem. Sparse partitioning splits into equal buckets; dense
//! partitioning commits a trie of solid rules whose internal nodes raise the
//! achievable parameter.

mod dense;
mod sparse;

pub use dense::DensePartition;
pub use sparse::SparsePartition;

use std::collections::VecDeque;

use flowgen_rule::Rule;
use flowgen_types::Rng;

use crate::config::Config;
use crate::params::ParamCalc;
use crate::state::ProblemState;

pub enum Partition {
    Sparse(SparsePartition),
    Dense(DensePartition),
}

impl Partition {
    /// Make the partitioner ready for its first export. The sparse strategy
    /// starts unpartitioned; the dense trie has to be built once.
    pub fn prepare(&mut self, calc: &mut ParamCalc) -> bool {
        match self {
            Partition::Sparse(_) => true,
            Partition::Dense(dense) => dense.add_partition(calc),
        }
    }

    pub fn add_partition(&mut self, calc: &mut ParamCalc) -> bool {
        match self {
            Partition::Sparse(sparse) => sparse.add_partition(calc),
            Partition::Dense(dense) => dense.add_partition(calc),
        }
    }

    pub fn export_origins(
        &self,
        config: &Config,
        calc: &mut ParamCalc,
        rng: &mut Rng,
        final_set: &mut Vec<Rule>,
        origins: &mut VecDeque<ProblemState>,
    ) -> bool {
        match self {
            Partition::Sparse(sparse) => sparse.export_origins(config, calc, rng, origins),
            Partition::Dense(dense) => dense.export_origins(config, rng, final_set, origins),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Partition::Sparse(sparse) => format!("sparse x{}", sparse.part_count()),
            Partition::Dense(dense) => format!("dense h={}", dense.height()),
        }
    }
}
