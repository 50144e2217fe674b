//! The QuadDag machinery: 4-vertex dependency fragments, their precomputed
//! profiles (solid and virtual candidate rules with per-rule dependency
//! attributes), the profile pool with its text-stream format, and the
//! profile precomputation pipeline.

mod analyze;
mod candidate_set;
mod instantiate;
mod pool;
mod profile;
mod quad_dag;
mod target;
mod trie;
mod virtualize;

pub use analyze::{dag_is_valid, enumerate_dags, satisfies};
pub use candidate_set::CandidateSet;
pub use instantiate::{instantiate, InstantiateMode};
pub use pool::{PoolError, QuadDagPool};
pub use profile::QuadDagProfile;
pub use quad_dag::{QuadDag, PAIR_COUNT, VERTEX_COUNT};
pub use target::TargetKind;
pub use trie::Trie;
pub use virtualize::virtualize;
