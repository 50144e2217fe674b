use flowgen_rule::CANDIDATE_FIELD_COUNT;

use crate::candidate_set::CandidateSet;
use crate::instantiate::{instantiate, InstantiateMode};
use crate::quad_dag::{QuadDag, VERTEX_COUNT};
use crate::target::TargetKind;
use crate::virtualize::virtualize;

/// The precomputed profile of one QuadDag: 4 solid rules realizing it, the
/// complete implied virtual-rule set, and the aggregates the selectors index.
#[derive(Debug, Clone)]
pub struct QuadDagProfile {
    dag: QuadDag,
    solids: CandidateSet,
    virtuals: CandidateSet,
    total_dependency_length: u8,
    total_edge_count: u8,
    exist_wildcard: bool,
    actual_field_count: u8,
    total_bit_width: u8,
    field_bit_widths: [u8; CANDIDATE_FIELD_COUNT],
}

impl QuadDagProfile {
    /// Instantiate and expand `dag`; `None` when no solid set realizes it.
    pub fn generate(dag: &QuadDag, mode: InstantiateMode) -> Option<Self> {
        let solids = instantiate(dag, mode)?;
        let mut solid_set = CandidateSet::from_rules(solids);
        solid_set.profile_as_solids(dag);
        let mut virtual_set = CandidateSet::from_rules(virtualize(solid_set.rules()));
        virtual_set.profile_as_virtuals(&solid_set);
        Some(Self::assemble(*dag, solid_set, virtual_set))
    }

    /// Build a profile from already-attributed rule sets (stream loading).
    pub fn assemble(dag: QuadDag, solids: CandidateSet, virtuals: CandidateSet) -> Self {
        let exist_wildcard = solids.rule(0).is_wildcard();
        let mut total_dependency_length = 0;
        let mut total_edge_count = 0;
        for i in 0..VERTEX_COUNT {
            total_dependency_length += solids.dependency_length(i);
            total_edge_count += solids.edge_count(i);
        }
        let mut field_bit_widths = [0u8; CANDIDATE_FIELD_COUNT];
        for (index, width) in field_bit_widths.iter_mut().enumerate() {
            for i in 0..VERTEX_COUNT {
                if let flowgen_rule::Field::Lpm { len, .. } = solids.rule(i).field(index) {
                    *width = (*width).max(*len);
                }
            }
        }
        let actual_field_count = field_bit_widths.iter().filter(|w| **w > 0).count() as u8;
        let total_bit_width = field_bit_widths.iter().sum();
        Self {
            dag,
            solids,
            virtuals,
            total_dependency_length,
            total_edge_count,
            exist_wildcard,
            actual_field_count,
            total_bit_width,
            field_bit_widths,
        }
    }

    pub fn dag(&self) -> &QuadDag {
        &self.dag
    }

    pub fn solids(&self) -> &CandidateSet {
        &self.solids
    }

    pub fn virtuals(&self) -> &CandidateSet {
        &self.virtuals
    }

    pub fn total_dependency_length(&self) -> u8 {
        self.total_dependency_length
    }

    pub fn total_edge_count(&self) -> u8 {
        self.total_edge_count
    }

    pub fn total_parameter(&self, kind: TargetKind) -> u8 {
        match kind {
            TargetKind::DependencyLength => self.total_dependency_length,
            TargetKind::EdgeCount => self.total_edge_count,
        }
    }

    pub fn exist_wildcard(&self) -> bool {
        self.exist_wildcard
    }

    pub fn actual_field_count(&self) -> u8 {
        self.actual_field_count
    }

    pub fn total_bit_width(&self) -> u8 {
        self.total_bit_width
    }

    pub fn field_bit_width(&self, index: usize) -> u8 {
        self.field_bit_widths[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dag_profile() {
        let dag = QuadDag::new();
        let profile =
            QuadDagProfile::generate(&dag, InstantiateMode::Normal).expect("realizable");
        assert_eq!(profile.total_dependency_length(), 0);
        assert_eq!(profile.total_edge_count(), 0);
        assert_eq!(profile.total_parameter(TargetKind::DependencyLength), 0);
        // four pairwise-disjoint rules cannot include a wildcard
        assert!(!profile.exist_wildcard());
        assert!(profile.total_bit_width() >= 2);
        assert_eq!(profile.solids().len(), 4);
        assert!(!profile.virtuals().is_empty());
    }

    #[test]
    fn chain_dag_profile() {
        let dag: QuadDag = "CCCCCC".parse().unwrap();
        let profile =
            QuadDagProfile::generate(&dag, InstantiateMode::Normal).expect("realizable");
        assert_eq!(profile.total_dependency_length(), 6);
        assert_eq!(profile.total_edge_count(), 6);
        assert!(profile.exist_wildcard());
    }
}
