use flowgen_rule::{EdgeType, Rule};

use crate::quad_dag::{QuadDag, PAIR_COUNT};

const TRIANGLES: [(usize, usize, usize); 4] = [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)];

/// Whether a tagging can be realized by any candidate rule set at all. Each
/// vertex triangle must be transitively consistent: covering is transitive,
/// and a rule disjoint from a covering rule is disjoint from the covered one.
pub fn dag_is_valid(dag: &QuadDag) -> bool {
    TRIANGLES.iter().all(|&(a, b, c)| {
        let ab = dag.edge(a, b);
        let ac = dag.edge(a, c);
        let bc = dag.edge(b, c);
        !((ab == EdgeType::Cover && bc == EdgeType::Cover && ac != EdgeType::Cover)
            || (ab == EdgeType::None && bc == EdgeType::Cover && ac != EdgeType::None)
            || (ab == EdgeType::Cover && bc != EdgeType::None && ac == EdgeType::None)
            || (ab == EdgeType::None && bc != EdgeType::None && ac == EdgeType::Cover))
    })
}

/// Whether the edges pointing at `dst` match the relations the rules realize.
pub fn satisfies(dag: &QuadDag, rules: &[Rule], dst: usize) -> bool {
    (0..dst).all(|i| dag.edge(i, dst) == rules[i].edge_type_to(&rules[dst]))
}

/// All 3^6 edge taggings, all-None first, in ternary counter order.
pub fn enumerate_dags() -> impl Iterator<Item = QuadDag> {
    (0..3u32.pow(PAIR_COUNT as u32)).map(|mut n| {
        let mut dag = QuadDag::new();
        for i in 0..PAIR_COUNT {
            let edge = match n % 3 {
                0 => EdgeType::None,
                1 => EdgeType::Overlap,
                _ => EdgeType::Cover,
            };
            dag.set_edge_at(i, edge);
            n /= 3;
        }
        dag
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_is_complete() {
        let dags: Vec<QuadDag> = enumerate_dags().collect();
        assert_eq!(dags.len(), 729);
        assert_eq!(dags[0].to_string(), "NNNNNN");
        assert_eq!(dags[1].to_string(), "ONNNNN");
        assert_eq!(dags[728].to_string(), "CCCCCC");
    }

    #[test]
    fn transitive_cover_is_required() {
        // 0 covers 1, 1 covers 2, but 0 unrelated to 2: impossible
        let mut dag = QuadDag::new();
        dag.set_edge(0, 1, EdgeType::Cover);
        dag.set_edge(1, 2, EdgeType::Cover);
        assert!(!dag_is_valid(&dag));
        dag.set_edge(0, 2, EdgeType::Cover);
        assert!(dag_is_valid(&dag));
    }

    #[test]
    fn full_chain_is_valid() {
        let dag: QuadDag = "CCCCCC".parse().unwrap();
        assert!(dag_is_valid(&dag));
    }
}
