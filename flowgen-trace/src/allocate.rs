use flowgen_types::Rng;

use crate::config::TraceConfig;
use crate::pareto::allocate;

/// Spread the trace count over rules and flows. Fast mode draws flow groups
/// directly and assigns each to a uniformly drawn rule; otherwise a
/// rule-level Pareto fixes each rule's share first and a flow-level Pareto
/// splits the share into flows. The outer sequence comes back sorted by
/// descending size so the hungriest groups are mapped first.
pub fn allocate_traces(
    config: &TraceConfig,
    rule_count: u32,
    rng: &mut Rng,
) -> Vec<Vec<u32>> {
    let mut groups: Vec<Vec<u32>> = if config.fast {
        let flows = allocate(
            config.trace_count,
            u32::MAX,
            &config.flow_distribution,
            rng,
        );
        let mut buckets: Vec<Vec<u32>> = Vec::new();
        for count in flows {
            let index = rng.next_index(rule_count as usize);
            if buckets.len() <= index {
                buckets.resize_with(index + 1, Vec::new);
            }
            buckets[index].push(count);
        }
        buckets
    } else {
        allocate(
            config.trace_count,
            rule_count,
            &config.rule_distribution,
            rng,
        )
        .into_iter()
        .map(|share| allocate(share, u32::MAX, &config.flow_distribution, rng))
        .collect()
    };
    groups.sort_by(|a, b| b.len().cmp(&a.len()));
    groups
}
