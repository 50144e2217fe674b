use std::collections::VecDeque;

use flowgen_engine::split_rule;
use flowgen_rule::{Rule, RuleLayout};
use flowgen_types::Rng;

use crate::error::Error;
use crate::flow::Flow;

/// One flow group bound to the isolate rule that hosts it.
#[derive(Debug)]
pub struct MappedGroup {
    pub rule: Rule,
    pub rule_index: u32,
    pub flows: Vec<u32>,
}

/// Bind every allocation to a rule wide enough for its flow count. The
/// isolate set is sorted ascending by available width, so a binary search
/// yields the first admissible rule; the pick is uniform above it, probed to
/// the nearest unvisited slot. A group nobody can host is merged into one
/// flow and retried against any unvisited rule; `NoRule` if that fails too.
pub fn map_rules(
    slots: &mut Vec<Option<Rule>>,
    layout: &RuleLayout,
    allocations: Vec<Vec<u32>>,
    rng: &mut Rng,
) -> Result<Vec<MappedGroup>, Error> {
    let mut groups = Vec::new();
    for mut allocation in allocations {
        if allocation.is_empty() {
            continue;
        }
        let needed_bits = (allocation.len() as f64).log2();
        let lower = slots.partition_point(|slot| {
            slot.as_ref()
                .map_or(true, |rule| f64::from(rule.total_available_width(layout)) < needed_bits)
        });
        let mut chosen = None;
        if lower < slots.len() {
            let pick = rng.next_range(lower as u32, slots.len() as u32 - 1) as usize;
            chosen = nearest_unvisited(slots, pick, lower);
        }
        let index = match chosen {
            Some(index) => index,
            None => {
                // merge the whole group into one flow and take any free rule
                let merged: u32 = allocation.iter().sum();
                allocation = vec![merged];
                let pick = rng.next_index(slots.len());
                nearest_unvisited(slots, pick, 0).ok_or(Error::NoRule)?
            }
        };
        let rule = slots[index].take().expect("unvisited slot");
        groups.push(MappedGroup {
            rule,
            rule_index: index as u32,
            flows: allocation,
        });
    }
    Ok(groups)
}

fn nearest_unvisited(slots: &[Option<Rule>], start: usize, lower: usize) -> Option<usize> {
    (start..slots.len())
        .find(|&i| slots[i].is_some())
        .or_else(|| (lower..=start).rev().find(|&i| slots[i].is_some()))
}

/// Synthesize the packets: split each mapped rule until it has one leaf per
/// flow, draw one exact-match packet per leaf, replicate it by its copy
/// count, and shuffle the whole trace through the shared stream.
pub fn map_flows(
    groups: Vec<MappedGroup>,
    layout: &RuleLayout,
    rng: &mut Rng,
) -> Result<Vec<Flow>, Error> {
    let mut trace = Vec::new();
    for group in groups {
        synthesize_group(group, layout, rng, &mut trace)?;
    }
    for i in (1..trace.len()).rev() {
        let j = rng.next_range(0, i as u32) as usize;
        trace.swap(i, j);
    }
    Ok(trace)
}

fn synthesize_group(
    group: MappedGroup,
    layout: &RuleLayout,
    rng: &mut Rng,
    trace: &mut Vec<Flow>,
) -> Result<(), Error> {
    let mut leaves = VecDeque::new();
    leaves.push_back(group.rule);
    while leaves.len() < group.flows.len() {
        let rule = leaves.pop_front().expect("non-empty");
        let (low, high) = split_rule(&rule, layout, |_| 1.0, rng).ok_or(Error::NoRule)?;
        leaves.push_back(low);
        leaves.push_back(high);
    }
    for (leaf, &copies) in leaves.iter().zip(&group.flows) {
        let flow = Flow::from_rule(leaf, layout, group.rule_index, rng);
        for _ in 0..copies {
            trace.push(flow.clone());
        }
    }
    Ok(())
}
