//! The trace pipeline: split a rule set into pairwise-disjoint isolate
//! rules, spread the requested packet count over rules and flows along
//! Pareto laws, map flow groups onto rules wide enough to host them, and
//! synthesize the shuffled packet sequence.

mod allocate;
mod config;
mod error;
mod flow;
mod isolate;
mod mapping;
mod pareto;

pub use allocate::allocate_traces;
pub use config::TraceConfig;
pub use error::Error;
pub use flow::{flow_to_string, Flow};
pub use isolate::isolate;
pub use mapping::{map_flows, map_rules, MappedGroup};
pub use pareto::{allocate, Pareto};

use flowgen_rule::Rule;
use flowgen_types::Rng;

/// Run the whole pipeline over a loaded rule set.
pub fn generate_trace(config: &TraceConfig, rules: &[Rule]) -> Result<Vec<Flow>, Error> {
    let mut rng = Rng::new(config.seed);
    let isolated = isolate(rules, &config.layout, config.fast);
    let allocations = allocate_traces(config, rules.len() as u32, &mut rng);
    let mut slots: Vec<Option<Rule>> = isolated.into_iter().map(Some).collect();
    let groups = map_rules(&mut slots, &config.layout, allocations, &mut rng)?;
    map_flows(groups, &config.layout, &mut rng)
}
