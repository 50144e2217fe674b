use flowgen_rule::{OutputStyle, RuleLayout};
use flowgen_types::DEFAULT_SEED;

use crate::pareto::Pareto;

pub const DEFAULT_TRACE_COUNT: u32 = 1000;

/// Configuration of one trace generation run.
#[derive(Debug, Clone)]
pub struct TraceConfig {
    pub trace_count: u32,
    /// Trace count as a multiplier of the rule count; used when no absolute
    /// count is given.
    pub density: f64,
    pub layout: RuleLayout,
    pub rule_distribution: Pareto,
    pub flow_distribution: Pareto,
    pub seed: u32,
    pub style: OutputStyle,
    pub fast: bool,
}

impl TraceConfig {
    pub fn new(layout: RuleLayout) -> Self {
        Self {
            trace_count: 0,
            density: 0.0,
            layout,
            rule_distribution: Pareto::new(0.0, 0.0),
            flow_distribution: Pareto::new(1.0, 1.0),
            seed: DEFAULT_SEED,
            style: OutputStyle::FlowBench,
            fast: false,
        }
    }

    /// Resolve the effective trace count and mode once the rule count is
    /// known. Without a rule-level distribution there is no rule-level
    /// locality to model, so the run degrades to fast mode.
    pub fn resolve(&mut self, rule_count: u32) {
        if self.trace_count == 0 && self.density > 0.0 {
            self.trace_count = (f64::from(rule_count) * self.density) as u32;
        }
        if self.trace_count == 0 {
            self.trace_count = DEFAULT_TRACE_COUNT;
        }
        if self.rule_distribution.alpha() == 0.0 {
            self.fast = true;
        }
    }
}
