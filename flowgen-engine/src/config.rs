use flowgen_dag::TargetKind;
use flowgen_rule::{LayoutError, MatchType, OutputStyle, RuleLayout};
use flowgen_types::DEFAULT_SEED;

pub const DEFAULT_RULE_COUNT: u32 = 4096;

/// The dependency target of a run, absolute or as a fraction of the maximum
/// achievable parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub kind: TargetKind,
    pub value: TargetValue,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetValue {
    Absolute(u32),
    Relative(f64),
}

impl Target {
    pub fn dependency_absolute(value: u32) -> Self {
        Self {
            kind: TargetKind::DependencyLength,
            value: TargetValue::Absolute(value),
        }
    }

    pub fn dependency_relative(fraction: f64) -> Self {
        Self {
            kind: TargetKind::DependencyLength,
            value: TargetValue::Relative(fraction),
        }
    }

    pub fn edges_absolute(value: u32) -> Self {
        Self {
            kind: TargetKind::EdgeCount,
            value: TargetValue::Absolute(value),
        }
    }

    pub fn edges_relative(fraction: f64) -> Self {
        Self {
            kind: TargetKind::EdgeCount,
            value: TargetValue::Relative(fraction),
        }
    }
}

/// Immutable configuration of one rule-set generation run. No process-wide
/// state: the configuration and the RNG are threaded explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub rule_count: u32,
    pub layout: RuleLayout,
    pub field_weights: Vec<f64>,
    pub seed: u32,
    pub style: OutputStyle,
    pub arbitrary_range: bool,
    pub dense_profiles: bool,
    /// `None` resolves to a random relative dependency-length target.
    pub target: Option<Target>,
}

impl Config {
    pub fn new(layout: RuleLayout) -> Self {
        let field_weights = default_field_weights(&layout);
        Self {
            rule_count: DEFAULT_RULE_COUNT,
            layout,
            field_weights,
            seed: DEFAULT_SEED,
            style: OutputStyle::FlowBench,
            arbitrary_range: false,
            dense_profiles: false,
            target: None,
        }
    }

    /// Per-field selection weight; fields past the configured vector weigh 1.
    pub fn field_weight(&self, index: usize) -> f64 {
        self.field_weights.get(index).copied().unwrap_or(1.0)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        self.layout.validate()
    }
}

/// Default weights: a field's own width for LPM/RM, 1.0 for EM.
pub fn default_field_weights(layout: &RuleLayout) -> Vec<f64> {
    (0..layout.field_count())
        .map(|i| {
            if layout.kind(i) == MatchType::Em {
                1.0
            } else {
                f64::from(layout.width(i))
            }
        })
        .collect()
}
