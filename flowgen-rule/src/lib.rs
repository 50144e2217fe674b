//! Match-field and rule primitives shared by the rule-set and trace
//! generators: the EM/LPM/RM field algebra, rule layouts (candidate and
//! user-defined), rules with their relation predicates, and the FlowBench /
//! ClassBench wire formats.

mod error;
mod field;
mod input;
mod layout;
mod output;
mod rule;
pub mod rule_set;

pub use error::{FieldError, LayoutError, ParseRuleError};
pub use field::Field;
pub use input::parse_rule;
pub use layout::{MatchType, Protocol, RuleLayout, CANDIDATE_FIELD_COUNT};
pub use output::{rule_to_string, OutputStyle};
pub use rule::{EdgeType, Rule};
