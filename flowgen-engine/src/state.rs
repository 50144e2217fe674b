use flowgen_rule::{MatchType, Rule};

use crate::config::Config;

/// One node of the synthesis recursion: how many rules to produce inside the
/// parent's match space, under which remaining parameter, and which user
/// fields are still worth drawing.
#[derive(Debug, Clone)]
pub struct ProblemState {
    pub n: u32,
    pub p: u32,
    /// Number of fields with room to spare (> 1 free bit and nonzero weight).
    pub k: u8,
    /// Wildcard-root profiles are inadmissible below an unsplit solid parent.
    pub allow_wildcard: bool,
    pub parent: Rule,
    pub available_widths: Vec<u8>,
    pub field_weights: Vec<f64>,
}

impl ProblemState {
    pub fn new(n: u32, p: u32, allow_wildcard: bool, parent: Rule, config: &Config) -> Self {
        let field_count = config.layout.field_count();
        let mut k = 0u8;
        let mut available_widths = vec![0u8; field_count];
        let mut field_weights = vec![0f64; field_count];
        for i in 0..field_count {
            field_weights[i] = config.field_weight(i);
            if config.layout.kind(i) == MatchType::Em && !parent.field(i).is_wildcard() {
                // an exact-match value is already pinned upstream
                field_weights[i] = 0.0;
            } else {
                available_widths[i] = parent.available_width(&config.layout, i);
                if available_widths[i] > 1 && field_weights[i] > 0.0 {
                    k += 1;
                }
            }
        }
        Self {
            n,
            p,
            k,
            allow_wildcard,
            parent,
            available_widths,
            field_weights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgen_rule::{Field, Protocol, RuleLayout};
    use flowgen_types::Key;

    #[test]
    fn wildcard_parent_keeps_all_fields() {
        let config = Config::new(RuleLayout::preset(Protocol::Ipv4));
        let parent = config.layout.wildcard_rule();
        let state = ProblemState::new(16, 3, true, parent, &config);
        assert_eq!(state.available_widths, vec![32, 32, 16, 16, 0]);
        // the EM protocol field has no width to offer
        assert_eq!(state.k, 4);
        assert_eq!(state.field_weights[4], 1.0);
    }

    #[test]
    fn pinned_em_field_is_disabled() {
        let config = Config::new(RuleLayout::preset(Protocol::Ipv4));
        let mut parent = config.layout.wildcard_rule();
        parent.set_field(4, Field::em(Key::new(6 << 120)));
        let state = ProblemState::new(4, 0, false, parent, &config);
        assert_eq!(state.field_weights[4], 0.0);
        assert_eq!(state.available_widths[4], 0);
    }
}
