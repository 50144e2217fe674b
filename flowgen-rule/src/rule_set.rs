//! Rule-set invariant helpers. The sorted form demands that a covering rule
//! precede every rule it covers; the trace pipeline additionally reorders by
//! available width.

use crate::layout::RuleLayout;
use crate::rule::Rule;

/// Check the sorted form at `index`: no earlier rule may be covered by it.
pub fn is_sorted(rules: &[Rule], index: usize) -> bool {
    rules[..index].iter().all(|r| !rules[index].cover(r))
}

/// Reorder ascending by total available width (stable).
pub fn sort_by_available_width(rules: &mut Vec<Rule>, layout: &RuleLayout) {
    rules.sort_by_key(|rule| rule.total_available_width(layout));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::layout::{MatchType, RuleLayout};
    use flowgen_types::parse_binary;

    fn lpm_rule(spec: &str) -> Rule {
        Rule::new(vec![if spec == "*" {
            Field::lpm_any()
        } else {
            Field::lpm(parse_binary(spec).unwrap(), spec.len() as u8)
        }])
    }

    #[test]
    fn sorted_form() {
        let rules = vec![lpm_rule("*"), lpm_rule("1"), lpm_rule("10")];
        for i in 0..rules.len() {
            assert!(is_sorted(&rules, i));
        }
        let broken = vec![lpm_rule("10"), lpm_rule("1")];
        assert!(!is_sorted(&broken, 1));
    }

    #[test]
    fn width_sort_is_ascending() {
        let mut layout = RuleLayout::with_field_count(1);
        layout.set_kind(0, MatchType::Lpm);
        layout.set_width(0, 8);
        let mut rules = vec![lpm_rule("1"), lpm_rule("10101"), lpm_rule("101")];
        sort_by_available_width(&mut rules, &layout);
        let widths: Vec<u32> = rules
            .iter()
            .map(|r| r.total_available_width(&layout))
            .collect();
        assert_eq!(widths, vec![3, 5, 7]);
    }
}
