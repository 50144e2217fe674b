use flowgen_rule::{Rule, RuleLayout};
use flowgen_types::Rng;

use crate::sampler::weighted_choice;

/// Split a rule into two disjoint halves by appending one bit to a
/// weighted-drawn field with free width. `None` when every field is
/// exhausted or the suffix does not fit.
pub fn split_rule(
    rule: &Rule,
    layout: &RuleLayout,
    weight_of: impl Fn(usize) -> f64,
    rng: &mut Rng,
) -> Option<(Rule, Rule)> {
    let weights: Vec<f64> = (0..rule.field_count())
        .map(|i| {
            if rule.available_width(layout, i) > 0 {
                weight_of(i)
            } else {
                0.0
            }
        })
        .collect();
    let index = weighted_choice(&weights, rng).ok()?;
    let mut low = rule.clone();
    let mut high = rule.clone();
    low.field_mut(index).add_suffix(0, 1).ok()?;
    high.field_mut(index).add_suffix(1, 1).ok()?;
    Some((low, high))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgen_rule::MatchType;

    fn layout(widths: &[u8]) -> RuleLayout {
        let mut layout = RuleLayout::with_field_count(widths.len());
        for (i, w) in widths.iter().enumerate() {
            layout.set_kind(i, MatchType::Lpm);
            layout.set_width(i, *w);
        }
        layout
    }

    #[test]
    fn halves_are_disjoint_and_cover_the_parent() {
        let layout = layout(&[4, 4]);
        let mut rng = Rng::new(1);
        let parent = layout.wildcard_rule();
        let (low, high) = split_rule(&parent, &layout, |_| 1.0, &mut rng).unwrap();
        assert!(!low.overlap(&high));
        assert!(parent.cover(&low) && parent.cover(&high));
    }

    #[test]
    fn exhausted_rules_cannot_split() {
        let layout = layout(&[1]);
        let mut rng = Rng::new(2);
        let parent = layout.wildcard_rule();
        let (low, _) = split_rule(&parent, &layout, |_| 1.0, &mut rng).unwrap();
        // one bit of one field: the half is exhausted now
        assert!(split_rule(&low, &layout, |_| 1.0, &mut rng).is_none());
    }
}
