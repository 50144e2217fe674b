use flowgen_rule::{OutputStyle, Rule, RuleLayout};
use flowgen_types::{Key, Rng};

/// One synthesized packet header: an exact value per field plus the index of
/// the isolate rule it matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flow {
    keys: Vec<Key>,
    rule_index: u32,
}

impl Flow {
    /// Draw one packet inside `rule`, field by field.
    pub fn from_rule(rule: &Rule, layout: &RuleLayout, rule_index: u32, rng: &mut Rng) -> Self {
        let keys = (0..rule.field_count())
            .map(|i| rule.field(i).hit(layout.class(i), rng))
            .collect();
        Self { keys, rule_index }
    }

    pub fn key(&self, index: usize) -> Key {
        self.keys[index]
    }

    pub fn rule_index(&self) -> u32 {
        self.rule_index
    }

    /// Whether the packet lands inside every field of `rule`.
    pub fn matches(&self, rule: &Rule) -> bool {
        self.keys
            .iter()
            .zip(rule.fields())
            .all(|(key, field)| field.min() <= *key && *key <= field.max())
    }
}

/// Serialize one trace line: the field values in the wire style, then the
/// matched rule index as the last token.
pub fn flow_to_string(flow: &Flow, layout: &RuleLayout, style: OutputStyle) -> String {
    match style {
        OutputStyle::FlowBench => {
            let fields: Vec<String> = (0..layout.field_count())
                .map(|i| format!("0x{}", flow.key(i).to_hex(layout.width(i))))
                .collect();
            format!("{}  {}", fields.join(" "), flow.rule_index())
        }
        OutputStyle::ClassBench => {
            let fields: Vec<String> = (0..layout.field_count())
                .map(|i| flow.key(i).to_decimal(layout.width(i)))
                .collect();
            format!("{} {}", fields.join(","), flow.rule_index())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgen_rule::{Field, MatchType};

    fn layout() -> RuleLayout {
        let mut layout = RuleLayout::with_field_count(2);
        layout.set_kind(0, MatchType::Lpm);
        layout.set_width(0, 8);
        layout.set_kind(1, MatchType::Rm);
        layout.set_width(1, 16);
        layout
    }

    #[test]
    fn drawn_flows_match_their_rule() {
        let layout = layout();
        let mut rng = Rng::new(5);
        let mut rule = layout.wildcard_rule();
        rule.set_field(0, Field::lpm(Key::new(0b101 << 125), 3));
        rule.set_field(1, Field::rm32(10 << 16, 20 << 16));
        for _ in 0..50 {
            let flow = Flow::from_rule(&rule, &layout, 3, &mut rng);
            assert!(flow.matches(&rule));
        }
    }

    #[test]
    fn wire_forms() {
        let layout = layout();
        let flow = Flow {
            keys: vec![Key::new(0xab << 120), Key::new(0x0102 << 112)],
            rule_index: 7,
        };
        assert_eq!(
            flow_to_string(&flow, &layout, OutputStyle::FlowBench),
            "0xab 0x0102  7"
        );
        assert_eq!(
            flow_to_string(&flow, &layout, OutputStyle::ClassBench),
            "171,258 7"
        );
    }
}
