use strum::{Display, EnumString};

use flowgen_types::Key;

use crate::field::Field;
use crate::layout::RuleLayout;
use crate::rule::Rule;

/// Wire style of rule and trace files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum OutputStyle {
    FlowBench,
    ClassBench,
}

/// Serialize one rule. FlowBench lines start with `R ` and column-pad the
/// fields; ClassBench lines start with `@` and use `value/mask` forms.
pub fn rule_to_string(rule: &Rule, layout: &RuleLayout, style: OutputStyle) -> String {
    let fields: Vec<String> = (0..rule.field_count())
        .map(|i| field_to_string(rule.field(i), layout.width(i), style))
        .collect();
    match style {
        OutputStyle::FlowBench => format!("R {}", fields.join(" ")),
        OutputStyle::ClassBench => format!("@{}", fields.join(" ")),
    }
}

fn field_to_string(field: &Field, width: u8, style: OutputStyle) -> String {
    match (field, style) {
        (Field::Em { value, wildcard }, OutputStyle::FlowBench) => {
            let pad = usize::from(width / 4 + u8::from(width % 4 != 0)) + 3;
            let body = if *wildcard {
                "*".to_owned()
            } else {
                format!("0x{}", value.to_hex(width))
            };
            format!("{body:<pad$}")
        }
        (Field::Em { value, wildcard }, OutputStyle::ClassBench) => {
            let mask = if *wildcard { Key::ZERO } else { Key::MAX };
            format!("0x{}/0x{}", value.to_hex(width), mask.to_hex(width))
        }
        (Field::Lpm { prefix, len }, OutputStyle::FlowBench) => {
            let pad = usize::from(width) + 1;
            let body = if *len == 0 {
                "*".to_owned()
            } else {
                prefix.to_binary(*len)
            };
            format!("{body:<pad$}")
        }
        (Field::Lpm { prefix, len }, OutputStyle::ClassBench) => {
            if width == 32 {
                let addr = prefix.top32();
                format!(
                    "{}.{}.{}.{}/{}",
                    addr >> 24,
                    addr >> 16 & 0xff,
                    addr >> 8 & 0xff,
                    addr & 0xff,
                    len
                )
            } else {
                format!("0x{}/{}", prefix.to_hex(width), len)
            }
        }
        (Field::Rm { start, end }, OutputStyle::FlowBench) => {
            let pad = usize::from((width + 1) / 3 + 1);
            format!(
                "{:<pad$} : {:<pad$}",
                start.to_decimal(width),
                end.to_decimal(width)
            )
        }
        (Field::Rm { start, end }, OutputStyle::ClassBench) => {
            format!("{} : {}", start.to_decimal(width), end.to_decimal(width))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{MatchType, Protocol};
    use flowgen_types::parse_binary;

    fn ipv4_rule() -> (Rule, RuleLayout) {
        let layout = RuleLayout::preset(Protocol::Ipv4);
        let mut rule = layout.wildcard_rule();
        rule.set_field(0, Field::lpm(parse_binary("1000").unwrap(), 4));
        rule.set_field(2, Field::rm32(0, 1023 << 16));
        rule.set_field(4, Field::em(Key::new(6 << 120)));
        (rule, layout)
    }

    #[test]
    fn flowbench_style() {
        let (rule, layout) = ipv4_rule();
        let line = rule_to_string(&rule, &layout, OutputStyle::FlowBench);
        assert!(line.starts_with("R 1000"));
        assert!(line.contains("0x06"));
        assert!(line.contains("0 "));
        assert!(line.contains(" : "));
    }

    #[test]
    fn classbench_style() {
        let (rule, layout) = ipv4_rule();
        let line = rule_to_string(&rule, &layout, OutputStyle::ClassBench);
        assert!(line.starts_with("@128.0.0.0/4"));
        assert!(line.contains("0.0.0.0/0"));
        assert!(line.contains("0 : 1023"));
        assert!(line.contains("0 : 65535"));
        assert!(line.contains("0x06/0xff"));
    }

    #[test]
    fn narrow_lpm_classbench_uses_hex() {
        let mut layout = RuleLayout::with_field_count(1);
        layout.set_kind(0, MatchType::Lpm);
        layout.set_width(0, 6);
        let mut rule = layout.wildcard_rule();
        rule.set_field(0, Field::lpm(parse_binary("101").unwrap(), 3));
        let line = rule_to_string(&rule, &layout, OutputStyle::ClassBench);
        assert_eq!(line, "@0x28/3");
    }
}
