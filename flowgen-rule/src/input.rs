use flowgen_types::{parse_binary, parse_decimal, parse_hex, Key, ParseKeyError};

use crate::error::ParseRuleError;
use crate::field::Field;
use crate::layout::{MatchType, RuleLayout};
use crate::output::OutputStyle;
use crate::rule::Rule;

/// Parse one rule line in either wire style, autodetected from the leading
/// `R` token (FlowBench) or `@` sigil (ClassBench).
pub fn parse_rule(line: &str, layout: &RuleLayout) -> Result<Rule, ParseRuleError> {
    let mut tokens: Vec<&str> = line.split_whitespace().collect();
    let style = match tokens.first().copied() {
        Some("R") => {
            tokens.remove(0);
            OutputStyle::FlowBench
        }
        Some(first) if first.starts_with('@') => {
            tokens[0] = &first[1..];
            OutputStyle::ClassBench
        }
        _ => return Err(ParseRuleError::UnknownStyle),
    };

    let mut rule = layout.wildcard_rule();
    let mut cursor = tokens.into_iter();
    for index in 0..layout.field_count() {
        let width = layout.width(index);
        let key_err = |source: ParseKeyError| ParseRuleError::Key { index, source };
        let field = match layout.kind(index) {
            MatchType::Em => {
                let token = cursor.next().ok_or(ParseRuleError::Truncated(index))?;
                parse_em(token, width, style, index)?
            }
            MatchType::Lpm => {
                let token = cursor.next().ok_or(ParseRuleError::Truncated(index))?;
                parse_lpm(token, width, style, index)?
            }
            MatchType::Rm => {
                let start = cursor.next().ok_or(ParseRuleError::Truncated(index))?;
                let colon = cursor.next().ok_or(ParseRuleError::Truncated(index))?;
                let end = cursor.next().ok_or(ParseRuleError::Truncated(index))?;
                if colon != ":" {
                    return Err(ParseRuleError::Malformed(index));
                }
                let start = parse_decimal(start, width).map_err(key_err)?;
                let end = parse_decimal(end, width).map_err(key_err)?;
                Field::rm32(start.top32(), end.top32())
            }
        };
        rule.set_field(index, field);
    }
    Ok(rule)
}

fn parse_em(
    token: &str,
    width: u8,
    style: OutputStyle,
    index: usize,
) -> Result<Field, ParseRuleError> {
    let key_err = |source: ParseKeyError| ParseRuleError::Key { index, source };
    match style {
        OutputStyle::FlowBench => {
            if token == "*" {
                Ok(Field::em_any())
            } else {
                Ok(Field::em(parse_hex(token, width).map_err(key_err)?))
            }
        }
        OutputStyle::ClassBench => {
            let (value, mask) = token
                .split_once('/')
                .ok_or(ParseRuleError::Malformed(index))?;
            let value = parse_hex(value, width).map_err(key_err)?;
            let mask = parse_hex(mask, width).map_err(key_err)?;
            if mask.is_zero() {
                Ok(Field::em_any())
            } else {
                Ok(Field::em(value))
            }
        }
    }
}

fn parse_lpm(
    token: &str,
    width: u8,
    style: OutputStyle,
    index: usize,
) -> Result<Field, ParseRuleError> {
    let key_err = |source: ParseKeyError| ParseRuleError::Key { index, source };
    match style {
        OutputStyle::FlowBench => {
            if token == "*" {
                Ok(Field::lpm_any())
            } else {
                let prefix = parse_binary(token).map_err(key_err)?;
                Ok(Field::lpm(prefix, token.len() as u8))
            }
        }
        OutputStyle::ClassBench => {
            let (prefix, len) = token
                .split_once('/')
                .ok_or(ParseRuleError::Malformed(index))?;
            let len: u8 = len.parse().map_err(|_| ParseRuleError::Malformed(index))?;
            let prefix = if width == 32 {
                let mut addr: u32 = 0;
                let mut octets = 0;
                for part in prefix.split('.') {
                    let octet: u8 = part.parse().map_err(|_| ParseRuleError::Malformed(index))?;
                    addr = addr << 8 | u32::from(octet);
                    octets += 1;
                }
                if octets != 4 {
                    return Err(ParseRuleError::Malformed(index));
                }
                Key::from_top32(addr)
            } else {
                parse_hex(prefix, width).map_err(key_err)?
            };
            Ok(Field::lpm(prefix, len))
        }
    }
}
