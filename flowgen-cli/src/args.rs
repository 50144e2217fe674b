use thiserror::Error;

use flowgen_engine::{Config, Target, DEFAULT_RULE_COUNT};
use flowgen_rule::{MatchType, OutputStyle, Protocol, RuleLayout};
use flowgen_trace::{Pareto, TraceConfig};
use flowgen_types::DEFAULT_SEED;

#[derive(Debug, Error)]
pub enum ArgsError {
    #[error("Unknown parameter: {0}")]
    Unknown(String),
    #[error("option {0} expects a value")]
    MissingValue(String),
    #[error("invalid value {value:?} for option {option}")]
    BadValue { option: String, value: String },
}

/// Parsed rule-generator invocation.
#[derive(Debug)]
pub struct RulegenArgs {
    pub config: Config,
    pub output: String,
}

/// Parsed trace-generator invocation.
#[derive(Debug)]
pub struct TracegenArgs {
    pub config: TraceConfig,
    pub input: String,
    pub output: String,
}

struct Cursor<I: Iterator<Item = String>> {
    inner: I,
}

impl<I: Iterator<Item = String>> Cursor<I> {
    fn value(&mut self, option: &str) -> Result<String, ArgsError> {
        self.inner
            .next()
            .ok_or_else(|| ArgsError::MissingValue(option.to_owned()))
    }

    fn parse<T: std::str::FromStr>(&mut self, option: &str) -> Result<T, ArgsError> {
        let value = self.value(option)?;
        value.parse().map_err(|_| ArgsError::BadValue {
            option: option.to_owned(),
            value,
        })
    }
}

/// Parse the rule-generator grammar; `argv` excludes the program name.
pub fn parse_rulegen(argv: impl IntoIterator<Item = String>) -> Result<RulegenArgs, ArgsError> {
    let mut cursor = Cursor {
        inner: argv.into_iter(),
    };
    let mut layout = RuleLayout::with_field_count(0);
    let mut rule_count: u32 = 0;
    let mut output = String::new();
    let mut field_weights: Vec<f64> = Vec::new();
    let mut seed = DEFAULT_SEED;
    let mut style = OutputStyle::FlowBench;
    let mut arbitrary_range = false;
    let mut dense_profiles = false;
    let mut target: Option<Target> = None;

    while let Some(flag) = cursor.inner.next() {
        match flag.as_str() {
            "-n" => rule_count = cursor.parse(&flag)?,
            "-o" => output = cursor.value(&flag)?,
            "-f" => layout = RuleLayout::with_field_count(cursor.parse(&flag)?),
            "-fw" | "--field-width" => {
                for index in 0..layout.field_count() {
                    layout.set_width(index, cursor.parse(&flag)?);
                }
            }
            "-ft" | "--field-type" => {
                for index in 0..layout.field_count() {
                    let kind: MatchType = cursor.parse(&flag)?;
                    layout.set_kind(index, kind);
                }
            }
            "-fwt" | "--field-weight" => {
                field_weights.clear();
                for _ in 0..layout.field_count() {
                    field_weights.push(cursor.parse(&flag)?);
                }
            }
            "-D" => target = Some(Target::dependency_absolute(cursor.parse(&flag)?)),
            "-E" => target = Some(Target::edges_absolute(cursor.parse(&flag)?)),
            "-d" => target = Some(Target::dependency_relative(cursor.parse(&flag)?)),
            "-e" => target = Some(Target::edges_relative(cursor.parse(&flag)?)),
            "-r" | "--random-seed" => seed = cursor.parse(&flag)?,
            "--flowbench" => style = OutputStyle::FlowBench,
            "--classbench" => style = OutputStyle::ClassBench,
            "-ar" | "--arbitrary-range" => arbitrary_range = true,
            "--dense" => dense_profiles = true,
            "-p" | "--protocol" => {
                let protocol: Protocol = cursor.parse(&flag)?;
                layout = RuleLayout::preset(protocol);
            }
            other => return Err(ArgsError::Unknown(other.to_owned())),
        }
    }

    if rule_count == 0 {
        rule_count = DEFAULT_RULE_COUNT;
    }
    if output.is_empty() {
        output = format!("{rule_count}.txt");
    }
    if layout.field_count() == 0 {
        layout = RuleLayout::preset(Protocol::Ipv4);
    }
    let mut config = Config::new(layout);
    config.rule_count = rule_count;
    if !field_weights.is_empty() {
        config.field_weights = field_weights;
    }
    config.seed = seed;
    config.style = style;
    config.arbitrary_range = arbitrary_range;
    config.dense_profiles = dense_profiles;
    config.target = target;
    Ok(RulegenArgs { config, output })
}

/// Parse the trace-generator grammar; `argv` excludes the program name.
pub fn parse_tracegen(argv: impl IntoIterator<Item = String>) -> Result<TracegenArgs, ArgsError> {
    let mut cursor = Cursor {
        inner: argv.into_iter(),
    };
    let mut layout = RuleLayout::with_field_count(0);
    let mut trace_count: u32 = 0;
    let mut density: f64 = 0.0;
    let mut input = String::new();
    let mut output = String::new();
    let mut rule_distribution = Pareto::new(0.0, 0.0);
    let mut flow_distribution = Pareto::new(1.0, 1.0);
    let mut seed = DEFAULT_SEED;
    let mut style = OutputStyle::FlowBench;
    let mut fast = false;

    while let Some(flag) = cursor.inner.next() {
        match flag.as_str() {
            "-n" => trace_count = cursor.parse(&flag)?,
            "-d" => density = cursor.parse(&flag)?,
            "-i" => input = cursor.value(&flag)?,
            "-o" => output = cursor.value(&flag)?,
            "-f" => layout = RuleLayout::with_field_count(cursor.parse(&flag)?),
            "-fw" | "--field-width" => {
                for index in 0..layout.field_count() {
                    layout.set_width(index, cursor.parse(&flag)?);
                }
            }
            "-ft" | "--field-type" => {
                for index in 0..layout.field_count() {
                    let kind: MatchType = cursor.parse(&flag)?;
                    layout.set_kind(index, kind);
                }
            }
            "-rd" => {
                rule_distribution = Pareto::new(cursor.parse(&flag)?, cursor.parse(&flag)?);
            }
            "-fd" => {
                flow_distribution = Pareto::new(cursor.parse(&flag)?, cursor.parse(&flag)?);
            }
            "-s" => seed = cursor.parse(&flag)?,
            "--flowbench" => style = OutputStyle::FlowBench,
            "--classbench" => style = OutputStyle::ClassBench,
            "--fast" => fast = true,
            "-p" | "--protocol" => {
                let protocol: Protocol = cursor.parse(&flag)?;
                layout = RuleLayout::preset(protocol);
            }
            other => return Err(ArgsError::Unknown(other.to_owned())),
        }
    }

    if input.is_empty() {
        input = "input.txt".to_owned();
    }
    if output.is_empty() {
        output = format!("{input}_trace");
    }
    if layout.field_count() == 0 {
        layout = RuleLayout::preset(Protocol::Ipv4);
    }
    let mut config = TraceConfig::new(layout);
    config.trace_count = trace_count;
    config.density = density;
    config.rule_distribution = rule_distribution;
    config.flow_distribution = flow_distribution;
    config.seed = seed;
    config.style = style;
    config.fast = fast;
    Ok(TracegenArgs {
        config,
        input,
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgen_dag::TargetKind;
    use flowgen_engine::TargetValue;

    fn argv(line: &str) -> impl Iterator<Item = String> + '_ {
        line.split_whitespace().map(str::to_owned)
    }

    #[test]
    fn rulegen_full_grammar() {
        let args = parse_rulegen(argv(
            "-n 16 -f 2 -fw 4 4 -ft LPM LPM -fwt 2 1 -E 15 -r 42 --classbench -ar",
        ))
        .unwrap();
        assert_eq!(args.config.rule_count, 16);
        assert_eq!(args.config.layout.field_count(), 2);
        assert_eq!(args.config.layout.width(1), 4);
        assert_eq!(args.config.layout.kind(0), MatchType::Lpm);
        assert_eq!(args.config.field_weights, vec![2.0, 1.0]);
        assert_eq!(args.config.seed, 42);
        assert_eq!(args.config.style, OutputStyle::ClassBench);
        assert!(args.config.arbitrary_range);
        let target = args.config.target.unwrap();
        assert_eq!(target.kind, TargetKind::EdgeCount);
        assert_eq!(target.value, TargetValue::Absolute(15));
        assert_eq!(args.output, "16.txt");
    }

    #[test]
    fn rulegen_defaults() {
        let args = parse_rulegen(argv("")).unwrap();
        assert_eq!(args.config.rule_count, 4096);
        assert_eq!(args.config.layout.field_count(), 5);
        assert_eq!(args.output, "4096.txt");
        assert!(args.config.target.is_none());
    }

    #[test]
    fn relative_targets_are_case_distinct() {
        let upper = parse_rulegen(argv("-D 3")).unwrap().config.target.unwrap();
        assert_eq!(upper.value, TargetValue::Absolute(3));
        let lower = parse_rulegen(argv("-d 0.5")).unwrap().config.target.unwrap();
        assert_eq!(lower.kind, TargetKind::DependencyLength);
        assert_eq!(lower.value, TargetValue::Relative(0.5));
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(matches!(
            parse_rulegen(argv("-n 8 --bogus")),
            Err(ArgsError::Unknown(flag)) if flag == "--bogus"
        ));
    }

    #[test]
    fn tracegen_grammar() {
        let args = parse_tracegen(argv(
            "-n 2000 -i rules.txt -fd 1.2 0.8 -rd 1.5 1.0 -s 3 --fast -p ipv4",
        ))
        .unwrap();
        assert_eq!(args.config.trace_count, 2000);
        assert_eq!(args.input, "rules.txt");
        assert_eq!(args.output, "rules.txt_trace");
        assert_eq!(args.config.rule_distribution, Pareto::new(1.5, 1.0));
        assert_eq!(args.config.flow_distribution, Pareto::new(1.2, 0.8));
        assert_eq!(args.config.seed, 3);
        assert!(args.config.fast);
        assert_eq!(args.config.layout.field_count(), 5);
    }

    #[test]
    fn tracegen_density() {
        let args = parse_tracegen(argv("-d 2.0")).unwrap();
        assert_eq!(args.config.trace_count, 0);
        assert_eq!(args.config.density, 2.0);
        assert_eq!(args.input, "input.txt");
        assert_eq!(args.output, "input.txt_trace");
    }
}
