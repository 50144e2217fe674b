use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::process::ExitCode;
use std::time::Instant;

use tracing::{error, info};

use flowgen_cli::args::parse_tracegen;
use flowgen_cli::init_tracing;
use flowgen_rule::{parse_rule, Rule};
use flowgen_trace::{flow_to_string, generate_trace};

fn main() -> ExitCode {
    init_tracing();
    let mut args = match parse_tracegen(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(error) = args.config.layout.validate() {
        eprintln!("invalid layout: {error}");
        return ExitCode::FAILURE;
    }

    let rules = match load_rules(&args.input, &args.config.layout) {
        Ok(rules) => rules,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };
    if rules.is_empty() {
        eprintln!("no rules in {}", args.input);
        return ExitCode::FAILURE;
    }
    args.config.resolve(rules.len() as u32);
    info!(
        rules = rules.len(),
        traces = args.config.trace_count,
        fast = args.config.fast,
        seed = args.config.seed,
        "generating trace"
    );

    let started = Instant::now();
    let trace = match generate_trace(&args.config, &rules) {
        Ok(trace) => trace,
        Err(kind) => {
            error!(%kind, "trace generation failed");
            eprintln!("{kind}");
            return ExitCode::FAILURE;
        }
    };

    let output = match File::create(&args.output) {
        Ok(file) => file,
        Err(error) => {
            eprintln!("cannot open {}: {error}", args.output);
            return ExitCode::FAILURE;
        }
    };
    let mut output = BufWriter::new(output);
    for flow in &trace {
        if let Err(error) = writeln!(
            output,
            "{}",
            flow_to_string(flow, &args.config.layout, args.config.style)
        ) {
            eprintln!("cannot write {}: {error}", args.output);
            return ExitCode::FAILURE;
        }
    }
    if let Err(error) = output.flush() {
        eprintln!("cannot write {}: {error}", args.output);
        return ExitCode::FAILURE;
    }
    info!(flows = trace.len(), elapsed = ?started.elapsed(), "trace written");
    ExitCode::SUCCESS
}

fn load_rules(path: &str, layout: &flowgen_rule::RuleLayout) -> Result<Vec<Rule>, String> {
    let file = File::open(path).map_err(|error| format!("cannot open {path}: {error}"))?;
    let mut rules = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|error| format!("cannot read {path}: {error}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let rule = parse_rule(&line, layout)
            .map_err(|error| format!("{path}:{}: {error}", number + 1))?;
        rules.push(rule);
    }
    Ok(rules)
}
