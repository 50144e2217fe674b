use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use tracing::{error, info};

use flowgen_cli::args::parse_rulegen;
use flowgen_cli::{init_tracing, DENSE_PROFILE_PATH, NORMAL_PROFILE_PATH};
use flowgen_dag::{InstantiateMode, QuadDagPool};
use flowgen_engine::Generator;
use flowgen_rule::rule_to_string;

fn main() -> ExitCode {
    init_tracing();
    let args = match parse_rulegen(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(error) = args.config.validate() {
        eprintln!("invalid layout: {error}");
        return ExitCode::FAILURE;
    }

    let (path, mode) = if args.config.dense_profiles {
        (DENSE_PROFILE_PATH, InstantiateMode::Dense)
    } else {
        (NORMAL_PROFILE_PATH, InstantiateMode::Normal)
    };
    let pool = match load_pool(path, mode) {
        Ok(pool) => pool,
        Err(error) => {
            eprintln!("cannot load the profile library: {error}");
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

    let started = Instant::now();
    let mut generator = Generator::new(&args.config, &pool);
    info!(
        rules = args.config.rule_count,
        kind = %generator.target_kind(),
        target = generator.target_value(),
        seed = args.config.seed,
        "generating rule set"
    );
    match generator.solve() {
        Ok(rules) => {
            for rule in &rules {
                if let Err(error) = writeln!(
                    output,
                    "{}",
                    rule_to_string(rule, &args.config.layout, args.config.style)
                ) {
                    eprintln!("cannot write {}: {error}", args.output);
                    return ExitCode::FAILURE;
                }
            }
            if let Err(error) = output.flush() {
                eprintln!("cannot write {}: {error}", args.output);
                return ExitCode::FAILURE;
            }
            info!(
                elapsed = ?started.elapsed(),
                attempts = generator.attempts(),
                "rule set written"
            );
            ExitCode::SUCCESS
        }
        Err(kind) => {
            // no partial artifact: the file carries the failure banner only
            let _ = writeln!(output, "Failed to generate the rule set.");
            let _ = output.flush();
            error!(%kind, "rule set generation failed");
            eprintln!("{kind}");
            ExitCode::FAILURE
        }
    }
}

fn load_pool(path: &str, mode: InstantiateMode) -> Result<QuadDagPool, flowgen_dag::PoolError> {
    if Path::new(path).exists() {
        let reader = BufReader::new(File::open(path)?);
        let pool = QuadDagPool::from_reader(reader)?;
        info!(path, profiles = pool.len(), "profile library loaded");
        Ok(pool)
    } else {
        info!(path, "profile library missing; precomputing in-memory");
        Ok(QuadDagPool::generate(mode))
    }
}
