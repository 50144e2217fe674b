use std::fs::File;
use std::io::BufWriter;
use std::process::ExitCode;
use std::time::Instant;

use tracing::info;

use flowgen_cli::{init_tracing, DENSE_PROFILE_PATH, NORMAL_PROFILE_PATH};
use flowgen_dag::{InstantiateMode, QuadDagPool};

fn main() -> ExitCode {
    init_tracing();
    let started = Instant::now();
    for (path, mode) in [
        (NORMAL_PROFILE_PATH, InstantiateMode::Normal),
        (DENSE_PROFILE_PATH, InstantiateMode::Dense),
    ] {
        let pool = QuadDagPool::generate(mode);
        let file = match File::create(path) {
            Ok(file) => file,
            Err(error) => {
                eprintln!("cannot open {path}: {error}");
                return ExitCode::FAILURE;
            }
        };
        if let Err(error) = pool.write(BufWriter::new(file)) {
            eprintln!("cannot write {path}: {error}");
            return ExitCode::FAILURE;
        }
        info!(path, profiles = pool.len(), "profile library written");
    }
    info!(elapsed = ?started.elapsed(), "precomputation done");
    ExitCode::SUCCESS
}
