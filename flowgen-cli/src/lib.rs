//! Argument grammars and shared wiring of the flowgen binaries. The
//! grammars use single-dash multi-character options (`-fw`, `-rd α β`) and
//! case-distinct `-D`/`-d`, so they are parsed by explicit argv loops.

pub mod args;

use tracing_subscriber::EnvFilter;

/// Profile library consumed by default.
pub const NORMAL_PROFILE_PATH: &str = "normal_profile.txt";
/// Profile library consumed under `--dense`.
pub const DENSE_PROFILE_PATH: &str = "dense_profile.txt";

/// Install the stderr subscriber; stdout stays clean for artifacts.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
