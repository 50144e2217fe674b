//! Atomic types of the flowgen generators: left-aligned match keys and the
//! single deterministic random source every component draws from.

mod key;
mod parse;
mod rng;

pub use key::{Key, WidthClass};
pub use parse::{parse_binary, parse_decimal, parse_hex, ParseKeyError};
pub use rng::{Rng, DEFAULT_SEED};
