use thiserror::Error;

/// Trace-pipeline failures. `NoRule` is fatal for the invocation: no rule is
/// wide enough for a flow group even after merging it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("no rule can be selected")]
    NoRule,
    #[error("no candidate can be selected")]
    NoCandidate,
    #[error("bit width is not sufficient")]
    BitWidth,
}

impl From<flowgen_engine::Error> for Error {
    fn from(error: flowgen_engine::Error) -> Self {
        match error {
            flowgen_engine::Error::NoCandidate => Error::NoCandidate,
            flowgen_engine::Error::BitWidth => Error::BitWidth,
        }
    }
}
