use thiserror::Error;

use flowgen_rule::FieldError;

/// Engine failure kinds. `NoCandidate` is recoverable: the global driver
/// retries with a finer partition. `BitWidth` means a split or suffix
/// extension exceeded a field's bit budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("no candidate can be selected")]
    NoCandidate,
    #[error("bit width is not sufficient")]
    BitWidth,
}

impl From<FieldError> for Error {
    fn from(error: FieldError) -> Self {
        match error {
            FieldError::BitWidth => Error::BitWidth,
        }
    }
}
