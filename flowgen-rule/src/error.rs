use thiserror::Error;

use flowgen_types::ParseKeyError;

/// Field-level failure: a suffix extension ran out of bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("bit width is not sufficient")]
    BitWidth,
}

/// A user-defined layout the generators cannot operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Range arithmetic is defined on the 32-bit view only.
    #[error("range-match field {index} is {width} bits wide; at most 32 are supported")]
    RangeTooWide { index: usize, width: u8 },
    #[error("field {index} has unusable width {width}")]
    FieldTooWide { index: usize, width: u8 },
    #[error("a layout needs at least one field")]
    Empty,
}

/// A rule line that does not parse in either wire style.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseRuleError {
    #[error("line ended before field {0}")]
    Truncated(usize),
    #[error("field {index}: {source}")]
    Key {
        index: usize,
        source: ParseKeyError,
    },
    #[error("field {0}: malformed field token")]
    Malformed(usize),
    #[error("unrecognized rule style")]
    UnknownStyle,
}
