//! Core error types (deterministic only)

use thiserror::Error;

/// Errors raised by the range algebra (no I/O, no external failures)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Offsets violating `0 <= start <= end`
    #[error("invalid range [{start}, {end}]")]
    InvalidRange {
        /// The rejected start offset
        start: i64,
        /// The rejected end offset
        end: i64,
    },

    /// Range reaching past the end of the text it is applied to
    #[error("range [{start}, {end}] out of bounds for text of length {length}")]
    OutOfBounds {
        /// Start offset of the range
        start: usize,
        /// End offset of the range
        end: usize,
        /// Length of the text in characters
        length: usize,
    },

    /// Subtrahend strictly enclosing the minuend, where subtraction is undefined
    #[error("cannot subtract [{subtrahend_start}, {subtrahend_end}] from enclosed range [{start}, {end}]")]
    SubtractionDomain {
        /// Start of the minuend
        start: usize,
        /// End of the minuend
        end: usize,
        /// Start of the subtrahend
        subtrahend_start: usize,
        /// End of the subtrahend
        subtrahend_end: usize,
    },
}

/// Result type for core operations
pub type Result<T> = core::result::Result<T, CoreError>;
