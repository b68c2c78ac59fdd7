//! Scoring error types.
//!
//! Every pipeline stage is total over well-formed input. These errors mark
//! input the caller should never have produced.

use thiserror::Error;

/// Input that violates the engine's contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInputError {
    /// A recorded response time is negative.
    #[error("response {index}: negative response time {seconds}s")]
    NegativeResponseTime { index: usize, seconds: f64 },

    /// A recorded response time is NaN or infinite.
    #[error("response {index}: response time is not a finite number")]
    NonFiniteResponseTime { index: usize },

    /// An age of zero years.
    #[error("age must be at least 1 year, got {0}")]
    InvalidAge(u32),
}

impl InvalidInputError {
    /// Index of the offending response, when the error is tied to one.
    pub fn response_index(&self) -> Option<usize> {
        match self {
            InvalidInputError::NegativeResponseTime { index, .. }
            | InvalidInputError::NonFiniteResponseTime { index } => Some(*index),
            InvalidInputError::InvalidAge(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_response() {
        let err = InvalidInputError::NegativeResponseTime {
            index: 3,
            seconds: -1.5,
        };
        assert_eq!(err.to_string(), "response 3: negative response time -1.5s");
        assert_eq!(err.response_index(), Some(3));
        assert_eq!(InvalidInputError::InvalidAge(0).response_index(), None);
    }
}
