//! Unified error type for the domain layer
//!
//! Value types validate on construction and report failures through
//! [`DomainError`], so adapters never have to fall back to `String` errors.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A board coordinate outside `0..8`
    #[error("Square out of bounds: ({x}, {y})")]
    OutOfBounds { x: i64, y: i64 },

    /// A board snapshot that is not exactly 8x8
    #[error("Invalid board shape: expected 8x8, got {rows} rows (first bad row has {cols} cells)")]
    InvalidBoardShape { rows: usize, cols: usize },

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// Use this in `FromStr` implementations when the input string
    /// doesn't match any known variant or format.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn out_of_bounds(x: i64, y: i64) -> Self {
        Self::OutOfBounds { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error() {
        let err = DomainError::parse("unknown seat marker: Player3");
        assert_eq!(err.to_string(), "Parse error: unknown seat marker: Player3");
    }

    #[test]
    fn test_out_of_bounds_error() {
        let err = DomainError::out_of_bounds(8, -1);
        assert_eq!(err.to_string(), "Square out of bounds: (8, -1)");
    }

    #[test]
    fn test_board_shape_error() {
        let err = DomainError::InvalidBoardShape { rows: 7, cols: 8 };
        assert!(err.to_string().contains("got 7 rows"));
    }
}
