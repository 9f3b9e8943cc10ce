//! Shared data types for the stream hydrology toolkit.
//!
//! Holds the crate error type plus the small value types that cross module
//! boundaries (filter directions, aggregation methods, daily rows). Larger
//! entities live next to the code that builds them (`rating::RatingCurve`,
//! `discharge::DischargeSeries`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Main error type for toolkit operations.
///
/// Every public function checks its own preconditions and fails with one of
/// these before doing any arithmetic, so a returned value is never a
/// partial or garbage result.
#[derive(Error, Debug)]
pub enum HydroError {
    /// Rating curve regression failed to converge or had degenerate samples.
    #[error("Rating curve fit failed: {0}")]
    Fit(String),

    /// A sequence was too short, a denominator was zero, or a parameter was
    /// outside its valid range.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Paired sequences of unequal length.
    #[error("Length mismatch between {what}: {left} vs {right}")]
    ShapeMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },

    /// Configuration file missing, malformed, or out of range.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Summary export failed.
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Error kind without the message, for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Fit,
    InvalidInput,
    ShapeMismatch,
    Config,
    Serialize,
}

impl HydroError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HydroError::Fit(_) => ErrorKind::Fit,
            HydroError::InvalidInput(_) => ErrorKind::InvalidInput,
            HydroError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            HydroError::Config(_) => ErrorKind::Config,
            HydroError::Serialize(_) => ErrorKind::Serialize,
        }
    }
}

/// Result type alias for toolkit operations
pub type Result<T> = std::result::Result<T, HydroError>;

/// Fails with `ShapeMismatch` unless both lengths agree.
pub(crate) fn ensure_same_len(what: &'static str, left: usize, right: usize) -> Result<()> {
    if left != right {
        return Err(HydroError::ShapeMismatch { what, left, right });
    }
    Ok(())
}

/// Fails with `InvalidInput` unless `value` lies strictly inside (0, 1).
pub(crate) fn ensure_unit_open(name: &str, value: f64) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(HydroError::InvalidInput(format!(
            "{} must be in (0, 1), got {}",
            name, value
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Filter direction
// ---------------------------------------------------------------------------

/// Direction of a single Lyne-Hollick filter pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    pub fn as_char(&self) -> char {
        match self {
            Direction::Forward => 'f',
            Direction::Reverse => 'r',
        }
    }
}

impl TryFrom<char> for Direction {
    type Error = HydroError;

    fn try_from(c: char) -> Result<Self> {
        match c {
            'f' | 'F' => Ok(Direction::Forward),
            'r' | 'R' => Ok(Direction::Reverse),
            other => Err(HydroError::InvalidInput(format!(
                "unknown filter direction '{}' (expected 'f' or 'r')",
                other
            ))),
        }
    }
}

impl FromStr for Direction {
    type Err = HydroError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "f" | "forward" => Ok(Direction::Forward),
            "r" | "reverse" => Ok(Direction::Reverse),
            other => Err(HydroError::InvalidInput(format!(
                "unknown filter direction '{}'",
                other
            ))),
        }
    }
}

/// Parses a pass string such as `"fff"` or `"frf"` into one direction per
/// filter pass.
pub fn parse_passes(passes: &str) -> Result<Vec<Direction>> {
    let directions = passes
        .trim()
        .chars()
        .map(Direction::try_from)
        .collect::<Result<Vec<_>>>()?;

    if directions.is_empty() {
        return Err(HydroError::InvalidInput(
            "filter pass string must name at least one pass".to_string(),
        ));
    }
    Ok(directions)
}

// ---------------------------------------------------------------------------
// Daily aggregation
// ---------------------------------------------------------------------------

/// Reduction applied to each day's samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AggregateMethod {
    #[default]
    Mean,
    Sum,
}

impl AggregateMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateMethod::Mean => "mean",
            AggregateMethod::Sum => "sum",
        }
    }
}

impl fmt::Display for AggregateMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregateMethod {
    type Err = HydroError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(AggregateMethod::Mean),
            "sum" => Ok(AggregateMethod::Sum),
            other => Err(HydroError::InvalidInput(format!(
                "unknown aggregation method '{}' (expected 'mean' or 'sum')",
                other
            ))),
        }
    }
}

/// One row of a daily aggregate: the calendar day of the first sample in
/// the window and the reduced value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyValue {
    pub day: NaiveDate,
    pub value: f64,
    /// Number of samples reduced into this row. The final day may be short.
    pub samples: usize,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_passes_three_forward() {
        let passes = parse_passes("fff").unwrap();
        assert_eq!(passes, vec![Direction::Forward; 3]);
    }

    #[test]
    fn test_parse_passes_mixed() {
        let passes = parse_passes("frf").unwrap();
        assert_eq!(
            passes,
            vec![Direction::Forward, Direction::Reverse, Direction::Forward]
        );
    }

    #[test]
    fn test_parse_passes_rejects_empty_and_unknown() {
        assert_eq!(parse_passes("").unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(parse_passes("fxf").unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("forward".parse::<Direction>().unwrap(), Direction::Forward);
        assert_eq!("R".parse::<Direction>().unwrap(), Direction::Reverse);
        assert_eq!(Direction::Reverse.as_char(), 'r');
    }

    #[test]
    fn test_aggregate_method_round_trip_names() {
        assert_eq!("Mean".parse::<AggregateMethod>().unwrap(), AggregateMethod::Mean);
        assert_eq!("sum".parse::<AggregateMethod>().unwrap(), AggregateMethod::Sum);
        assert!("median".parse::<AggregateMethod>().is_err());
        assert_eq!(AggregateMethod::Sum.to_string(), "sum");
    }

    #[test]
    fn test_shape_mismatch_message_names_sequences() {
        let err = ensure_same_len("stage/discharge", 3, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        assert_eq!(
            err.to_string(),
            "Length mismatch between stage/discharge: 3 vs 2"
        );
    }

    #[test]
    fn test_unit_interval_bounds() {
        assert!(ensure_unit_open("alpha", 0.925).is_ok());
        assert!(ensure_unit_open("alpha", 0.0).is_err());
        assert!(ensure_unit_open("alpha", 1.0).is_err());
        assert!(ensure_unit_open("alpha", f64::NAN).is_err());
    }
}
