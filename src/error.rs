//! Error types for the Walls parser.
//!
//! This module provides a unified error type [`WallsError`] that covers
//! every way a line of survey data can fail to parse, plus the I/O errors
//! of the file-level driver.
//!
//! Parse errors carry the offending [`Segment`], so their `Display` output
//! starts with `source:line:column`.

use thiserror::Error;

use crate::line::Segment;

/// Result type alias using [`WallsError`].
pub type Result<T> = std::result::Result<T, WallsError>;

/// Unified error type for all Walls parsing operations.
#[derive(Error, Debug)]
pub enum WallsError {
    // ============ Combinator Errors ============
    /// The input at the cursor did not match any expected item
    #[error("{segment}: expected {}", describe_expected(.expected))]
    UnexpectedInput {
        expected: Vec<String>,
        segment: Segment,
    },

    // ============ Literal Errors ============
    /// A numeric token could not be read as a number
    #[error("{segment}: invalid number '{text}'")]
    InvalidNumber { text: String, segment: Segment },

    /// A unit suffix letter that no unit table knows
    #[error("{segment}: unknown unit '{unit}'")]
    UnknownUnit { unit: char, segment: Segment },

    /// A minutes or seconds component outside of [0, 60)
    #[error("{segment}: {component} must be in [0, 60), got {value}")]
    InvalidDmsComponent {
        component: &'static str,
        value: f64,
        segment: Segment,
    },

    /// A date whose fields do not form a calendar date
    #[error("{segment}: invalid date '{text}'")]
    InvalidDate { text: String, segment: Segment },

    /// A measurement outside of the range its field allows
    #[error("{segment}: {what} out of range")]
    ValueOutOfRange {
        what: &'static str,
        segment: Segment,
    },

    /// A quoted string without its closing quote
    #[error("{segment}: missing closing quote")]
    UnterminatedQuote { segment: Segment },

    // ============ Units Errors ============
    /// `#UNITS RESTORE` without a matching `SAVE`
    #[error("{segment}: no saved units to restore")]
    EmptyUnitsStack { segment: Segment },

    /// Too many nested `#UNITS SAVE`s
    #[error("{segment}: units stack is full ({depth} saved)")]
    UnitsStackFull { depth: usize, segment: Segment },

    /// An element code listed twice in an order option
    #[error("{segment}: element '{code}' appears more than once")]
    DuplicateElementCode { code: char, segment: Segment },

    /// An order option missing one of its required elements
    #[error("{segment}: missing required element(s) {}", .missing.join(", "))]
    MissingRequiredElement {
        missing: Vec<String>,
        segment: Segment,
    },

    // ============ Directive Errors ============
    /// `$(name)` referencing a macro that was never defined
    #[error("{segment}: macro '{name}' is not defined")]
    UnknownMacro { name: String, segment: Segment },

    /// A `#` line whose keyword is not a directive
    #[error("{segment}: unknown directive '#{name}'")]
    UnknownDirective { name: String, segment: Segment },

    // ============ I/O Errors ============
    /// Error reading a survey file
    #[error("Failed to read survey file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn describe_expected(expected: &[String]) -> String {
    match expected {
        [] => "something else".to_string(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}

impl WallsError {
    /// Create an unexpected input error
    pub fn unexpected<S: Into<String>>(
        segment: Segment,
        expected: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::UnexpectedInput {
            expected: expected.into_iter().map(Into::into).collect(),
            segment,
        }
    }

    /// Create an invalid number error
    pub fn invalid_number(segment: Segment) -> Self {
        Self::InvalidNumber {
            text: segment.value().to_string(),
            segment,
        }
    }

    /// Create a value out of range error
    pub fn out_of_range(what: &'static str, segment: Segment) -> Self {
        Self::ValueOutOfRange { what, segment }
    }

    /// The segment this error points at, if it came from parsing.
    pub fn segment(&self) -> Option<&Segment> {
        match self {
            Self::UnexpectedInput { segment, .. }
            | Self::InvalidNumber { segment, .. }
            | Self::UnknownUnit { segment, .. }
            | Self::InvalidDmsComponent { segment, .. }
            | Self::InvalidDate { segment, .. }
            | Self::ValueOutOfRange { segment, .. }
            | Self::UnterminatedQuote { segment }
            | Self::EmptyUnitsStack { segment }
            | Self::UnitsStackFull { segment, .. }
            | Self::DuplicateElementCode { segment, .. }
            | Self::MissingRequiredElement { segment, .. }
            | Self::UnknownMacro { segment, .. }
            | Self::UnknownDirective { segment, .. } => Some(segment),
            Self::FileRead { .. } => None,
        }
    }

    /// Byte offset within the line where this error was detected.
    ///
    /// Used to pick the alternative that got furthest when every branch
    /// of a `one_of` fails.
    pub fn position(&self) -> usize {
        self.segment().map_or(0, Segment::start)
    }

    /// Combine two failures at the same position.
    ///
    /// Two [`WallsError::UnexpectedInput`]s merge their expected items; a
    /// more specific error wins over a plain unexpected-input one.
    pub(crate) fn merge(self, other: WallsError) -> Self {
        match (self, other) {
            (
                Self::UnexpectedInput {
                    mut expected,
                    segment,
                },
                Self::UnexpectedInput {
                    expected: more, ..
                },
            ) => {
                for item in more {
                    if !expected.contains(&item) {
                        expected.push(item);
                    }
                }
                Self::UnexpectedInput { expected, segment }
            }
            (Self::UnexpectedInput { .. }, other) => other,
            (this, _) => this,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_location() {
        let line = Segment::new("A1 B1 10 x", Some("cave.srv"), 4, 0);
        let err = WallsError::unexpected(line.sub(9, 10), ["<AZIMUTH>", "--"]);
        assert_eq!(err.to_string(), "cave.srv:5:10: expected <AZIMUTH> or --");
    }

    #[test]
    fn test_merge_unions_expected_items() {
        let line = Segment::new("abc", None, 0, 0);
        let a = WallsError::unexpected(line.sub(1, 2), ["x", "y"]);
        let b = WallsError::unexpected(line.sub(1, 2), ["y", "z"]);
        match a.merge(b) {
            WallsError::UnexpectedInput { expected, .. } => {
                assert_eq!(expected, vec!["x", "y", "z"]);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
