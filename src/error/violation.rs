//! Rule violations.
//!
//! This module provides [`Violation`] for a single failed rule and
//! [`Violations`] for the non-empty set collected from one record.

use std::fmt::{self, Display};

use stillwater::prelude::*;

use crate::path::JsonPath;

/// A single rule failure within a record.
///
/// - **path**: where in the record the rule failed (first segment is the column)
/// - **message**: human-readable description of the failure
/// - **got** / **expected**: optional detail about the offending value
/// - **code**: machine-readable rule name (e.g. `type`, `required`, `format`)
///
/// The `Display` form is the line reported in a verdict's `Errors` list.
///
/// # Example
///
/// ```rust
/// use rowguard::{JsonPath, Violation};
///
/// let violation = Violation::new(
///     JsonPath::from_field("OriginationDate"),
///     "'INVALID_DATE' is not a 'date'",
/// )
/// .with_code("format");
///
/// assert_eq!(
///     violation.to_string(),
///     "Invalid record in column 'OriginationDate': 'INVALID_DATE' is not a 'date'"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// The path to the value that failed validation.
    pub path: JsonPath,
    /// Human-readable error message.
    pub message: String,
    /// The actual value that was received (formatted as string).
    pub got: Option<String>,
    /// Description of what was expected.
    pub expected: Option<String>,
    /// Machine-readable rule code.
    pub code: String,
}

impl Violation {
    /// Creates a new violation with the given path and message.
    ///
    /// The code defaults to "validation_error".
    pub fn new(path: JsonPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            got: None,
            expected: None,
            code: "validation_error".to_string(),
        }
    }

    /// Sets the rule code and returns self for chaining.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Sets the "got" (actual value) field and returns self for chaining.
    pub fn with_got(mut self, got: impl Into<String>) -> Self {
        self.got = Some(got.into());
        self
    }

    /// Sets the "expected" field and returns self for chaining.
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// The column this violation is attributed to.
    ///
    /// Violations without a path (record-level rules) belong to
    /// [`UNKNOWN_COLUMN`](crate::path::UNKNOWN_COLUMN).
    pub fn column(&self) -> &str {
        self.path.column_or_unknown()
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid record in column '{}': {}",
            self.column(),
            self.message
        )
    }
}

impl std::error::Error for Violation {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Violation>();
    assert_sync::<Violation>();
};

/// A non-empty collection of violations.
///
/// Wraps a `NonEmptyVec<Violation>` so that a failed
/// `Validation<T, Violations>` always carries at least one violation.
/// Collections from independent rules are merged through `Semigroup`:
///
/// ```rust
/// use rowguard::{JsonPath, Violation, Violations};
/// use stillwater::prelude::*;
///
/// let missing = Violations::single(
///     Violation::new(JsonPath::from_field("LoanNumber"), "'LoanNumber' is a required property")
/// );
/// let bad_rate = Violations::single(
///     Violation::new(JsonPath::from_field("Rate"), "'x' is not of type 'number'")
/// );
///
/// assert_eq!(missing.combine(bad_rate).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Violations(NonEmptyVec<Violation>);

impl Violations {
    /// Creates a collection containing a single violation.
    pub fn single(violation: Violation) -> Self {
        Self(NonEmptyVec::singleton(violation))
    }

    /// Builds a collection from a vec, or `None` if it is empty.
    pub fn from_vec(violations: Vec<Violation>) -> Option<Self> {
        NonEmptyVec::from_vec(violations).map(Self)
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the contained violations.
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    /// Returns all violations with the given rule code.
    pub fn with_code(&self, code: &str) -> Vec<&Violation> {
        self.0.iter().filter(|v| v.code == code).collect()
    }

    /// Returns the first violation.
    pub fn first(&self) -> &Violation {
        self.0.head()
    }

    /// Converts this collection into a `Vec<Violation>`.
    pub fn into_vec(self) -> Vec<Violation> {
        self.0.into_vec()
    }
}

impl Semigroup for Violations {
    fn combine(self, other: Self) -> Self {
        Violations(self.0.combine(other.0))
    }
}

impl Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} violation(s):", self.len())?;
        for (i, violation) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}
