//! Per-record outcomes and the report envelope.

use std::fmt::Display;

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use crate::error::{Violation, Violations};
use crate::path::JsonPath;

/// Summary message of a record with no violations.
pub const VALID_MESSAGE: &str = "Valid record";

/// Summary message of a record with one or more violations.
pub const INVALID_MESSAGE: &str = "Multiple validation errors found";

/// Violation code of a record the engine could not evaluate.
pub const SCHEMA_ERROR_CODE: &str = "schema_error";

/// Whether a record passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Valid,
    Invalid,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Valid => "Valid",
            Status::Invalid => "Invalid",
        }
    }
}

/// The outcome of validating one record.
///
/// Serializes as `{"Status": ..., "Message": ..., "Errors": [...]}`, where
/// each error is the violation's display line.
///
/// # Example
///
/// ```rust
/// use rowguard::verdict::{Status, Verdict};
///
/// let verdict = Verdict::valid();
/// assert_eq!(verdict.status, Status::Valid);
/// assert_eq!(
///     serde_json::to_string(&verdict).unwrap(),
///     r#"{"Status":"Valid","Message":"Valid record","Errors":[]}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub status: Status,
    pub message: String,
    pub violations: Vec<Violation>,
}

impl Verdict {
    pub fn valid() -> Self {
        Self {
            status: Status::Valid,
            message: VALID_MESSAGE.to_string(),
            violations: Vec::new(),
        }
    }

    /// An invalid verdict; the message does not depend on the count.
    pub fn invalid(violations: Violations) -> Self {
        Self {
            status: Status::Invalid,
            message: INVALID_MESSAGE.to_string(),
            violations: violations.into_vec(),
        }
    }

    /// An invalid verdict for a record the engine could not evaluate.
    ///
    /// The summary message and the single root violation both read
    /// `Validation failed: <cause>`.
    pub fn schema_error(cause: impl Display) -> Self {
        let violation = Violation::new(JsonPath::root(), format!("Validation failed: {}", cause))
            .with_code(SCHEMA_ERROR_CODE);
        Self {
            status: Status::Invalid,
            message: violation.message.clone(),
            violations: vec![violation],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status == Status::Valid
    }

    /// The display lines of every violation, in order. Schema errors are
    /// not about any column and are reported by their bare message.
    pub fn errors(&self) -> Vec<String> {
        self.violations
            .iter()
            .map(|v| match v.code.as_str() {
                SCHEMA_ERROR_CODE => v.message.clone(),
                _ => v.to_string(),
            })
            .collect()
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Verdict", 3)?;
        state.serialize_field("Status", &self.status)?;
        state.serialize_field("Message", &self.message)?;
        state.serialize_field("Errors", &self.errors())?;
        state.end()
    }
}

/// The response envelope for one validated file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub filename: String,
    pub row_count: usize,
    pub results: Vec<Verdict>,
}

impl ValidationReport {
    pub fn new(filename: impl Into<String>, results: Vec<Verdict>) -> Self {
        Self {
            filename: filename.into(),
            row_count: results.len(),
            results,
        }
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_verdicts(&self.results)
    }
}

/// Counts over a batch of verdicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
}

impl BatchSummary {
    pub fn from_verdicts(verdicts: &[Verdict]) -> Self {
        let valid = verdicts.iter().filter(|v| v.is_valid()).count();
        Self {
            total: verdicts.len(),
            valid,
            invalid: verdicts.len() - valid,
        }
    }

    pub fn all_valid(&self) -> bool {
        self.invalid == 0
    }
}
