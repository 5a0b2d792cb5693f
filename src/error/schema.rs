//! Errors raised by the schema itself rather than by the data.

use std::path::PathBuf;

/// The schema document could not be loaded.
///
/// Loading fails closed: a run never proceeds without a schema document.
/// Malformed keywords inside the document surface later, per record, as
/// [`SchemaEvaluationError`]s.
#[derive(Debug, thiserror::Error)]
pub enum SchemaLoadError {
    /// IO error reading the schema file
    #[error("IO error reading {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    /// The file is not valid JSON
    #[error("Parse error in schema: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document is JSON but not an object
    #[error("Invalid schema document: {0}")]
    Shape(String),
}

/// The schema could not be turned into executable rules.
///
/// Raised while compiling a [`RecordValidator`](crate::schema::RecordValidator).
/// The batch orchestrator converts it into a per-record violation instead of
/// aborting the batch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaEvaluationError {
    /// A `pattern` keyword is not a valid regular expression
    #[error("invalid pattern '{pattern}' for '{field}': {reason}")]
    InvalidPattern {
        field: String,
        pattern: String,
        reason: String,
    },

    /// A keyword holds a value of the wrong JSON type
    #[error("keyword '{keyword}' for '{field}' must be {expected}")]
    InvalidKeyword {
        field: String,
        keyword: String,
        expected: &'static str,
    },

    /// A subschema is neither a schema object nor a boolean
    #[error("'{keyword}' for '{field}' must hold schema objects or booleans")]
    InvalidSubschema { field: String, keyword: String },
}
