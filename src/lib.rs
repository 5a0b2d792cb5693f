//! # rowguard
//!
//! Validates tabular records (CSV rows) against a JSON-Schema-like contract
//! and reports ALL violations of every record rather than stopping at the
//! first one.
//!
//! ## Overview
//!
//! Each record goes through two stages:
//!
//! 1. **Coercion** ([`coerce`]): raw cell strings are converted to the type
//!    the schema declares. A cell that cannot be converted becomes an
//!    in-band sentinel such as `INVALID_INTEGER` or `INVALID_DATE`.
//! 2. **Validation** ([`schema::RecordValidator`]): every rule is checked and
//!    every failure is collected, using stillwater's `Validation` type for
//!    applicative error accumulation.
//!
//! The outcome is one [`Verdict`] per record, in input order.
//!
//! ## Core Types
//!
//! - [`RecordSchema`]: the loaded schema document
//! - [`Violation`]: a single rule failure, attributed to a column
//! - [`Violations`]: a non-empty collection of violations
//! - [`Verdict`]: status, summary message and violations of one record
//!
//! ## Example
//!
//! ```rust
//! use rowguard::{validate_batch, RecordSchema};
//! use rowguard::coerce::RawRecord;
//! use serde_json::json;
//!
//! let schema = RecordSchema::from_value(json!({
//!     "type": "object",
//!     "properties": {
//!         "LoanNumber": {"type": "integer", "required": true},
//!         "OriginationDate": {"type": "string", "format": "date"}
//!     }
//! }))
//! .unwrap();
//!
//! let record: RawRecord = [("LoanNumber", "12345"), ("OriginationDate", "2024-02-30")]
//!     .into_iter()
//!     .map(|(k, v)| (k.to_string(), v.to_string()))
//!     .collect();
//!
//! let verdicts = validate_batch(&schema, &[record]);
//! assert_eq!(verdicts[0].message, "Multiple validation errors found");
//! assert_eq!(
//!     verdicts[0].errors(),
//!     vec!["Invalid record in column 'OriginationDate': 'INVALID_DATE' is not a 'date'"]
//! );
//! ```

pub mod batch;
pub mod cli;
pub mod coerce;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod path;
pub mod report;
pub mod schema;
pub mod verdict;

#[cfg(feature = "server")]
pub mod server;

pub use batch::{validate_batch, validate_batch_parallel, validate_record};
pub use error::{SchemaEvaluationError, SchemaLoadError, Violation, Violations};
pub use path::JsonPath;
pub use schema::{FieldSpec, RecordSchema, RecordValidator};
pub use verdict::{BatchSummary, Status, ValidationReport, Verdict};
