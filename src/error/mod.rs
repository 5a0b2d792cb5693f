//! Error types.
//!
//! [`Violation`] and [`Violations`] describe rule failures inside a record and
//! travel as data in a verdict. [`SchemaLoadError`] and
//! [`SchemaEvaluationError`] describe problems with the schema itself.

mod schema;
mod violation;

pub use schema::{SchemaEvaluationError, SchemaLoadError};
pub use violation::{Violation, Violations};
