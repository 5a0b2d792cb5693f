//! Batch orchestration: coerce, validate and emit one verdict per record.
//!
//! Both entry points are total. The schema is compiled once per batch; if it
//! cannot be compiled, every record still gets a verdict, each carrying the
//! compilation failure as its single violation.

use rayon::prelude::*;
use stillwater::Validation;
use tracing::{debug, info, warn};

use crate::coerce::{coerce_record, RawRecord};
use crate::error::SchemaEvaluationError;
use crate::schema::{RecordSchema, RecordValidator};
use crate::verdict::{BatchSummary, Verdict};

/// The compiled form of a schema, or the reason it could not be compiled.
type Compiled = Result<RecordValidator, SchemaEvaluationError>;

fn compile(schema: &RecordSchema) -> Compiled {
    RecordValidator::compile(schema).inspect_err(|e| {
        warn!(error = %e, "schema could not be compiled; every record will be invalid");
    })
}

fn evaluate(compiled: &Compiled, schema: &RecordSchema, raw: &RawRecord) -> Verdict {
    let validator = match compiled {
        Ok(validator) => validator,
        Err(e) => return Verdict::schema_error(e),
    };

    let record = coerce_record(raw, schema);
    match validator.validate(&record) {
        Validation::Success(()) => Verdict::valid(),
        Validation::Failure(violations) => Verdict::invalid(violations),
    }
}

/// Validates a single raw record.
///
/// Compiles the schema for this call alone; prefer [`validate_batch`] for
/// more than a handful of records.
///
/// # Example
///
/// ```rust
/// use rowguard::batch::validate_record;
/// use rowguard::coerce::RawRecord;
/// use rowguard::schema::RecordSchema;
/// use serde_json::json;
///
/// let schema = RecordSchema::from_value(json!({
///     "properties": {"LoanNumber": {"type": "integer", "required": true}}
/// }))
/// .unwrap();
///
/// let mut raw = RawRecord::new();
/// raw.insert("LoanNumber".to_string(), "12345".to_string());
/// assert!(validate_record(&schema, &raw).is_valid());
///
/// raw.insert("LoanNumber".to_string(), "abc".to_string());
/// assert!(!validate_record(&schema, &raw).is_valid());
/// ```
pub fn validate_record(schema: &RecordSchema, raw: &RawRecord) -> Verdict {
    evaluate(&compile(schema), schema, raw)
}

/// Validates every record in order. `output[i]` is the verdict for
/// `records[i]`.
pub fn validate_batch(schema: &RecordSchema, records: &[RawRecord]) -> Vec<Verdict> {
    info!(records = records.len(), "validating batch");
    let compiled = compile(schema);

    let verdicts: Vec<Verdict> = records
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let verdict = evaluate(&compiled, schema, raw);
            if !verdict.is_valid() {
                debug!(row = index, violations = verdict.violations.len(), "invalid record");
            }
            verdict
        })
        .collect();

    log_summary(&verdicts);
    verdicts
}

/// Same as [`validate_batch`], spreading records across the rayon pool.
///
/// The indexed collect keeps verdicts in input order.
pub fn validate_batch_parallel(schema: &RecordSchema, records: &[RawRecord]) -> Vec<Verdict> {
    info!(records = records.len(), "validating batch in parallel");
    let compiled = compile(schema);

    let verdicts: Vec<Verdict> = records
        .par_iter()
        .map(|raw| evaluate(&compiled, schema, raw))
        .collect();

    log_summary(&verdicts);
    verdicts
}

fn log_summary(verdicts: &[Verdict]) {
    let summary = BatchSummary::from_verdicts(verdicts);
    info!(
        total = summary.total,
        valid = summary.valid,
        invalid = summary.invalid,
        "batch complete"
    );
}
