//! Schema model and record validation.
//!
//! [`RecordSchema`] is the loaded document; [`RecordValidator`] is the same
//! document compiled into rules. Each rule family lives in its own module
//! (string, numeric, combinators) and every family accumulates all of its
//! violations rather than short-circuiting on the first one.
//!
//! # Example
//!
//! ```rust
//! use rowguard::schema::{RecordSchema, RecordValidator};
//! use serde_json::json;
//!
//! let schema = RecordSchema::from_value(json!({
//!     "properties": {
//!         "LoanNumber": {"type": "integer", "minimum": 1},
//!         "Status": {"type": "string", "enum": ["Open", "Closed"]}
//!     },
//!     "required": ["LoanNumber"]
//! }))
//! .unwrap();
//! let validator = RecordValidator::compile(&schema).unwrap();
//!
//! let record = json!({"LoanNumber": 0, "Status": "Pending"});
//! let result = validator.validate(record.as_object().unwrap());
//! assert_eq!(result.into_result().unwrap_err().len(), 2);
//! ```

mod combinators;
mod field;
mod model;
mod numeric;
mod record;
mod string;
mod traits;

pub use combinators::CombinatorSchema;
pub use field::FieldValidator;
pub use model::{FieldSpec, Format, RecordSchema, TypeTag};
pub use numeric::NumericRules;
pub use record::RecordValidator;
pub use string::StringRules;

pub(crate) use string::parse_iso_date;
pub use traits::ValueValidator;

use serde_json::{Map, Value};

use crate::error::SchemaEvaluationError;

/// Renders a value the way violation messages quote it: strings in single
/// quotes, everything else as compact JSON.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s),
        other => other.to_string(),
    }
}

/// Returns the JSON type name for a value.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Reads a numeric keyword, keeping its original text for messages.
pub(crate) fn number_keyword(
    field: &str,
    keywords: &Map<String, Value>,
    name: &str,
) -> Result<Option<(f64, String)>, SchemaEvaluationError> {
    match keywords.get(name) {
        None => Ok(None),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) => Ok(Some((f, n.to_string()))),
            None => Err(invalid_keyword(field, name, "a number")),
        },
        Some(_) => Err(invalid_keyword(field, name, "a number")),
    }
}

/// Reads a non-negative integer keyword (`minLength`, `maxProperties`, ...).
pub(crate) fn count_keyword(
    field: &str,
    keywords: &Map<String, Value>,
    name: &str,
) -> Result<Option<usize>, SchemaEvaluationError> {
    match keywords.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| invalid_keyword(field, name, "a non-negative integer")),
    }
}

pub(crate) fn invalid_keyword(
    field: &str,
    keyword: &str,
    expected: &'static str,
) -> SchemaEvaluationError {
    SchemaEvaluationError::InvalidKeyword {
        field: field.to_string(),
        keyword: keyword.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe() {
        assert_eq!(describe(&json!("abc")), "'abc'");
        assert_eq!(describe(&json!(42)), "42");
        assert_eq!(describe(&json!(2.5)), "2.5");
        assert_eq!(describe(&json!(null)), "null");
        assert_eq!(describe(&json!(["A", 1])), r#"["A",1]"#);
    }

    #[test]
    fn test_number_keyword() {
        let keywords = json!({"minimum": 10, "maximum": "high"});
        let keywords = keywords.as_object().unwrap();

        assert_eq!(
            number_keyword("f", keywords, "minimum").unwrap(),
            Some((10.0, "10".to_string()))
        );
        assert_eq!(number_keyword("f", keywords, "multipleOf").unwrap(), None);
        assert!(number_keyword("f", keywords, "maximum").is_err());
    }

    #[test]
    fn test_count_keyword() {
        let keywords = json!({"minLength": 3, "maxLength": -1});
        let keywords = keywords.as_object().unwrap();

        assert_eq!(count_keyword("f", keywords, "minLength").unwrap(), Some(3));
        assert!(count_keyword("f", keywords, "maxLength").is_err());
    }
}
