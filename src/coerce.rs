//! Field coercion.
//!
//! CSV cells arrive as strings. Before validation each cell of a declared
//! column is converted to the type its schema declares. A cell that cannot
//! be converted is replaced by a sentinel string (`INVALID_INTEGER`,
//! `INVALID_DATE`, ...) which then flows into validation as ordinary data,
//! where the declared type or format rejects it.

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

use crate::schema::{parse_iso_date, FieldSpec, Format, RecordSchema, TypeTag};

/// Cell values that mean "no value". They are never coerced or flagged.
pub const BLANK_VALUES: [&str; 3] = ["", "NA", "NONE"];

/// Date that stands for "no date" and is passed through untouched.
pub const NO_DATE: &str = "9999-12-31";

/// Sentinel for a `format: date` cell that is not a calendar date.
pub const INVALID_DATE: &str = "INVALID_DATE";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A raw CSV row: column name to cell text, in header order.
pub type RawRecord = IndexMap<String, String>;

/// A row after coercion, ready for validation.
pub type CoercedRecord = Map<String, Value>;

/// Returns true for `""`, `"NA"` and `"NONE"`.
pub fn is_blank(raw: &str) -> bool {
    BLANK_VALUES.contains(&raw)
}

/// The outcome of coercing one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CoercedValue {
    /// One of [`BLANK_VALUES`], unchanged.
    Blank(String),
    Integer(i64),
    Number(f64),
    /// A canonical `YYYY-MM-DD` date, or [`NO_DATE`].
    Date(String),
    /// Text for string-typed (or unrecognized) columns.
    Text(String),
    /// An `INVALID_*` sentinel.
    Invalid(String),
}

impl CoercedValue {
    /// Returns true if coercion failed.
    pub fn is_invalid(&self) -> bool {
        matches!(self, CoercedValue::Invalid(_))
    }

    /// Converts into the JSON value that validation sees.
    pub fn into_value(self) -> Value {
        match self {
            CoercedValue::Integer(n) => Value::Number(n.into()),
            CoercedValue::Number(f) => match Number::from_f64(f) {
                Some(n) => Value::Number(n),
                None => Value::String(TypeTag::Number.sentinel()),
            },
            CoercedValue::Blank(s)
            | CoercedValue::Date(s)
            | CoercedValue::Text(s)
            | CoercedValue::Invalid(s) => Value::String(s),
        }
    }
}

/// Coerces one raw cell according to its field spec.
///
/// Rules, in order:
/// 1. blanks pass through;
/// 2. `format: date` parses strict `YYYY-MM-DD` and re-renders it, except
///    [`NO_DATE`] which passes through; failures become [`INVALID_DATE`];
/// 3. a primary `integer` type parses an `i64`;
/// 4. a primary `number` type parses a finite `f64`;
/// 5. anything else is kept as text.
///
/// # Example
///
/// ```rust
/// use rowguard::coerce::{coerce, CoercedValue};
/// use rowguard::schema::FieldSpec;
/// use serde_json::json;
///
/// let spec = FieldSpec::from_value("LoanNumber", &json!({"type": "integer"}));
/// assert_eq!(coerce("42", &spec), CoercedValue::Integer(42));
/// assert_eq!(coerce("abc", &spec), CoercedValue::Invalid("INVALID_INTEGER".into()));
/// assert_eq!(coerce("NA", &spec), CoercedValue::Blank("NA".into()));
/// ```
pub fn coerce(raw: &str, spec: &FieldSpec) -> CoercedValue {
    if is_blank(raw) {
        return CoercedValue::Blank(raw.to_string());
    }

    if spec.format() == Some(&Format::Date) {
        return coerce_date(raw);
    }

    let primary = spec.primary_type();
    match primary {
        TypeTag::Integer => match raw.trim().parse::<i64>() {
            Ok(n) => CoercedValue::Integer(n),
            Err(_) => CoercedValue::Invalid(primary.sentinel()),
        },
        TypeTag::Number => match raw.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => CoercedValue::Number(f),
            _ => CoercedValue::Invalid(primary.sentinel()),
        },
        _ => CoercedValue::Text(raw.to_string()),
    }
}

fn coerce_date(raw: &str) -> CoercedValue {
    if raw == NO_DATE {
        return CoercedValue::Date(raw.to_string());
    }
    match parse_iso_date(raw) {
        Some(date) => CoercedValue::Date(date.format(DATE_FORMAT).to_string()),
        None => CoercedValue::Invalid(INVALID_DATE.to_string()),
    }
}

/// Coerces every declared column present in `raw`.
///
/// Columns the schema does not declare are copied through as strings;
/// declared columns missing from `raw` stay missing.
pub fn coerce_record(raw: &RawRecord, schema: &RecordSchema) -> CoercedRecord {
    raw.iter()
        .map(|(column, cell)| {
            let value = match schema.lookup(column) {
                Some(spec) => coerce(cell, spec).into_value(),
                None => Value::String(cell.clone()),
            };
            (column.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(keywords: Value) -> FieldSpec {
        FieldSpec::from_value("field", &keywords)
    }

    #[test]
    fn test_blanks_pass_through_for_every_type() {
        let specs = [
            spec(json!({"type": "integer"})),
            spec(json!({"type": "number"})),
            spec(json!({"type": "string", "format": "date"})),
            spec(json!({"type": "string"})),
        ];
        for spec in &specs {
            for blank in BLANK_VALUES {
                assert_eq!(coerce(blank, spec), CoercedValue::Blank(blank.to_string()));
            }
        }
    }

    #[test]
    fn test_blank_match_is_exact() {
        let integer = spec(json!({"type": "integer"}));
        assert!(coerce("na", &integer).is_invalid());
        assert!(coerce(" ", &integer).is_invalid());
    }

    #[test]
    fn test_valid_dates_round_trip() {
        let date = spec(json!({"type": "string", "format": "date"}));
        for raw in ["2024-02-29", "1999-12-31", "2000-01-01"] {
            assert_eq!(coerce(raw, &date), CoercedValue::Date(raw.to_string()));
        }
    }

    #[test]
    fn test_no_date_sentinel_passes_through() {
        let date = spec(json!({"type": "string", "format": "date"}));
        assert_eq!(coerce(NO_DATE, &date), CoercedValue::Date(NO_DATE.to_string()));
    }

    #[test]
    fn test_invalid_dates() {
        let date = spec(json!({"type": "string", "format": "date"}));
        for raw in [
            "31-12-2024",
            "not-a-date",
            "2024-02-30",
            "2023-02-29",
            "2024/01/01",
            "024-01-05",
            "24-1-5",
            "2024-1-5",
            " 2024-01-01",
            "+2024-01-01",
            "2024-01-01 ",
        ] {
            assert_eq!(
                coerce(raw, &date),
                CoercedValue::Invalid(INVALID_DATE.to_string()),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_date_format_wins_over_primary_type() {
        let odd = spec(json!({"type": "integer", "format": "date"}));
        assert_eq!(
            coerce("2024-01-15", &odd),
            CoercedValue::Date("2024-01-15".to_string())
        );
    }

    #[test]
    fn test_integer_coercion() {
        let integer = spec(json!({"type": "integer"}));
        assert_eq!(coerce("42", &integer), CoercedValue::Integer(42));
        assert_eq!(coerce("-7", &integer), CoercedValue::Integer(-7));
        assert_eq!(coerce(" 12 ", &integer), CoercedValue::Integer(12));
        assert_eq!(
            coerce("abc", &integer),
            CoercedValue::Invalid("INVALID_INTEGER".to_string())
        );
        assert!(coerce("4.5", &integer).is_invalid());
        assert!(coerce("99999999999999999999", &integer).is_invalid());
    }

    #[test]
    #[allow(clippy::approx_constant)]
    fn test_number_coercion() {
        let number = spec(json!({"type": "number"}));
        assert_eq!(coerce("3.14", &number), CoercedValue::Number(3.14));
        assert_eq!(coerce("10", &number), CoercedValue::Number(10.0));
        assert_eq!(coerce("1e3", &number), CoercedValue::Number(1000.0));
        assert_eq!(
            coerce("twelve", &number),
            CoercedValue::Invalid("INVALID_NUMBER".to_string())
        );
        assert!(coerce("inf", &number).is_invalid());
        assert!(coerce("NaN", &number).is_invalid());
    }

    #[test]
    fn test_primary_type_only() {
        let union = spec(json!({"type": ["integer", "string"]}));
        assert_eq!(
            coerce("abc", &union),
            CoercedValue::Invalid("INVALID_INTEGER".to_string())
        );

        let union = spec(json!({"type": ["string", "integer"]}));
        assert_eq!(coerce("42", &union), CoercedValue::Text("42".to_string()));
    }

    #[test]
    fn test_strings_and_unknown_types_pass_through() {
        assert_eq!(
            coerce("hello", &spec(json!({"type": "string"}))),
            CoercedValue::Text("hello".to_string())
        );
        assert_eq!(
            coerce("true", &spec(json!({"type": "boolean"}))),
            CoercedValue::Text("true".to_string())
        );
        assert_eq!(
            coerce("1.5", &spec(json!({"type": "decimal"}))),
            CoercedValue::Text("1.5".to_string())
        );
    }

    #[test]
    fn test_into_value() {
        assert_eq!(CoercedValue::Integer(5).into_value(), json!(5));
        assert_eq!(CoercedValue::Number(2.5).into_value(), json!(2.5));
        assert_eq!(
            CoercedValue::Number(f64::NAN).into_value(),
            json!("INVALID_NUMBER")
        );
        assert_eq!(
            CoercedValue::Invalid(INVALID_DATE.into()).into_value(),
            json!("INVALID_DATE")
        );
    }

    #[test]
    fn test_coerce_record() {
        let schema = RecordSchema::from_value(json!({
            "properties": {
                "LoanNumber": {"type": "integer"},
                "OriginationDate": {"type": "string", "format": "date"},
                "Missing": {"type": "number"}
            }
        }))
        .unwrap();

        let raw: RawRecord = [
            ("LoanNumber", "12345"),
            ("OriginationDate", "2024-02-30"),
            ("Extra", "kept"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let coerced = coerce_record(&raw, &schema);
        assert_eq!(coerced.get("LoanNumber"), Some(&json!(12345)));
        assert_eq!(coerced.get("OriginationDate"), Some(&json!("INVALID_DATE")));
        assert_eq!(coerced.get("Extra"), Some(&json!("kept")));
        assert!(coerced.get("Missing").is_none());
    }

    #[test]
    fn test_coercion_is_deterministic() {
        let number = spec(json!({"type": "number"}));
        assert_eq!(coerce("0.1", &number), coerce("0.1", &number));
    }
}
