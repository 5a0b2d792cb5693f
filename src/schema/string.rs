//! String rules.
//!
//! This module provides [`StringRules`]: `minLength`, `maxLength`, `pattern`
//! and `format`. The rules only look at string values; numbers and other
//! types pass untouched, so an integer column can carry a `pattern` without
//! it firing on coerced integers.

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde_json::{Map, Value};
use stillwater::Validation;

use crate::error::{SchemaEvaluationError, Violation, Violations};
use crate::path::JsonPath;

use super::model::Format;
use super::{count_keyword, describe};

#[derive(Clone)]
enum StringConstraint {
    MinLength { min: usize },
    MaxLength { max: usize },
    Pattern { regex: Regex, pattern_str: String },
    Format { format: Format },
}

/// The string-valued rules of one field.
///
/// # Example
///
/// ```rust
/// use rowguard::JsonPath;
/// use rowguard::schema::{Format, StringRules};
/// use serde_json::json;
///
/// let rules = StringRules::new()
///     .min_len(3)
///     .pattern(r"^[A-Z]+$")
///     .unwrap()
///     .format(Format::Date);
///
/// // Too short, wrong pattern and not a date: three violations.
/// let result = rules.validate(&json!("ab"), &JsonPath::from_field("Code"));
/// assert_eq!(result.into_result().unwrap_err().len(), 3);
///
/// // Non-strings are ignored.
/// assert!(rules.validate(&json!(7), &JsonPath::from_field("Code")).is_success());
/// ```
#[derive(Clone, Default)]
pub struct StringRules {
    constraints: Vec<StringConstraint>,
}

impl StringRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles the string keywords of a property.
    pub fn compile(field: &str, keywords: &Map<String, Value>) -> Result<Self, SchemaEvaluationError> {
        let mut rules = Self::new();

        if let Some(min) = count_keyword(field, keywords, "minLength")? {
            rules = rules.min_len(min);
        }
        if let Some(max) = count_keyword(field, keywords, "maxLength")? {
            rules = rules.max_len(max);
        }
        match keywords.get("pattern") {
            None => {}
            Some(Value::String(pattern)) => {
                rules = rules.pattern(pattern).map_err(|e| {
                    SchemaEvaluationError::InvalidPattern {
                        field: field.to_string(),
                        pattern: pattern.clone(),
                        reason: e.to_string(),
                    }
                })?;
            }
            Some(_) => return Err(super::invalid_keyword(field, "pattern", "a string")),
        }
        match keywords.get("format") {
            None => {}
            Some(Value::String(format)) => rules = rules.format(Format::parse(format)),
            Some(_) => return Err(super::invalid_keyword(field, "format", "a string")),
        }

        Ok(rules)
    }

    /// The string must have at least `min` characters.
    pub fn min_len(mut self, min: usize) -> Self {
        self.constraints.push(StringConstraint::MinLength { min });
        self
    }

    /// The string must have at most `max` characters.
    pub fn max_len(mut self, max: usize) -> Self {
        self.constraints.push(StringConstraint::MaxLength { max });
        self
    }

    /// The string must contain a match for `pattern` (unanchored search).
    pub fn pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        self.constraints.push(StringConstraint::Pattern {
            regex,
            pattern_str: pattern.to_string(),
        });
        Ok(self)
    }

    /// The string must satisfy a semantic format. Unknown formats always pass.
    pub fn format(mut self, format: Format) -> Self {
        self.constraints.push(StringConstraint::Format { format });
        self
    }

    /// Checks every rule against `value` if it is a string.
    pub fn validate(&self, value: &Value, path: &JsonPath) -> Validation<(), Violations> {
        let Some(s) = value.as_str() else {
            return Validation::Success(());
        };

        let violations: Vec<Violation> = self
            .constraints
            .iter()
            .filter_map(|c| check_constraint(c, s, path))
            .collect();

        match Violations::from_vec(violations) {
            None => Validation::Success(()),
            Some(violations) => Validation::Failure(violations),
        }
    }
}

fn check_constraint(constraint: &StringConstraint, value: &str, path: &JsonPath) -> Option<Violation> {
    let quoted = describe(&Value::String(value.to_string()));
    match constraint {
        StringConstraint::MinLength { min } => {
            let len = value.chars().count();
            (len < *min).then(|| {
                Violation::new(path.clone(), format!("{} is too short", quoted))
                    .with_code("minLength")
                    .with_expected(format!("at least {} characters", min))
                    .with_got(format!("{} characters", len))
            })
        }
        StringConstraint::MaxLength { max } => {
            let len = value.chars().count();
            (len > *max).then(|| {
                Violation::new(path.clone(), format!("{} is too long", quoted))
                    .with_code("maxLength")
                    .with_expected(format!("at most {} characters", max))
                    .with_got(format!("{} characters", len))
            })
        }
        StringConstraint::Pattern { regex, pattern_str } => (!regex.is_match(value)).then(|| {
            Violation::new(
                path.clone(),
                format!("{} does not match '{}'", quoted, pattern_str),
            )
            .with_code("pattern")
            .with_expected(format!("string matching '{}'", pattern_str))
            .with_got(value.to_string())
        }),
        StringConstraint::Format { format } => (!conforms(format, value)).then(|| {
            Violation::new(
                path.clone(),
                format!("{} is not a '{}'", quoted, format.as_str()),
            )
            .with_code("format")
            .with_expected(format.as_str().to_string())
            .with_got(value.to_string())
        }),
    }
}

fn conforms(format: &Format, value: &str) -> bool {
    match format {
        Format::Date => parse_iso_date(value).is_some(),
        Format::DateTime => DateTime::parse_from_rfc3339(value).is_ok(),
        Format::Email => value.contains('@'),
        Format::Uuid => is_hyphenated_uuid(value),
        Format::Other(_) => true,
    }
}

/// Parses strict `YYYY-MM-DD`: zero-padded, four-digit year, a real calendar
/// day. Signs, whitespace and short fields are rejected before chrono sees
/// the text, since `%Y` alone accepts all three.
pub(crate) fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn is_hyphenated_uuid(value: &str) -> bool {
    value.len() == 36
        && value.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unwrap_failure<T: std::fmt::Debug, E>(v: Validation<T, E>) -> E {
        v.into_result().unwrap_err()
    }

    fn compile(keywords: Value) -> Result<StringRules, SchemaEvaluationError> {
        StringRules::compile("field", keywords.as_object().unwrap())
    }

    #[test]
    fn test_length_rules() {
        let rules = compile(json!({"minLength": 2, "maxLength": 4})).unwrap();
        let path = JsonPath::from_field("Code");

        assert!(rules.validate(&json!("abc"), &path).is_success());

        let errors = unwrap_failure(rules.validate(&json!("a"), &path));
        assert_eq!(errors.first().code, "minLength");
        assert_eq!(errors.first().message, "'a' is too short");

        let errors = unwrap_failure(rules.validate(&json!("abcde"), &path));
        assert_eq!(errors.first().code, "maxLength");
        assert_eq!(errors.first().message, "'abcde' is too long");
    }

    #[test]
    fn test_unicode_length() {
        let rules = StringRules::new().min_len(3).max_len(3);
        assert!(rules.validate(&json!("日本語"), &JsonPath::root()).is_success());
    }

    #[test]
    fn test_pattern_is_a_search() {
        let rules = compile(json!({"pattern": "[0-9]{3}"})).unwrap();
        assert!(rules.validate(&json!("ab123cd"), &JsonPath::root()).is_success());

        let errors = unwrap_failure(rules.validate(&json!("ab12"), &JsonPath::root()));
        assert_eq!(errors.first().message, "'ab12' does not match '[0-9]{3}'");
    }

    #[test]
    fn test_invalid_pattern_fails_compilation() {
        let result = compile(json!({"pattern": "[unclosed"}));
        assert!(matches!(
            result,
            Err(SchemaEvaluationError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_bad_keyword_types_fail_compilation() {
        assert!(compile(json!({"minLength": "3"})).is_err());
        assert!(compile(json!({"pattern": 3})).is_err());
        assert!(compile(json!({"format": true})).is_err());
    }

    #[test]
    fn test_date_format() {
        let rules = StringRules::new().format(Format::Date);
        let path = JsonPath::from_field("OriginationDate");

        assert!(rules.validate(&json!("2024-02-29"), &path).is_success());
        assert!(rules.validate(&json!("9999-12-31"), &path).is_success());

        let errors = unwrap_failure(rules.validate(&json!("INVALID_DATE"), &path));
        assert_eq!(errors.first().code, "format");
        assert_eq!(errors.first().message, "'INVALID_DATE' is not a 'date'");

        assert!(rules.validate(&json!("2024-2-5"), &path).is_failure());
        assert!(rules.validate(&json!("2023-02-29"), &path).is_failure());
    }

    #[test]
    fn test_other_formats() {
        let datetime = StringRules::new().format(Format::DateTime);
        assert!(datetime
            .validate(&json!("2024-01-15T10:30:00Z"), &JsonPath::root())
            .is_success());
        assert!(datetime
            .validate(&json!("2024-01-15"), &JsonPath::root())
            .is_failure());

        let email = StringRules::new().format(Format::Email);
        assert!(email.validate(&json!("ops@example.com"), &JsonPath::root()).is_success());
        assert!(email.validate(&json!("ops"), &JsonPath::root()).is_failure());

        let uuid = StringRules::new().format(Format::Uuid);
        assert!(uuid
            .validate(&json!("67e55044-10b1-426f-9247-bb680e5fe0c8"), &JsonPath::root())
            .is_success());
        assert!(uuid.validate(&json!("67e55044"), &JsonPath::root()).is_failure());

        let custom = StringRules::new().format(Format::Other("cusip".into()));
        assert!(custom.validate(&json!("anything"), &JsonPath::root()).is_success());
    }

    #[test]
    fn test_accumulates_all_rules() {
        let rules = compile(json!({"minLength": 10, "pattern": "^[0-9]+$"})).unwrap();
        let errors = unwrap_failure(rules.validate(&json!("abc"), &JsonPath::root()));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.with_code("minLength").len(), 1);
        assert_eq!(errors.with_code("pattern").len(), 1);
    }

    #[test]
    fn test_non_strings_are_ignored() {
        let rules = compile(json!({"minLength": 5, "format": "date"})).unwrap();
        assert!(rules.validate(&json!(42), &JsonPath::root()).is_success());
        assert!(rules.validate(&json!(null), &JsonPath::root()).is_success());
    }
}
