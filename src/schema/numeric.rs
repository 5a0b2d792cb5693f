//! Numeric rules.
//!
//! This module provides [`NumericRules`] for `minimum`, `maximum`,
//! `exclusiveMinimum`, `exclusiveMaximum` and `multipleOf`. Like the string
//! rules they only apply to values of their own kind: a sentinel such as
//! `INVALID_NUMBER` is left to the type check.

use serde_json::{Map, Value};
use stillwater::Validation;

use crate::error::{SchemaEvaluationError, Violation, Violations};
use crate::path::JsonPath;

use super::{invalid_keyword, number_keyword};

/// A bound as declared: its numeric value plus the text used in messages.
#[derive(Clone, Debug, PartialEq)]
struct Bound {
    value: f64,
    text: String,
}

#[derive(Clone, Debug, PartialEq)]
enum NumericConstraint {
    Minimum(Bound),
    Maximum(Bound),
    ExclusiveMinimum(Bound),
    ExclusiveMaximum(Bound),
    MultipleOf(Bound),
}

/// The numeric rules of one field.
///
/// # Example
///
/// ```rust
/// use rowguard::JsonPath;
/// use rowguard::schema::NumericRules;
/// use serde_json::json;
///
/// let keywords = json!({"minimum": 0, "maximum": 100});
/// let rules = NumericRules::compile("Rate", keywords.as_object().unwrap()).unwrap();
///
/// assert!(rules.validate(&json!(42.5), &JsonPath::from_field("Rate")).is_success());
/// assert!(rules.validate(&json!(-1), &JsonPath::from_field("Rate")).is_failure());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NumericRules {
    constraints: Vec<NumericConstraint>,
}

impl NumericRules {
    /// Compiles the numeric keywords of a property.
    ///
    /// `multipleOf` must be strictly positive.
    pub fn compile(field: &str, keywords: &Map<String, Value>) -> Result<Self, SchemaEvaluationError> {
        let mut constraints = Vec::new();
        let bound = |name| {
            number_keyword(field, keywords, name)
                .map(|found| found.map(|(value, text)| Bound { value, text }))
        };

        if let Some(b) = bound("minimum")? {
            constraints.push(NumericConstraint::Minimum(b));
        }
        if let Some(b) = bound("maximum")? {
            constraints.push(NumericConstraint::Maximum(b));
        }
        if let Some(b) = bound("exclusiveMinimum")? {
            constraints.push(NumericConstraint::ExclusiveMinimum(b));
        }
        if let Some(b) = bound("exclusiveMaximum")? {
            constraints.push(NumericConstraint::ExclusiveMaximum(b));
        }
        if let Some(b) = bound("multipleOf")? {
            if b.value <= 0.0 {
                return Err(invalid_keyword(field, "multipleOf", "a number greater than 0"));
            }
            constraints.push(NumericConstraint::MultipleOf(b));
        }

        Ok(Self { constraints })
    }

    /// Checks every rule against `value` if it is a number.
    pub fn validate(&self, value: &Value, path: &JsonPath) -> Validation<(), Violations> {
        let Some(n) = value.as_f64() else {
            return Validation::Success(());
        };
        let shown = value.to_string();

        let violations: Vec<Violation> = self
            .constraints
            .iter()
            .filter_map(|c| check_constraint(c, n, &shown, path))
            .collect();

        match Violations::from_vec(violations) {
            None => Validation::Success(()),
            Some(violations) => Validation::Failure(violations),
        }
    }
}

fn check_constraint(
    constraint: &NumericConstraint,
    value: f64,
    shown: &str,
    path: &JsonPath,
) -> Option<Violation> {
    let (failed, code, message, expected) = match constraint {
        NumericConstraint::Minimum(b) => (
            value < b.value,
            "minimum",
            format!("{} is less than the minimum of {}", shown, b.text),
            format!("at least {}", b.text),
        ),
        NumericConstraint::Maximum(b) => (
            value > b.value,
            "maximum",
            format!("{} is greater than the maximum of {}", shown, b.text),
            format!("at most {}", b.text),
        ),
        NumericConstraint::ExclusiveMinimum(b) => (
            value <= b.value,
            "exclusiveMinimum",
            format!("{} is less than or equal to the minimum of {}", shown, b.text),
            format!("greater than {}", b.text),
        ),
        NumericConstraint::ExclusiveMaximum(b) => (
            value >= b.value,
            "exclusiveMaximum",
            format!("{} is greater than or equal to the maximum of {}", shown, b.text),
            format!("less than {}", b.text),
        ),
        NumericConstraint::MultipleOf(b) => {
            let quotient = value / b.value;
            (
                !quotient.is_finite() || quotient.fract() != 0.0,
                "multipleOf",
                format!("{} is not a multiple of {}", shown, b.text),
                format!("a multiple of {}", b.text),
            )
        }
    };

    failed.then(|| {
        Violation::new(path.clone(), message)
            .with_code(code)
            .with_expected(expected)
            .with_got(shown.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unwrap_failure<T: std::fmt::Debug, E>(v: Validation<T, E>) -> E {
        v.into_result().unwrap_err()
    }

    fn compile(keywords: Value) -> Result<NumericRules, SchemaEvaluationError> {
        NumericRules::compile("field", keywords.as_object().unwrap())
    }

    #[test]
    fn test_inclusive_bounds() {
        let rules = compile(json!({"minimum": 1, "maximum": 10})).unwrap();
        let path = JsonPath::from_field("Term");

        assert!(rules.validate(&json!(1), &path).is_success());
        assert!(rules.validate(&json!(10), &path).is_success());

        let errors = unwrap_failure(rules.validate(&json!(0), &path));
        assert_eq!(errors.first().message, "0 is less than the minimum of 1");
        assert_eq!(errors.first().code, "minimum");

        let errors = unwrap_failure(rules.validate(&json!(11), &path));
        assert_eq!(errors.first().message, "11 is greater than the maximum of 10");
    }

    #[test]
    fn test_exclusive_bounds() {
        let rules = compile(json!({"exclusiveMinimum": 0, "exclusiveMaximum": 1})).unwrap();

        assert!(rules.validate(&json!(0.5), &JsonPath::root()).is_success());

        let errors = unwrap_failure(rules.validate(&json!(0), &JsonPath::root()));
        assert_eq!(errors.first().code, "exclusiveMinimum");

        let errors = unwrap_failure(rules.validate(&json!(1), &JsonPath::root()));
        assert_eq!(errors.first().code, "exclusiveMaximum");
    }

    #[test]
    fn test_multiple_of() {
        let rules = compile(json!({"multipleOf": 0.25})).unwrap();
        assert!(rules.validate(&json!(1.75), &JsonPath::root()).is_success());

        let errors = unwrap_failure(rules.validate(&json!(1.3), &JsonPath::root()));
        assert_eq!(errors.first().message, "1.3 is not a multiple of 0.25");

        let rules = compile(json!({"multipleOf": 5})).unwrap();
        assert!(rules.validate(&json!(25), &JsonPath::root()).is_success());
        assert!(rules.validate(&json!(7), &JsonPath::root()).is_failure());
    }

    #[test]
    fn test_accumulates_violations() {
        let rules = compile(json!({"minimum": 10, "multipleOf": 3})).unwrap();
        let errors = unwrap_failure(rules.validate(&json!(4), &JsonPath::root()));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_non_numbers_are_ignored() {
        let rules = compile(json!({"minimum": 10})).unwrap();
        assert!(rules
            .validate(&json!("INVALID_NUMBER"), &JsonPath::root())
            .is_success());
    }

    #[test]
    fn test_invalid_keywords() {
        assert!(compile(json!({"minimum": "10"})).is_err());
        assert!(compile(json!({"multipleOf": 0})).is_err());
        assert!(compile(json!({"exclusiveMaximum": true})).is_err());
    }
}
