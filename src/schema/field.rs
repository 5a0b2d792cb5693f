//! Compiled rules for a single field.

use serde_json::{Map, Value};
use stillwater::prelude::*;
use stillwater::Validation;

use crate::error::{SchemaEvaluationError, Violation, Violations};
use crate::path::JsonPath;

use super::combinators::CombinatorSchema;
use super::model::TypeTag;
use super::numeric::NumericRules;
use super::string::StringRules;
use super::traits::ValueValidator;
use super::{describe, invalid_keyword, value_type_name};

/// Every rule declared on one property, compiled.
///
/// Rules are independent: a value can fail its type, its `enum` and a
/// combinator at once, and each failure is reported. String and numeric
/// rules skip values of other kinds, so a failed coercion (a sentinel string
/// in a numeric column) is reported once, by the type check.
///
/// # Example
///
/// ```rust
/// use rowguard::JsonPath;
/// use rowguard::schema::{FieldValidator, ValueValidator};
/// use serde_json::json;
///
/// let keywords = json!({"type": "integer", "minimum": 1});
/// let field = FieldValidator::compile("LoanNumber", keywords.as_object().unwrap()).unwrap();
///
/// let path = JsonPath::from_field("LoanNumber");
/// assert!(field.validate_value(&json!(12345), &path).is_success());
///
/// let errors = field
///     .validate_value(&json!("INVALID_INTEGER"), &path)
///     .into_result()
///     .unwrap_err();
/// assert_eq!(errors.first().message, "'INVALID_INTEGER' is not of type 'integer'");
/// ```
#[derive(Clone)]
pub struct FieldValidator {
    rejects_all: bool,
    types: Vec<TypeTag>,
    allowed: Option<Vec<Value>>,
    constant: Option<Value>,
    strings: StringRules,
    numbers: NumericRules,
    combinators: Vec<CombinatorSchema>,
}

impl FieldValidator {
    /// Compiles a subschema: a keyword object, or `true`/`false`.
    ///
    /// `keyword` names where the subschema sits (`properties`, `anyOf`, ...)
    /// and is only used in the error for any other JSON value.
    pub fn compile_schema(
        name: &str,
        keyword: &str,
        schema: &Value,
    ) -> Result<Self, SchemaEvaluationError> {
        match schema {
            Value::Object(keywords) => Self::compile(name, keywords),
            Value::Bool(accepts) => Ok(Self {
                rejects_all: !accepts,
                ..Self::compile(name, &Map::new())?
            }),
            _ => Err(SchemaEvaluationError::InvalidSubschema {
                field: name.to_string(),
                keyword: keyword.to_string(),
            }),
        }
    }

    /// Compiles the keywords of a property (or of a combinator operand).
    ///
    /// Only an explicit `type` is enforced; a property without one accepts
    /// values of any type.
    pub fn compile(name: &str, keywords: &Map<String, Value>) -> Result<Self, SchemaEvaluationError> {
        let types = match keywords.get("type") {
            None => Vec::new(),
            Some(Value::String(tag)) => vec![TypeTag::parse(tag)],
            Some(Value::Array(tags)) => tags
                .iter()
                .map(|tag| {
                    tag.as_str()
                        .map(TypeTag::parse)
                        .ok_or_else(|| invalid_keyword(name, "type", "a string or list of strings"))
                })
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(invalid_keyword(name, "type", "a string or list of strings")),
        };

        let allowed = match keywords.get("enum") {
            None => None,
            Some(Value::Array(values)) => Some(values.clone()),
            Some(_) => return Err(invalid_keyword(name, "enum", "a list")),
        };

        Ok(Self {
            rejects_all: false,
            types,
            allowed,
            constant: keywords.get("const").cloned(),
            strings: StringRules::compile(name, keywords)?,
            numbers: NumericRules::compile(name, keywords)?,
            combinators: CombinatorSchema::compile_all(name, keywords)?,
        })
    }

    /// Checks only `enum` and `const`.
    ///
    /// Used for blank cells, which are not typed values but may still be
    /// excluded by an enumeration.
    pub fn validate_membership(&self, value: &Value, path: &JsonPath) -> Validation<(), Violations> {
        let violations: Vec<Violation> = [self.check_enum(value, path), self.check_const(value, path)]
            .into_iter()
            .flatten()
            .collect();

        match Violations::from_vec(violations) {
            None => Validation::Success(()),
            Some(violations) => Validation::Failure(violations),
        }
    }

    fn check_rejects_all(&self, value: &Value, path: &JsonPath) -> Option<Violation> {
        self.rejects_all.then(|| {
            Violation::new(path.clone(), format!("False schema does not allow {}", describe(value)))
                .with_code("false")
                .with_got(describe(value))
        })
    }

    fn check_type(&self, value: &Value, path: &JsonPath) -> Option<Violation> {
        if self.types.is_empty() || self.types.iter().any(|t| t.matches(value)) {
            return None;
        }
        let names: Vec<String> = self.types.iter().map(|t| format!("'{}'", t)).collect();
        Some(
            Violation::new(
                path.clone(),
                format!("{} is not of type {}", describe(value), names.join(", ")),
            )
            .with_code("type")
            .with_expected(names.join(" or "))
            .with_got(value_type_name(value)),
        )
    }

    fn check_enum(&self, value: &Value, path: &JsonPath) -> Option<Violation> {
        let allowed = self.allowed.as_ref()?;
        if allowed.iter().any(|candidate| json_equal(candidate, value)) {
            return None;
        }
        let listed: Vec<String> = allowed.iter().map(describe).collect();
        Some(
            Violation::new(
                path.clone(),
                format!("{} is not one of [{}]", describe(value), listed.join(", ")),
            )
            .with_code("enum")
            .with_got(describe(value)),
        )
    }

    fn check_const(&self, value: &Value, path: &JsonPath) -> Option<Violation> {
        let expected = self.constant.as_ref()?;
        if json_equal(expected, value) {
            return None;
        }
        Some(
            Violation::new(path.clone(), format!("{} was expected", describe(expected)))
                .with_code("const")
                .with_expected(describe(expected))
                .with_got(describe(value)),
        )
    }
}

impl ValueValidator for FieldValidator {
    fn validate_value(&self, value: &Value, path: &JsonPath) -> Validation<(), Violations> {
        let local: Vec<Violation> = [
            self.check_rejects_all(value, path),
            self.check_type(value, path),
            self.check_enum(value, path),
            self.check_const(value, path),
        ]
        .into_iter()
        .flatten()
        .collect();

        let results = std::iter::once(self.strings.validate(value, path))
            .chain(std::iter::once(self.numbers.validate(value, path)))
            .chain(self.combinators.iter().map(|c| c.validate_value(value, path)));

        let mut accumulated = Violations::from_vec(local);
        for result in results {
            if let Validation::Failure(violations) = result {
                accumulated = Some(match accumulated {
                    Some(existing) => existing.combine(violations),
                    None => violations,
                });
            }
        }

        match accumulated {
            None => Validation::Success(()),
            Some(violations) => Validation::Failure(violations),
        }
    }
}

/// JSON equality where numbers compare by value, so `1` equals `1.0`.
fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| json_equal(x, y)))
        }
        _ => a == b,
    }
}
