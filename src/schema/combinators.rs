//! Schema combinators: `anyOf`, `oneOf`, `allOf` and `not`.
//!
//! Operands are compiled [`FieldValidator`](super::FieldValidator)s held
//! behind `Arc<dyn ValueValidator>`, so combinators nest to any depth.

use serde_json::{Map, Value};
use std::sync::Arc;
use stillwater::Validation;

use crate::error::{SchemaEvaluationError, Violation, Violations};
use crate::path::JsonPath;

use super::describe;
use super::field::FieldValidator;
use super::traits::ValueValidator;

/// A combinator over one or more sub-schemas.
#[derive(Clone)]
pub enum CombinatorSchema {
    /// At least one operand must accept the value.
    AnyOf(Vec<Arc<dyn ValueValidator>>),

    /// Exactly one operand must accept the value.
    OneOf(Vec<Arc<dyn ValueValidator>>),

    /// Every operand must accept the value; violations from all failing
    /// operands are accumulated.
    AllOf(Vec<Arc<dyn ValueValidator>>),

    /// The operand must reject the value. The operand's source is kept for
    /// the message.
    Not {
        validator: Arc<dyn ValueValidator>,
        source: Value,
    },
}

impl CombinatorSchema {
    /// Compiles every combinator keyword present on a property, in the order
    /// `allOf`, `anyOf`, `oneOf`, `not`.
    pub fn compile_all(
        field: &str,
        keywords: &Map<String, Value>,
    ) -> Result<Vec<Self>, SchemaEvaluationError> {
        let mut combinators = Vec::new();

        if let Some(operands) = keywords.get("allOf") {
            combinators.push(CombinatorSchema::AllOf(compile_operands(field, "allOf", operands)?));
        }
        if let Some(operands) = keywords.get("anyOf") {
            combinators.push(CombinatorSchema::AnyOf(compile_operands(field, "anyOf", operands)?));
        }
        if let Some(operands) = keywords.get("oneOf") {
            combinators.push(CombinatorSchema::OneOf(compile_operands(field, "oneOf", operands)?));
        }
        if let Some(source) = keywords.get("not") {
            let validator = compile_operand(field, "not", source)?;
            combinators.push(CombinatorSchema::Not {
                validator,
                source: source.clone(),
            });
        }

        Ok(combinators)
    }

    fn validate_any_of(
        validators: &[Arc<dyn ValueValidator>],
        value: &Value,
        path: &JsonPath,
    ) -> Validation<(), Violations> {
        if validators.iter().any(|v| v.accepts(value)) {
            return Validation::Success(());
        }
        Validation::Failure(Violations::single(
            Violation::new(
                path.clone(),
                format!("{} is not valid under any of the given schemas", describe(value)),
            )
            .with_code("anyOf"),
        ))
    }

    fn validate_one_of(
        validators: &[Arc<dyn ValueValidator>],
        value: &Value,
        path: &JsonPath,
    ) -> Validation<(), Violations> {
        let matched: Vec<usize> = validators
            .iter()
            .enumerate()
            .filter(|(_, v)| v.accepts(value))
            .map(|(i, _)| i)
            .collect();

        match matched.len() {
            1 => Validation::Success(()),
            0 => Validation::Failure(Violations::single(
                Violation::new(
                    path.clone(),
                    format!("{} is not valid under any of the given schemas", describe(value)),
                )
                .with_code("oneOf"),
            )),
            _ => Validation::Failure(Violations::single(
                Violation::new(
                    path.clone(),
                    format!(
                        "{} is valid under each of the schemas at {:?}",
                        describe(value),
                        matched
                    ),
                )
                .with_code("oneOf"),
            )),
        }
    }

    fn validate_all_of(
        validators: &[Arc<dyn ValueValidator>],
        value: &Value,
        path: &JsonPath,
    ) -> Validation<(), Violations> {
        let violations: Vec<Violation> = validators
            .iter()
            .filter_map(|v| v.validate_value(value, path).into_result().err())
            .flat_map(Violations::into_vec)
            .collect();

        match Violations::from_vec(violations) {
            None => Validation::Success(()),
            Some(violations) => Validation::Failure(violations),
        }
    }

    fn validate_not(
        validator: &Arc<dyn ValueValidator>,
        source: &Value,
        value: &Value,
        path: &JsonPath,
    ) -> Validation<(), Violations> {
        if validator.accepts(value) {
            Validation::Failure(Violations::single(
                Violation::new(
                    path.clone(),
                    format!("{} should not be valid under {}", describe(value), source),
                )
                .with_code("not"),
            ))
        } else {
            Validation::Success(())
        }
    }
}

impl ValueValidator for CombinatorSchema {
    fn validate_value(&self, value: &Value, path: &JsonPath) -> Validation<(), Violations> {
        match self {
            CombinatorSchema::AnyOf(validators) => Self::validate_any_of(validators, value, path),
            CombinatorSchema::OneOf(validators) => Self::validate_one_of(validators, value, path),
            CombinatorSchema::AllOf(validators) => Self::validate_all_of(validators, value, path),
            CombinatorSchema::Not { validator, source } => {
                Self::validate_not(validator, source, value, path)
            }
        }
    }
}

fn compile_operands(
    field: &str,
    keyword: &str,
    operands: &Value,
) -> Result<Vec<Arc<dyn ValueValidator>>, SchemaEvaluationError> {
    match operands {
        Value::Array(items) if !items.is_empty() => items
            .iter()
            .map(|item| compile_operand(field, keyword, item))
            .collect(),
        _ => Err(SchemaEvaluationError::InvalidSubschema {
            field: field.to_string(),
            keyword: keyword.to_string(),
        }),
    }
}

fn compile_operand(
    field: &str,
    keyword: &str,
    operand: &Value,
) -> Result<Arc<dyn ValueValidator>, SchemaEvaluationError> {
    Ok(Arc::new(FieldValidator::compile_schema(field, keyword, operand)?))
}
