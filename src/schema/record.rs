//! Record validation.
//!
//! This module provides [`RecordValidator`], a [`RecordSchema`] compiled into
//! executable rules. It validates one coerced record and accumulates every
//! violation: declared fields first (in schema order), then required fields
//! without a property entry, then undeclared columns, then record-level
//! property counts.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use stillwater::Validation;

use crate::coerce::{is_blank, CoercedRecord};
use crate::error::{SchemaEvaluationError, Violation, Violations};
use crate::path::JsonPath;

use super::field::FieldValidator;
use super::model::RecordSchema;
use super::traits::ValueValidator;
use super::{count_keyword, invalid_keyword};

/// How to handle columns the schema does not declare.
#[derive(Clone)]
enum AdditionalProperties {
    /// Allow unknown columns (default).
    Allow,
    /// Reject unknown columns.
    Deny,
    /// Validate unknown columns against a schema.
    Validate(Box<FieldValidator>),
}

#[derive(Clone)]
struct FieldEntry {
    validator: FieldValidator,
    required: bool,
}

/// A record schema compiled into rules.
///
/// Compile once per batch and share it: the validator holds no per-record
/// state and is `Send + Sync`.
///
/// # Example
///
/// ```rust
/// use rowguard::schema::{RecordSchema, RecordValidator};
/// use serde_json::json;
///
/// let schema = RecordSchema::from_value(json!({
///     "properties": {
///         "LoanNumber": {"type": "integer", "required": true},
///         "OriginationDate": {"type": "string", "format": "date"}
///     }
/// }))
/// .unwrap();
/// let validator = RecordValidator::compile(&schema).unwrap();
///
/// let record = json!({"LoanNumber": "", "OriginationDate": "NA"});
/// let errors = validator
///     .validate(record.as_object().unwrap())
///     .into_result()
///     .unwrap_err();
///
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors.first().code, "required");
/// assert_eq!(errors.first().column(), "LoanNumber");
/// ```
#[derive(Clone)]
pub struct RecordValidator {
    fields: IndexMap<String, FieldEntry>,
    undeclared_required: Vec<String>,
    additional_properties: AdditionalProperties,
    min_properties: Option<usize>,
    max_properties: Option<usize>,
}

impl RecordValidator {
    /// Compiles every rule in the schema.
    ///
    /// Fails if any keyword cannot be turned into a rule (an invalid regex,
    /// a non-numeric bound, a malformed combinator, ...).
    pub fn compile(schema: &RecordSchema) -> Result<Self, SchemaEvaluationError> {
        match schema.root_keyword("properties") {
            None | Some(Value::Object(_)) => {}
            Some(_) => return Err(invalid_keyword("(root)", "properties", "an object")),
        }
        match schema.root_keyword("required") {
            None => {}
            Some(Value::Array(names)) if names.iter().all(Value::is_string) => {}
            Some(_) => return Err(invalid_keyword("(root)", "required", "a list of field names")),
        }

        let mut fields = IndexMap::new();
        for spec in schema.fields() {
            let validator =
                FieldValidator::compile_schema(spec.name(), "properties", spec.definition())?;
            fields.insert(
                spec.name().to_string(),
                FieldEntry {
                    validator,
                    required: spec.is_required(),
                },
            );
        }

        let undeclared_required = schema
            .required()
            .filter(|name| !fields.contains_key(*name))
            .map(str::to_string)
            .collect();

        let additional_properties = match schema.root_keyword("additionalProperties") {
            None | Some(Value::Bool(true)) => AdditionalProperties::Allow,
            Some(Value::Bool(false)) => AdditionalProperties::Deny,
            Some(Value::Object(keywords)) => AdditionalProperties::Validate(Box::new(
                FieldValidator::compile("additionalProperties", keywords)?,
            )),
            Some(_) => {
                return Err(invalid_keyword(
                    "(root)",
                    "additionalProperties",
                    "a boolean or a schema object",
                ))
            }
        };

        let root = schema.document().as_object().cloned().unwrap_or_default();
        Ok(Self {
            fields,
            undeclared_required,
            additional_properties,
            min_properties: count_keyword("(root)", &root, "minProperties")?,
            max_properties: count_keyword("(root)", &root, "maxProperties")?,
        })
    }

    /// Validates one coerced record, collecting every violation.
    pub fn validate(&self, record: &CoercedRecord) -> Validation<(), Violations> {
        let mut violations = Vec::new();

        for (name, entry) in &self.fields {
            let path = JsonPath::from_field(name);
            let result = match record.get(name) {
                Some(Value::String(cell)) if is_blank(cell) => {
                    if entry.required {
                        violations.push(required_violation(name, path));
                        continue;
                    }
                    entry.validator.validate_membership(&Value::String(cell.clone()), &path)
                }
                Some(value) => entry.validator.validate_value(value, &path),
                None if entry.required => {
                    violations.push(required_violation(name, path));
                    continue;
                }
                None => continue,
            };
            if let Validation::Failure(found) = result {
                violations.extend(found);
            }
        }

        for name in &self.undeclared_required {
            let present = match record.get(name) {
                Some(Value::String(cell)) => !is_blank(cell),
                Some(_) => true,
                None => false,
            };
            if !present {
                violations.push(required_violation(name, JsonPath::from_field(name)));
            }
        }

        self.check_additional(record, &mut violations);
        self.check_counts(record, &mut violations);

        match Violations::from_vec(violations) {
            None => Validation::Success(()),
            Some(violations) => Validation::Failure(violations),
        }
    }

    fn check_additional(&self, record: &Map<String, Value>, violations: &mut Vec<Violation>) {
        let undeclared = record
            .iter()
            .filter(|(key, _)| !self.fields.contains_key(key.as_str()));

        for (key, value) in undeclared {
            let path = JsonPath::from_field(key);
            match &self.additional_properties {
                AdditionalProperties::Allow => {}
                AdditionalProperties::Deny => violations.push(
                    Violation::new(
                        path,
                        format!(
                            "Additional properties are not allowed ('{}' was unexpected)",
                            key
                        ),
                    )
                    .with_code("additionalProperties"),
                ),
                AdditionalProperties::Validate(validator) => {
                    if let Validation::Failure(found) = validator.validate_value(value, &path) {
                        violations.extend(found);
                    }
                }
            }
        }
    }

    fn check_counts(&self, record: &Map<String, Value>, violations: &mut Vec<Violation>) {
        let count = record.len();
        if let Some(min) = self.min_properties {
            if count < min {
                violations.push(
                    Violation::new(
                        JsonPath::root(),
                        format!("record has {} properties, fewer than the minimum of {}", count, min),
                    )
                    .with_code("minProperties"),
                );
            }
        }
        if let Some(max) = self.max_properties {
            if count > max {
                violations.push(
                    Violation::new(
                        JsonPath::root(),
                        format!("record has {} properties, more than the maximum of {}", count, max),
                    )
                    .with_code("maxProperties"),
                );
            }
        }
    }
}

fn required_violation(name: &str, path: JsonPath) -> Violation {
    Violation::new(path, format!("'{}' is a required property", name))
        .with_code("required")
        .with_expected("a value")
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<RecordValidator>();
    assert_sync::<RecordValidator>();
};
