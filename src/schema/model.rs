//! The in-memory schema model.
//!
//! A [`RecordSchema`] maps column names to [`FieldSpec`]s and remembers the
//! document it was built from. It is pure data: coercion reads the declared
//! type and format, and [`RecordValidator`](super::RecordValidator) compiles
//! the remaining keywords into rules.

use std::fmt::{self, Display};
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::error::SchemaLoadError;

/// A primitive JSON-Schema type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    String,
    Integer,
    Number,
    Boolean,
    Null,
    Object,
    Array,
    /// A tag this crate does not know. Coerced like `string`, matches nothing.
    Other(String),
}

impl TypeTag {
    /// Parses a tag name as written in the schema document.
    pub fn parse(name: &str) -> Self {
        match name {
            "string" => TypeTag::String,
            "integer" => TypeTag::Integer,
            "number" => TypeTag::Number,
            "boolean" => TypeTag::Boolean,
            "null" => TypeTag::Null,
            "object" => TypeTag::Object,
            "array" => TypeTag::Array,
            other => TypeTag::Other(other.to_string()),
        }
    }

    /// The tag name as written in the schema document.
    pub fn as_str(&self) -> &str {
        match self {
            TypeTag::String => "string",
            TypeTag::Integer => "integer",
            TypeTag::Number => "number",
            TypeTag::Boolean => "boolean",
            TypeTag::Null => "null",
            TypeTag::Object => "object",
            TypeTag::Array => "array",
            TypeTag::Other(name) => name,
        }
    }

    /// Returns true if `value` is an instance of this type.
    ///
    /// `integer` accepts any number with no fractional part, so `3.0`
    /// counts as an integer; `number` accepts every number.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeTag::String, Value::String(_)) => true,
            (TypeTag::Integer, Value::Number(n)) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            (TypeTag::Number, Value::Number(_)) => true,
            (TypeTag::Boolean, Value::Bool(_)) => true,
            (TypeTag::Null, Value::Null) => true,
            (TypeTag::Object, Value::Object(_)) => true,
            (TypeTag::Array, Value::Array(_)) => true,
            _ => false,
        }
    }

    /// The in-band marker for a value that could not be coerced to this type.
    pub fn sentinel(&self) -> String {
        format!("INVALID_{}", self.as_str().to_uppercase())
    }
}

impl Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A semantic `format` tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Format {
    Date,
    DateTime,
    Email,
    Uuid,
    /// Accepted but never checked.
    Other(String),
}

impl Format {
    pub fn parse(name: &str) -> Self {
        match name {
            "date" => Format::Date,
            "date-time" => Format::DateTime,
            "email" => Format::Email,
            "uuid" => Format::Uuid,
            other => Format::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Format::Date => "date",
            Format::DateTime => "date-time",
            Format::Email => "email",
            Format::Uuid => "uuid",
            Format::Other(name) => name,
        }
    }
}

/// Declared rules for a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    name: String,
    types: Vec<TypeTag>,
    format: Option<Format>,
    required: bool,
    definition: Value,
}

impl FieldSpec {
    /// Builds a field spec from its `properties` entry.
    ///
    /// `type` may be a single tag or a list of tags. A missing, empty or
    /// malformed `type` is treated as `string` for coercion; the malformed
    /// keyword itself is reported when the property is compiled into rules.
    /// Boolean subschemas (`true`, `false`) carry no type and no format.
    pub fn from_value(name: impl Into<String>, value: &Value) -> Self {
        let keywords = value.as_object();
        let mut types: Vec<TypeTag> = match keywords.and_then(|k| k.get("type")) {
            Some(Value::String(tag)) => vec![TypeTag::parse(tag)],
            Some(Value::Array(tags)) if tags.iter().all(Value::is_string) => {
                tags.iter().filter_map(Value::as_str).map(TypeTag::parse).collect()
            }
            _ => Vec::new(),
        };
        if types.is_empty() {
            types.push(TypeTag::String);
        }

        let format = keywords
            .and_then(|k| k.get("format"))
            .and_then(Value::as_str)
            .map(Format::parse);
        let required =
            keywords.and_then(|k| k.get("required")).and_then(Value::as_bool) == Some(true);

        Self {
            name: name.into(),
            types,
            format,
            required,
            definition: value.clone(),
        }
    }

    /// The column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All allowed types, in declaration order. Never empty.
    pub fn types(&self) -> &[TypeTag] {
        &self.types
    }

    /// The first declared type; drives coercion and sentinel naming.
    pub fn primary_type(&self) -> &TypeTag {
        &self.types[0]
    }

    pub fn format(&self) -> Option<&Format> {
        self.format.as_ref()
    }

    /// True if the field is required, either by `required: true` on the
    /// property or by the document's `required` list.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The property's subschema exactly as written.
    pub fn definition(&self) -> &Value {
        &self.definition
    }
}

/// A record schema loaded from a JSON-Schema-like document.
///
/// # Example
///
/// ```rust
/// use rowguard::schema::{RecordSchema, TypeTag};
/// use serde_json::json;
///
/// let schema = RecordSchema::from_value(json!({
///     "type": "object",
///     "properties": {
///         "LoanNumber": {"type": "integer", "required": true},
///         "Balance": {"type": ["number", "null"]}
///     }
/// }))
/// .unwrap();
///
/// let loan = schema.lookup("LoanNumber").unwrap();
/// assert_eq!(loan.primary_type(), &TypeTag::Integer);
/// assert!(loan.is_required());
/// assert_eq!(schema.lookup("Balance").unwrap().types().len(), 2);
/// assert!(schema.lookup("Unknown").is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    fields: IndexMap<String, FieldSpec>,
    required: IndexSet<String>,
    document: Value,
}

impl RecordSchema {
    /// Builds a schema from a parsed JSON document.
    pub fn from_value(document: Value) -> Result<Self, SchemaLoadError> {
        let root = document
            .as_object()
            .ok_or_else(|| SchemaLoadError::Shape("schema must be a JSON object".to_string()))?;

        // Malformed `required` and `properties` load as empty; they are
        // reported when the schema is compiled into rules.
        let mut required: IndexSet<String> = match root.get("required") {
            Some(Value::Array(names)) if names.iter().all(Value::is_string) => names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => IndexSet::new(),
        };

        let mut fields = IndexMap::new();
        if let Some(Value::Object(properties)) = root.get("properties") {
            for (name, property) in properties {
                let mut spec = FieldSpec::from_value(name.clone(), property);
                if spec.required {
                    required.insert(name.clone());
                } else if required.contains(name) {
                    spec.required = true;
                }
                fields.insert(name.clone(), spec);
            }
        }

        Ok(Self {
            fields,
            required,
            document,
        })
    }

    /// Parses a schema from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaLoadError> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Reads and parses a schema file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaLoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SchemaLoadError::Io(path.to_path_buf(), e))?;
        Self::from_json_str(&text)
    }

    /// Returns the spec for a column, if the schema declares it.
    pub fn lookup(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Declared fields in document order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    /// Names of all required fields, including ones without a property entry.
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(String::as_str)
    }

    /// Looks up a keyword on the document root (e.g. `additionalProperties`).
    pub fn root_keyword(&self, name: &str) -> Option<&Value> {
        self.document.get(name)
    }

    /// The document exactly as it was loaded.
    pub fn document(&self) -> &Value {
        &self.document
    }
}
