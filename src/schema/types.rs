//! Schema type definitions.
//!
//! Supported field kinds: string, number, integer, boolean, array,
//! object. Constraints are attached per kind as a closed tagged union
//! so that evaluation is pure dispatch, with no reflection-style
//! dynamic typing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use super::errors::{SchemaError, SchemaResult};

/// String `format` constraints recognized by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldFormat {
    /// Loose mailbox syntax check (`local@domain.tld`).
    #[serde(rename = "email")]
    Email,
    /// RFC 3339 timestamp.
    #[serde(rename = "date-time")]
    DateTime,
}

impl FieldFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldFormat::Email => "email",
            FieldFormat::DateTime => "date-time",
        }
    }
}

/// Field kind with the constraints that apply to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    /// UTF-8 string with optional length, pattern and format bounds.
    String {
        #[serde(default, rename = "minLength", skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        #[serde(default, rename = "maxLength", skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<FieldFormat>,
    },
    /// 64-bit floating point with optional numeric bounds.
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<f64>,
    },
    /// 64-bit signed integer with optional numeric bounds.
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<i64>,
    },
    /// Boolean.
    Boolean,
    /// Array; elements are not constrained by this subset.
    Array,
    /// Object; nested properties are not constrained by this subset.
    Object,
}

impl FieldKind {
    /// Returns the kind name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldKind::String { .. } => "string",
            FieldKind::Number { .. } => "number",
            FieldKind::Integer { .. } => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::Array => "array",
            FieldKind::Object => "object",
        }
    }

    /// Unconstrained string kind.
    pub fn string() -> Self {
        FieldKind::String {
            min_length: None,
            max_length: None,
            pattern: None,
            format: None,
        }
    }

    /// Unconstrained number kind.
    pub fn number() -> Self {
        FieldKind::Number {
            minimum: None,
            maximum: None,
        }
    }

    /// Unconstrained integer kind.
    pub fn integer() -> Self {
        FieldKind::Integer {
            minimum: None,
            maximum: None,
        }
    }
}

/// One named field in a schema: its kind plus the kind-independent
/// `enum` and `default` constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Closed set of allowed values, compared without coercion.
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
    /// Applied to absent optional fields before validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldSchema {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            allowed: None,
            default: None,
        }
    }

    pub fn string() -> Self {
        Self::new(FieldKind::string())
    }

    pub fn integer() -> Self {
        Self::new(FieldKind::integer())
    }

    pub fn number() -> Self {
        Self::new(FieldKind::number())
    }

    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean)
    }

    /// Attach an allowed-values set.
    pub fn with_allowed(mut self, values: Vec<Value>) -> Self {
        self.allowed = Some(values);
        self
    }

    /// Attach a default value.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Attach a minimum-length bound. String kinds only.
    pub fn with_min_length(mut self, bound: usize) -> Self {
        if let FieldKind::String { min_length, .. } = &mut self.kind {
            *min_length = Some(bound);
        }
        self
    }

    /// Attach a maximum-length bound. String kinds only.
    pub fn with_max_length(mut self, bound: usize) -> Self {
        if let FieldKind::String { max_length, .. } = &mut self.kind {
            *max_length = Some(bound);
        }
        self
    }

    /// Attach a regex pattern. String kinds only; the pattern is
    /// compiled during structural validation, not here.
    pub fn with_pattern(mut self, value: impl Into<String>) -> Self {
        if let FieldKind::String { pattern, .. } = &mut self.kind {
            *pattern = Some(value.into());
        }
        self
    }

    /// Attach a string format. String kinds only.
    pub fn with_format(mut self, value: FieldFormat) -> Self {
        if let FieldKind::String { format, .. } = &mut self.kind {
            *format = Some(value);
        }
        self
    }

    /// Attach an inclusive lower bound. Numeric kinds only; integer
    /// kinds take the whole-number part.
    pub fn with_minimum(mut self, bound: f64) -> Self {
        match &mut self.kind {
            FieldKind::Number { minimum, .. } => *minimum = Some(bound),
            FieldKind::Integer { minimum, .. } => *minimum = Some(bound as i64),
            _ => {}
        }
        self
    }

    /// Attach an inclusive upper bound. Numeric kinds only; integer
    /// kinds take the whole-number part.
    pub fn with_maximum(mut self, bound: f64) -> Self {
        match &mut self.kind {
            FieldKind::Number { maximum, .. } => *maximum = Some(bound),
            FieldKind::Integer { maximum, .. } => *maximum = Some(bound as i64),
            _ => {}
        }
        self
    }
}

/// A complete record schema: named properties plus the required set.
///
/// The root is always an object; this subset has no other root kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Field declarations, keyed by payload field name. Kept ordered
    /// so validation output is deterministic.
    #[serde(default)]
    pub properties: BTreeMap<String, FieldSchema>,
    /// Names that must be present and non-null in every payload.
    #[serde(default)]
    pub required: BTreeSet<String>,
}

impl SchemaDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a property.
    pub fn with_property(mut self, name: impl Into<String>, field: FieldSchema) -> Self {
        self.properties.insert(name.into(), field);
        self
    }

    /// Mark a declared property as required.
    pub fn with_required(mut self, name: impl Into<String>) -> Self {
        self.required.insert(name.into());
        self
    }

    /// Validates the schema structure itself (not a payload).
    ///
    /// Every name in `required` must exist in `properties`, and every
    /// declared `pattern` must compile.
    pub fn validate_structure(&self) -> SchemaResult<()> {
        for name in &self.required {
            if !self.properties.contains_key(name) {
                return Err(SchemaError::UndeclaredRequired(name.clone()));
            }
        }

        for (name, field) in &self.properties {
            if let FieldKind::String {
                pattern: Some(pattern),
                ..
            } = &field.kind
            {
                if let Err(err) = regex::Regex::new(pattern) {
                    return Err(SchemaError::InvalidPattern {
                        field: name.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
