//! Payload validation against a schema definition.
//!
//! Pure functions over schema + payload. No side effects, no store
//! access. All violations are collected and returned together, in
//! deterministic (field-name) order, so callers can report every
//! problem at once.

use chrono::DateTime;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use super::errors::Violation;
use super::types::{FieldFormat, FieldKind, FieldSchema, SchemaDefinition};

/// Loose mailbox check: something, an @, a dotted domain.
fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

/// Applies declared `default` values to absent optional fields.
///
/// Required fields never receive defaults: a missing required field
/// must surface as a violation, not be papered over.
pub fn apply_defaults(schema: &SchemaDefinition, payload: &mut Map<String, Value>) {
    for (name, field) in &schema.properties {
        if schema.required.contains(name) {
            continue;
        }
        if let Some(default) = &field.default {
            if !payload.contains_key(name) {
                payload.insert(name.clone(), default.clone());
            }
        }
    }
}

/// Validates a payload against a schema.
///
/// Checks, in order: every required field is present and non-null;
/// every present declared field matches its kind and constraints.
/// Undeclared payload fields pass through unvalidated (open schema).
pub fn validate(schema: &SchemaDefinition, payload: &Map<String, Value>) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    for name in &schema.required {
        match payload.get(name) {
            None => violations.push(Violation::missing_required(name)),
            Some(Value::Null) => violations.push(Violation::null_required(name)),
            Some(_) => {}
        }
    }

    for (name, field) in &schema.properties {
        let value = match payload.get(name) {
            Some(v) => v,
            None => continue,
        };
        if value.is_null() {
            // Required-null is already reported above; a null in an
            // optional declared field is a type violation.
            if !schema.required.contains(name) {
                violations.push(Violation::type_mismatch(
                    name,
                    field.kind.kind_name(),
                    "null",
                ));
            }
            continue;
        }
        check_value(name, field, value, &mut violations);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Applies defaults, then validates, returning the fully materialized
/// payload. Validating the result again yields no violations and does
/// not alter it.
pub fn materialize(
    schema: &SchemaDefinition,
    mut payload: Map<String, Value>,
) -> Result<Map<String, Value>, Vec<Violation>> {
    apply_defaults(schema, &mut payload);
    validate(schema, &payload)?;
    Ok(payload)
}

/// Checks one present, non-null value against its field schema.
fn check_value(name: &str, field: &FieldSchema, value: &Value, violations: &mut Vec<Violation>) {
    match &field.kind {
        FieldKind::String {
            min_length,
            max_length,
            pattern,
            format,
        } => match value.as_str() {
            Some(s) => {
                check_string(name, s, *min_length, *max_length, pattern, *format, violations);
            }
            None => {
                violations.push(Violation::type_mismatch(name, "string", value_kind(value)));
            }
        },
        FieldKind::Number { minimum, maximum } => match value.as_f64() {
            Some(n) if value.is_number() => {
                if let Some(min) = minimum {
                    if n < *min {
                        violations.push(Violation::new(
                            name,
                            "minimum",
                            format!("value {n} is less than minimum {min}"),
                        ));
                    }
                }
                if let Some(max) = maximum {
                    if n > *max {
                        violations.push(Violation::new(
                            name,
                            "maximum",
                            format!("value {n} exceeds maximum {max}"),
                        ));
                    }
                }
            }
            _ => violations.push(Violation::type_mismatch(name, "number", value_kind(value))),
        },
        FieldKind::Integer { minimum, maximum } => {
            if !value.is_i64() && !value.is_u64() {
                violations.push(Violation::type_mismatch(name, "integer", value_kind(value)));
            } else {
                // Values above i64::MAX satisfy any minimum and break
                // any maximum.
                let i = value.as_i64();
                if let Some(min) = minimum {
                    if matches!(i, Some(v) if v < *min) {
                        violations.push(Violation::new(
                            name,
                            "minimum",
                            format!("value is less than minimum {min}"),
                        ));
                    }
                }
                if let Some(max) = maximum {
                    if i.is_none() || matches!(i, Some(v) if v > *max) {
                        violations.push(Violation::new(
                            name,
                            "maximum",
                            format!("value exceeds maximum {max}"),
                        ));
                    }
                }
            }
        }
        FieldKind::Boolean => {
            if !value.is_boolean() {
                violations.push(Violation::type_mismatch(name, "boolean", value_kind(value)));
            }
        }
        FieldKind::Array => {
            if !value.is_array() {
                violations.push(Violation::type_mismatch(name, "array", value_kind(value)));
            }
        }
        FieldKind::Object => {
            if !value.is_object() {
                violations.push(Violation::type_mismatch(name, "object", value_kind(value)));
            }
        }
    }

    if let Some(allowed) = &field.allowed {
        if !allowed.contains(value) {
            violations.push(Violation::new(
                name,
                "enum",
                "value is not one of the allowed values",
            ));
        }
    }
}

/// String-specific constraint checks.
fn check_string(
    name: &str,
    s: &str,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: &Option<String>,
    format: Option<FieldFormat>,
    violations: &mut Vec<Violation>,
) {
    let length = s.chars().count();

    if let Some(min) = min_length {
        if length < min {
            violations.push(Violation::new(
                name,
                "minLength",
                format!("length {length} is less than minLength {min}"),
            ));
        }
    }
    if let Some(max) = max_length {
        if length > max {
            violations.push(Violation::new(
                name,
                "maxLength",
                format!("length {length} exceeds maxLength {max}"),
            ));
        }
    }
    if let Some(pattern) = pattern {
        match Regex::new(pattern) {
            Ok(re) => {
                if !re.is_match(s) {
                    violations.push(Violation::new(
                        name,
                        "pattern",
                        format!("value does not match pattern '{pattern}'"),
                    ));
                }
            }
            // Structural validation catches this at definition time;
            // stay total if a bad pattern slips through anyway.
            Err(_) => violations.push(Violation::new(
                name,
                "pattern",
                format!("schema pattern '{pattern}' is not a valid regular expression"),
            )),
        }
    }
    match format {
        Some(FieldFormat::Email) => {
            if !email_regex().is_match(s) {
                violations.push(Violation::new(name, "format", "not a valid email address"));
            }
        }
        Some(FieldFormat::DateTime) => {
            if DateTime::parse_from_rfc3339(s).is_err() {
                violations.push(Violation::new(
                    name,
                    "format",
                    "not a valid RFC 3339 date-time",
                ));
            }
        }
        None => {}
    }
}

/// Returns the JSON kind name for error messages.
fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer"
            } else {
                "number"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
