//! Boundary encoding for entity records.
//!
//! Internally a record is a fixed envelope with typed fields. At the
//! system boundary the owning definition's configuration decides which
//! envelope fields appear, and the parent link surfaces under the
//! definition's configured attribute name instead of a fixed key.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::errors::{DocumentError, DocumentResult};
use super::types::{EntityRecord, ParentLink};
use crate::definition::RecordConfig;

/// Encodes a record as a boundary document under the given
/// configuration. Envelope fields the definition does not enable are
/// omitted entirely rather than emitted as null.
pub fn to_document(record: &EntityRecord, config: &RecordConfig) -> Value {
    let mut doc = Map::new();
    doc.insert("id".into(), json!(record.id));
    doc.insert("definitionRef".into(), json!(record.definition_ref));
    doc.insert("definitionCode".into(), json!(record.definition_code));
    doc.insert("data".into(), Value::Object(record.data.clone()));

    if config.activation.enabled {
        doc.insert(
            "isActive".into(),
            json!(record.is_active.unwrap_or(config.activation.default_state)),
        );
    }
    if config.activation.use_time_bounding {
        doc.insert("effectiveFrom".into(), json!(record.effective_from));
        // None stays observable as an explicit open bound.
        doc.insert("effectiveTo".into(), json!(record.effective_to));
    }
    if config.versioning.enabled {
        doc.insert("version".into(), json!(record.version));
        doc.insert("isCurrent".into(), json!(record.is_current));
        doc.insert("expiredAt".into(), json!(record.expired_at));
    }
    if config.hierarchy.enabled {
        if let Some(link) = &record.parent_ref {
            doc.insert(
                config.hierarchy.parent_link_field.clone(),
                json!(link.value),
            );
        }
    }

    doc.insert("createdBy".into(), json!(record.created_by));
    doc.insert("updatedBy".into(), json!(record.updated_by));
    doc.insert("createdAt".into(), json!(record.created_at));
    doc.insert("updatedAt".into(), json!(record.updated_at));

    Value::Object(doc)
}

/// Decodes a boundary document back into a record envelope under the
/// given configuration.
pub fn from_document(doc: &Value, config: &RecordConfig) -> DocumentResult<EntityRecord> {
    let obj = doc
        .as_object()
        .ok_or(DocumentError::MissingField("document"))?;

    let data = match obj.get("data") {
        Some(Value::Object(map)) => map.clone(),
        Some(_) => return Err(DocumentError::malformed("data", "expected an object")),
        None => return Err(DocumentError::MissingField("data")),
    };

    let parent_ref = if config.hierarchy.enabled {
        match obj.get(config.hierarchy.parent_link_field.as_str()) {
            Some(Value::String(value)) => Some(ParentLink {
                kind: config.hierarchy.link_type,
                value: value.clone(),
            }),
            Some(Value::Null) | None => None,
            Some(_) => {
                return Err(DocumentError::malformed(
                    "parentRef",
                    "expected a string parent reference",
                ))
            }
        }
    } else {
        None
    };

    Ok(EntityRecord {
        id: required_uuid(obj, "id")?,
        definition_ref: required_uuid(obj, "definitionRef")?,
        definition_code: required_str(obj, "definitionCode")?.to_string(),
        data,
        is_active: if config.activation.enabled {
            obj.get("isActive").and_then(Value::as_bool)
        } else {
            None
        },
        effective_from: if config.activation.use_time_bounding {
            optional_datetime(obj, "effectiveFrom")?
        } else {
            None
        },
        effective_to: if config.activation.use_time_bounding {
            optional_datetime(obj, "effectiveTo")?
        } else {
            None
        },
        version: obj
            .get("version")
            .and_then(Value::as_u64)
            .map_or(1, |v| v as u32),
        is_current: obj.get("isCurrent").and_then(Value::as_bool).unwrap_or(true),
        expired_at: optional_datetime(obj, "expiredAt")?,
        parent_ref,
        created_by: required_str(obj, "createdBy")?.to_string(),
        updated_by: required_str(obj, "updatedBy")?.to_string(),
        created_at: required_datetime(obj, "createdAt")?,
        updated_at: required_datetime(obj, "updatedAt")?,
    })
}

fn required_str<'a>(obj: &'a Map<String, Value>, field: &'static str) -> DocumentResult<&'a str> {
    obj.get(field)
        .and_then(Value::as_str)
        .ok_or(DocumentError::MissingField(field))
}

fn required_uuid(obj: &Map<String, Value>, field: &'static str) -> DocumentResult<Uuid> {
    let raw = required_str(obj, field)?;
    Uuid::parse_str(raw).map_err(|e| DocumentError::malformed(field, e.to_string()))
}

fn required_datetime(
    obj: &Map<String, Value>,
    field: &'static str,
) -> DocumentResult<DateTime<Utc>> {
    let raw = required_str(obj, field)?;
    parse_datetime(raw, field)
}

fn optional_datetime(
    obj: &Map<String, Value>,
    field: &'static str,
) -> DocumentResult<Option<DateTime<Utc>>> {
    match obj.get(field) {
        Some(Value::String(raw)) => parse_datetime(raw, field).map(Some),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(DocumentError::malformed(field, "expected a timestamp string")),
    }
}

fn parse_datetime(raw: &str, field: &'static str) -> DocumentResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DocumentError::malformed(field, e.to_string()))
}
