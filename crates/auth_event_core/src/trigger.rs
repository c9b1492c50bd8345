//! Decoding of auth-platform trigger payloads.
//!
//! The platform delivers either a wrapped payload
//! (`{"data": {...}, "context": {...}}`) or the flat legacy form where the
//! metadata fields sit next to `data`. Both decode to a [`TriggerEvent`].

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::contract::AuthEvent;

/// Metadata describing what produced an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMetadata {
    pub event_id: Option<String>,
    pub event_type: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerEvent {
    /// `None` when the payload carries no resource identifier.
    pub metadata: Option<TriggerMetadata>,
    pub event: AuthEvent,
}

#[derive(Debug, Error)]
pub enum TriggerDecodeError {
    #[error("trigger payload must be a JSON object")]
    NotAnObject,

    #[error("trigger payload is missing auth user data")]
    MissingData,

    #[error("invalid auth user data: {0}")]
    InvalidData(#[source] serde_json::Error),

    #[error("invalid trigger timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

pub fn decode_trigger(payload: Value) -> Result<TriggerEvent, TriggerDecodeError> {
    let Value::Object(mut object) = payload else {
        return Err(TriggerDecodeError::NotAnObject);
    };

    let data = match object.remove("data") {
        None | Some(Value::Null) => return Err(TriggerDecodeError::MissingData),
        Some(value) => value,
    };
    let event: AuthEvent = serde_json::from_value(data).map_err(TriggerDecodeError::InvalidData)?;

    let context = match object.remove("context") {
        Some(Value::Object(context)) => context,
        _ => object,
    };

    Ok(TriggerEvent {
        metadata: decode_metadata(&context)?,
        event,
    })
}

fn decode_metadata(
    fields: &Map<String, Value>,
) -> Result<Option<TriggerMetadata>, TriggerDecodeError> {
    let Some(resource) = fields.get("resource").and_then(resource_name) else {
        return Ok(None);
    };

    let timestamp = match fields.get("timestamp").and_then(Value::as_str) {
        Some(text) => Some(
            DateTime::parse_from_rfc3339(text)
                .map_err(|source| TriggerDecodeError::InvalidTimestamp {
                    value: text.to_string(),
                    source,
                })?
                .with_timezone(&Utc),
        ),
        None => None,
    };

    Ok(Some(TriggerMetadata {
        event_id: string_field(fields, "eventId"),
        event_type: string_field(fields, "eventType"),
        timestamp,
        resource,
    }))
}

// `resource` is a plain string in legacy payloads and an object with a
// `name` in the newer ones.
fn resource_name(value: &Value) -> Option<String> {
    let name = match value {
        Value::String(text) => text.as_str(),
        Value::Object(object) => object.get("name").and_then(Value::as_str)?,
        _ => return None,
    };

    if name.trim().is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_wrapped_payload_with_context() {
        let trigger = decode_trigger(json!({
            "data": {"email": "a@example.com", "uid": "u123", "displayName": "A"},
            "context": {
                "eventId": "evt-1",
                "eventType": "providers/firebase.auth/eventTypes/user.create",
                "timestamp": "2026-02-14T10:00:00.000Z",
                "resource": "projects/demo-project"
            }
        }))
        .expect("payload should decode");

        assert_eq!(trigger.event, AuthEvent::new("a@example.com", "u123"));
        let metadata = trigger.metadata.expect("metadata should be present");
        assert_eq!(metadata.resource, "projects/demo-project");
        assert_eq!(metadata.event_id.as_deref(), Some("evt-1"));
        assert_eq!(
            metadata.timestamp,
            Some(Utc.with_ymd_and_hms(2026, 2, 14, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn decodes_flat_legacy_payload() {
        let trigger = decode_trigger(json!({
            "data": {"email": "b@example.com", "uid": "u456"},
            "eventId": "evt-2",
            "resource": "projects/demo-project"
        }))
        .expect("payload should decode");

        let metadata = trigger.metadata.expect("metadata should be present");
        assert_eq!(metadata.resource, "projects/demo-project");
        assert_eq!(metadata.event_type, None);
        assert_eq!(metadata.timestamp, None);
    }

    #[test]
    fn resolves_resource_object_to_its_name() {
        let trigger = decode_trigger(json!({
            "data": {"uid": "u789"},
            "context": {
                "resource": {
                    "service": "firebaseauth.googleapis.com",
                    "name": "projects/demo-project",
                    "type": "firebase.auth"
                }
            }
        }))
        .expect("payload should decode");

        assert_eq!(
            trigger.metadata.map(|metadata| metadata.resource),
            Some("projects/demo-project".to_string())
        );
    }

    #[test]
    fn missing_resource_yields_no_metadata() {
        let trigger = decode_trigger(json!({
            "data": {"email": "c@example.com", "uid": "u1"},
            "context": {"eventId": "evt-3", "resource": "  "}
        }))
        .expect("payload should decode");

        assert!(trigger.metadata.is_none());
    }

    #[test]
    fn rejects_non_object_payload() {
        let error = decode_trigger(json!(["not", "an", "object"])).expect_err("should fail");
        assert!(matches!(error, TriggerDecodeError::NotAnObject));
    }

    #[test]
    fn rejects_payload_without_data() {
        let error = decode_trigger(json!({"data": null, "resource": "projects/p"}))
            .expect_err("should fail");
        assert!(matches!(error, TriggerDecodeError::MissingData));
    }

    #[test]
    fn rejects_invalid_user_data() {
        let error = decode_trigger(json!({"data": {"email": "d@example.com", "uid": 42}}))
            .expect_err("numeric uid should fail");
        assert!(error.to_string().contains("invalid auth user data"));
    }

    #[test]
    fn rejects_malformed_timestamp() {
        let error = decode_trigger(json!({
            "data": {"uid": "u1"},
            "context": {"resource": "projects/p", "timestamp": "yesterday"}
        }))
        .expect_err("should fail");

        assert!(matches!(
            error,
            TriggerDecodeError::InvalidTimestamp { ref value, .. } if value == "yesterday"
        ));
    }
}
