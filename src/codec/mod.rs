//! Event log envelope codec.
//!
//! The log is a JSON array of envelopes, each pairing an integer type tag
//! with the variant's payload:
//!
//! ```json
//! [{"$type": 1, "AdvocateEvent": {"Name": "...", "UID": "...", "EventDate": "...", "FileName": "..."}}]
//! ```
//!
//! Tags are `1` (added), `2` (modified) and `3` (removed). Decoding is
//! strict about the envelope (exactly the two properties, integer tag,
//! object payload) and lenient about payload strings, which may be `null`
//! or absent in historical logs. `EventDate` is always required.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AdvocateError, Result};
use crate::model::{AdvocateAdded, AdvocateEvent, AdvocateModified, AdvocateRemoved, EventKind};

/// Envelope property carrying the type tag.
pub const TYPE_PROPERTY: &str = "$type";

/// Envelope property wrapping the payload.
pub const DATA_PROPERTY: &str = "AdvocateEvent";

/// Encode a log as compact JSON.
pub fn encode(events: &[AdvocateEvent]) -> Result<String> {
    let envelopes = encode_all(events)?;
    serde_json::to_string(&envelopes).map_err(|e| AdvocateError::SerializationError {
        context: "Failed to serialize event log".to_string(),
        source: e,
    })
}

/// Encode a log as indented JSON.
pub fn encode_pretty(events: &[AdvocateEvent]) -> Result<String> {
    let envelopes = encode_all(events)?;
    serde_json::to_string_pretty(&envelopes).map_err(|e| AdvocateError::SerializationError {
        context: "Failed to serialize event log".to_string(),
        source: e,
    })
}

/// Decode a log. Any malformed envelope fails the whole log.
pub fn decode(text: &str) -> Result<Vec<AdvocateEvent>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let value: Value = serde_json::from_str(text).map_err(|e| AdvocateError::MalformedLog {
        message: "event log is not valid JSON".to_string(),
        source: Some(e),
    })?;

    let Value::Array(envelopes) = value else {
        return Err(AdvocateError::MalformedLog {
            message: format!("expected an array of envelopes, found {}", json_kind(&value)),
            source: None,
        });
    };

    envelopes
        .iter()
        .enumerate()
        .map(|(index, envelope)| decode_envelope(index, envelope))
        .collect()
}

/// Encode one event as an envelope value.
pub fn encode_event(event: &AdvocateEvent) -> Result<Value> {
    let payload = match event {
        AdvocateEvent::Added(e) => payload_value(e)?,
        AdvocateEvent::Modified(e) => payload_value(e)?,
        AdvocateEvent::Removed(e) => payload_value(e)?,
    };

    let mut envelope = Map::with_capacity(2);
    envelope.insert(TYPE_PROPERTY.to_string(), Value::from(event.kind().code()));
    envelope.insert(DATA_PROPERTY.to_string(), payload);
    Ok(Value::Object(envelope))
}

/// Decode one envelope value. Errors report index `0`.
pub fn decode_event(value: &Value) -> Result<AdvocateEvent> {
    decode_envelope(0, value)
}

fn encode_all(events: &[AdvocateEvent]) -> Result<Vec<Value>> {
    events.iter().map(encode_event).collect()
}

fn payload_value<T: Serialize>(payload: &T) -> Result<Value> {
    serde_json::to_value(payload).map_err(|e| AdvocateError::SerializationError {
        context: "Failed to serialize event payload".to_string(),
        source: e,
    })
}

fn decode_envelope(index: usize, value: &Value) -> Result<AdvocateEvent> {
    let Value::Object(envelope) = value else {
        return Err(AdvocateError::envelope(
            index,
            format!("expected an object, found {}", json_kind(value)),
        ));
    };

    if let Some(extra) = envelope
        .keys()
        .find(|key| *key != TYPE_PROPERTY && *key != DATA_PROPERTY)
    {
        return Err(AdvocateError::envelope(
            index,
            format!("unexpected property '{extra}'"),
        ));
    }

    let tag = envelope
        .get(TYPE_PROPERTY)
        .ok_or_else(|| AdvocateError::envelope(index, format!("missing '{TYPE_PROPERTY}'")))?;
    let code = tag.as_i64().ok_or_else(|| {
        AdvocateError::envelope(
            index,
            format!("'{TYPE_PROPERTY}' must be an integer, found {tag}"),
        )
    })?;
    let kind = EventKind::from_code(code).ok_or_else(|| {
        AdvocateError::envelope(index, format!("unknown event type {code}"))
    })?;

    let payload = envelope.get(DATA_PROPERTY).ok_or_else(|| {
        AdvocateError::envelope(index, format!("missing '{DATA_PROPERTY}' wrapper"))
    })?;
    if !payload.is_object() {
        return Err(AdvocateError::envelope(
            index,
            format!("'{DATA_PROPERTY}' must be an object, found {}", json_kind(payload)),
        ));
    }

    let invalid = |e: serde_json::Error| {
        AdvocateError::envelope_with_source(index, format!("invalid {kind} payload: {e}"), e)
    };
    let event = match kind {
        EventKind::Added => {
            AdvocateEvent::Added(AdvocateAdded::deserialize(payload).map_err(invalid)?)
        }
        EventKind::Modified => {
            AdvocateEvent::Modified(AdvocateModified::deserialize(payload).map_err(invalid)?)
        }
        EventKind::Removed => {
            AdvocateEvent::Removed(AdvocateRemoved::deserialize(payload).map_err(invalid)?)
        }
    };
    Ok(event)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn date(s: &str) -> crate::model::EventDate {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn sample() -> Vec<AdvocateEvent> {
        vec![
            AdvocateAdded {
                name: "Jane".to_string(),
                github_user_name: "jane".to_string(),
                team: String::new(),
                alias: "jd".to_string(),
                twitter_handle: String::new(),
                uid: "u1".to_string(),
                event_date: date("2019-06-10T17:49:50-07:00"),
                file_name: "advocates/jane.yml".to_string(),
            }
            .into(),
            AdvocateModified {
                new_name: "Jane D".to_string(),
                new_github_user_name: "jane".to_string(),
                new_team: "web".to_string(),
                new_alias: "jd".to_string(),
                new_twitter_handle: String::new(),
                new_uid: "u1".to_string(),
                new_file_name: "advocates/jane-d.yml".to_string(),
                uid: "u1".to_string(),
                event_date: date("2019-07-01T09:00:00+00:00"),
                file_name: "advocates/jane.yml".to_string(),
            }
            .into(),
            AdvocateRemoved {
                uid: "u1".to_string(),
                event_date: date("2020-01-01T00:00:00+01:00"),
                file_name: "advocates/jane-d.yml".to_string(),
            }
            .into(),
        ]
    }

    #[test]
    fn test_round_trip() {
        let events = sample();
        let decoded = decode(&encode(&events).unwrap()).unwrap();
        assert_eq!(decoded, events);
        let decoded = decode(&encode_pretty(&events).unwrap()).unwrap();
        assert_eq!(decoded, events);
    }

    #[test]
    fn test_envelope_shape() {
        let value = encode_event(&sample()[2]).unwrap();
        assert_eq!(
            value,
            json!({
                "$type": 3,
                "AdvocateEvent": {
                    "UID": "u1",
                    "EventDate": "2020-01-01T00:00:00+01:00",
                    "FileName": "advocates/jane-d.yml"
                }
            })
        );
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["$type", "AdvocateEvent"]);
    }

    #[test]
    fn test_decode_accepts_any_property_order() {
        let text = r#"[{"AdvocateEvent":{"UID":"x","EventDate":"2020-01-01T00:00:00Z","FileName":"f"},"$type":3}]"#;
        let events = decode(text).unwrap();
        assert_eq!(events[0].kind(), EventKind::Removed);
    }

    #[test]
    fn test_decode_nulls_as_empty() {
        let text = r#"[{"$type":1,"AdvocateEvent":{"Name":null,"GitHubUserName":null,"Team":null,"Alias":null,"TwitterHandle":null,"UID":null,"EventDate":"2020-01-01T00:00:00Z","FileName":"advocates/a.yml"}}]"#;
        let events = decode(text).unwrap();
        assert_eq!(events[0].uid(), "");
        assert_eq!(events[0].file_name(), "advocates/a.yml");
    }

    fn envelope_error(text: &str) -> (usize, String) {
        match decode(text) {
            Err(AdvocateError::Envelope { index, message, .. }) => (index, message),
            other => panic!("expected envelope error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_is_fatal_with_index() {
        let text = r#"[
            {"$type":3,"AdvocateEvent":{"UID":"a","EventDate":"2020-01-01T00:00:00Z","FileName":"f"}},
            {"$type":9,"AdvocateEvent":{"UID":"b","EventDate":"2020-01-01T00:00:00Z","FileName":"f"}}
        ]"#;
        let (index, message) = envelope_error(text);
        assert_eq!(index, 1);
        assert!(message.contains("unknown event type 9"));
    }

    #[test]
    fn test_envelope_violations() {
        let date = r#""EventDate":"2020-01-01T00:00:00Z""#;
        let cases = [
            (format!(r#"[{{"$type":3}}]"#), "missing 'AdvocateEvent'"),
            (format!(r#"[{{"AdvocateEvent":{{{date}}}}}]"#), "missing '$type'"),
            (format!(r#"[{{"$type":"3","AdvocateEvent":{{{date}}}}}]"#), "must be an integer"),
            (format!(r#"[{{"$type":1.5,"AdvocateEvent":{{{date}}}}}]"#), "must be an integer"),
            (format!(r#"[{{"$type":3,"AdvocateEvent":[]}}]"#), "must be an object"),
            (format!(r#"[{{"$type":3,"AdvocateEvent":{{{date}}},"x":1}}]"#), "unexpected property 'x'"),
            (format!(r#"[{{"$type":3,"AdvocateEvent":{{"UID":"a"}}}}]"#), "invalid removed payload"),
            ("[42]".to_string(), "expected an object"),
        ];
        for (text, expected) in cases {
            let (index, message) = envelope_error(&text);
            assert_eq!(index, 0);
            assert!(message.contains(expected), "{message} should contain {expected}");
        }
    }

    #[test]
    fn test_non_array_log_is_malformed() {
        assert!(matches!(
            decode(r#"{"$type":1}"#),
            Err(AdvocateError::MalformedLog { .. })
        ));
        assert!(matches!(decode("not json"), Err(AdvocateError::MalformedLog { .. })));
        assert!(matches!(decode(""), Err(AdvocateError::MalformedLog { .. })));
    }

    #[test]
    fn test_empty_log() {
        assert_eq!(decode("[]").unwrap(), Vec::new());
        assert_eq!(encode(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_bom_is_ignored() {
        assert_eq!(decode("\u{feff}[]").unwrap(), Vec::new());
    }
}
