use crate::error::{ClientResult, Error};
use crate::utils::time::to_iso;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Status given to events saved without one
pub const DEFAULT_STATUS: &str = "active";

/// Event type used when neither the record nor the session names one
pub const DEFAULT_EVENT_TYPE: &str = "custom";

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A cached event: four recognized fields plus whatever the caller added
///
/// The recognized fields are always text. Other JSON values stored under
/// those names read back as their JSON text, and `null` or `false` as `""`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub event_type: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl EventRecord {
    /// Start building a record
    pub fn builder() -> EventRecordBuilder {
        EventRecordBuilder::new()
    }

    /// Extra field by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Overwrite top-level keys with those in `partial`
    ///
    /// Nested objects are replaced wholesale, never merged. Recognized
    /// fields take the text of the new value; `null` clears them.
    pub fn merge(&mut self, partial: Map<String, Value>) {
        for (key, value) in partial {
            let slot = match key.as_str() {
                "id" => &mut self.id,
                "created_at" => &mut self.created_at,
                "status" => &mut self.status,
                "event_type" => &mut self.event_type,
                _ => {
                    self.fields.insert(key, value);
                    continue;
                }
            };
            *slot = recognized_text(&value).unwrap_or_default();
        }
    }
}

/// Builder for new event records
///
/// Anything left unset (or set to an empty string) gets a default at
/// [`build`](Self::build) time:
///
/// | field        | default                                        |
/// |--------------|------------------------------------------------|
/// | `id`         | `event_<unix millis>_<9 base-36 characters>`   |
/// | `created_at` | current time, RFC 3339 with milliseconds, UTC  |
/// | `status`     | `"active"`                                     |
/// | `event_type` | the session hint, else `"custom"`              |
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecordBuilder {
    id: Option<String>,
    created_at: Option<String>,
    status: Option<String>,
    event_type: Option<String>,
    fields: Map<String, Value>,
}

impl EventRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Add an arbitrary field; recognized names go to their own slot
    pub fn field(mut self, name: impl Into<String>, value: Value) -> Self {
        let name = name.into();
        match recognized_text(&value) {
            Some(text) if name == "id" => self.id = Some(text),
            Some(text) if name == "created_at" => self.created_at = Some(text),
            Some(text) if name == "status" => self.status = Some(text),
            Some(text) if name == "event_type" => self.event_type = Some(text),
            _ if is_recognized(&name) => {}
            _ => {
                self.fields.insert(name, value);
            }
        }
        self
    }

    /// Start from a JSON object
    pub fn from_value(value: Value) -> ClientResult<Self> {
        match value {
            Value::Object(object) => Ok(object
                .into_iter()
                .fold(Self::new(), |builder, (k, v)| builder.field(k, v))),
            other => Err(Error::Serialization(format!(
                "Event must be a JSON object, got {}",
                other
            ))),
        }
    }

    /// Fill defaults using the current time
    pub fn build(self, event_type_hint: Option<&str>) -> EventRecord {
        self.build_at(event_type_hint, Utc::now())
    }

    /// Fill defaults using `now` for the id and timestamp
    pub fn build_at(self, event_type_hint: Option<&str>, now: DateTime<Utc>) -> EventRecord {
        let event_type = non_empty(self.event_type)
            .or_else(|| event_type_hint.filter(|h| !h.is_empty()).map(str::to_string))
            .unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_string());

        EventRecord {
            id: non_empty(self.id).unwrap_or_else(|| generate_event_id(now)),
            created_at: non_empty(self.created_at).unwrap_or_else(|| to_iso(now)),
            status: non_empty(self.status).unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            event_type,
            fields: self.fields,
        }
    }
}

impl From<EventRecord> for EventRecordBuilder {
    fn from(record: EventRecord) -> Self {
        Self {
            id: Some(record.id),
            created_at: Some(record.created_at),
            status: Some(record.status),
            event_type: Some(record.event_type),
            fields: record.fields,
        }
    }
}

/// `event_<millis>_<suffix>`; unique in practice, not checked
pub fn generate_event_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("event_{}_{}", now.timestamp_millis(), suffix)
}

fn is_recognized(name: &str) -> bool {
    matches!(name, "id" | "created_at" | "status" | "event_type")
}

/// Text of a recognized field; null, false and "" count as unset
fn recognized_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(recognized_text).unwrap_or_default())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_defaults_filled() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let record = EventRecordBuilder::new().build_at(None, now);

        assert!(record.id.starts_with("event_1709285400000_"));
        assert_eq!(record.id.len(), "event_1709285400000_".len() + ID_SUFFIX_LEN);
        assert_eq!(record.created_at, "2024-03-01T09:30:00.000Z");
        assert_eq!(record.status, "active");
        assert_eq!(record.event_type, "custom");
        assert!(record.fields.is_empty());
    }

    #[test]
    fn test_event_type_hint_and_explicit_values() {
        let record = EventRecordBuilder::new().build(Some("hackathon"));
        assert_eq!(record.event_type, "hackathon");

        let record = EventRecordBuilder::new()
            .event_type("ideathon")
            .status("draft")
            .id("event_1")
            .build(Some("hackathon"));
        assert_eq!(record.event_type, "ideathon");
        assert_eq!(record.status, "draft");
        assert_eq!(record.id, "event_1");

        // Empty strings fall back to defaults
        let record = EventRecordBuilder::new().status("").build(Some(""));
        assert_eq!(record.status, "active");
        assert_eq!(record.event_type, "custom");
    }

    #[test]
    fn test_from_value_splits_recognized_fields() {
        let builder = EventRecordBuilder::from_value(json!({
            "id": "event_x",
            "event_name": "Code Sprint",
            "team_limit": 4,
            "status": null
        }))
        .unwrap();
        let record = builder.build(None);

        assert_eq!(record.id, "event_x");
        assert_eq!(record.status, "active");
        assert_eq!(record.field("event_name"), Some(&json!("Code Sprint")));
        assert_eq!(record.field("team_limit"), Some(&json!(4)));
        assert!(record.field("status").is_none());

        assert!(EventRecordBuilder::from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut record = EventRecordBuilder::new()
            .id("event_1")
            .field("venue", json!({"hall": "A", "floor": 2}))
            .field("theme", json!("AI"))
            .build(None);

        let mut partial = Map::new();
        partial.insert("venue".into(), json!({"hall": "B"}));
        partial.insert("status".into(), json!("cancelled"));
        record.merge(partial);

        assert_eq!(record.status, "cancelled");
        assert_eq!(record.field("venue"), Some(&json!({"hall": "B"})));
        assert_eq!(record.field("theme"), Some(&json!("AI")));
        assert_eq!(record.id, "event_1");
    }

    #[test]
    fn test_merge_non_text_recognized_values() {
        let mut record = EventRecordBuilder::new().id("event_1").build(Some("hackathon"));

        let mut partial = Map::new();
        partial.insert("status".into(), Value::Null);
        partial.insert("event_type".into(), json!(3));
        record.merge(partial);

        assert_eq!(record.status, "");
        assert_eq!(record.event_type, "3");
        assert!(record.fields.is_empty());
        assert_eq!(record.id, "event_1");
    }

    #[test]
    fn test_lenient_recognized_fields_on_load() {
        let record: EventRecord = serde_json::from_value(json!({
            "id": 5,
            "created_at": null,
            "status": false,
            "event_type": "workshop",
            "event_name": "Old"
        }))
        .unwrap();

        assert_eq!(record.id, "5");
        assert_eq!(record.created_at, "");
        assert_eq!(record.status, "");
        assert_eq!(record.event_type, "workshop");
        assert_eq!(record.field("event_name"), Some(&json!("Old")));
        assert!(record.field("id").is_none());
    }

    #[test]
    fn test_serialized_shape_is_flat() {
        let record = EventRecordBuilder::new()
            .id("event_1")
            .created_at("2024-01-01T00:00:00.000Z")
            .field("theme", json!("Green"))
            .build(None);

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "id": "event_1",
                "created_at": "2024-01-01T00:00:00.000Z",
                "status": "active",
                "event_type": "custom",
                "theme": "Green"
            })
        );
    }

    #[test]
    fn test_generated_ids_use_base36_suffix() {
        let now = Utc::now();
        let id = generate_event_id(now);
        let suffix = id.rsplit('_').next().unwrap();
        assert_eq!(suffix.len(), ID_SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)));
        assert_ne!(generate_event_id(now), id);
    }
}
