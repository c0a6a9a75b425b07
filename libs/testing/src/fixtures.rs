//! Canonical attribute values and JSON documents.

use chrono::{DateTime, TimeZone, Utc};

pub const EVENT_ID: &str = "b96267e2-87be-4f7a-b87c-82f64360d954";
pub const SOURCE: &str = "https://example.com/event-producer";
pub const EVENT_TYPE: &str = "com.example.string";
pub const TIME: &str = "2022-07-16T12:03:20.519216+04:00";

/// `time` produced by [`crate::deterministic_generator`].
pub const FIXED_TIME: &str = "2024-01-01T12:00:00Z";

/// First `id` produced by [`crate::deterministic_generator`].
pub const FIRST_GENERATED_ID: &str = "01HK2EA8G00000000000000001";

/// A 1.0 event with every optional attribute explicitly null.
pub const VALID_JSON: &str = r#"{"data":null,"source":"https://example.com/event-producer","id":"b96267e2-87be-4f7a-b87c-82f64360d954","type":"com.example.string","specversion":"1.0","time":"2022-07-16T12:03:20.519216+04:00","subject":null,"datacontenttype":null,"dataschema":null}"#;

pub fn fixed_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// [`VALID_JSON`] wrapped in a one-element array.
pub fn valid_json_batch() -> String {
    format!("[{VALID_JSON}]")
}

/// A 1.0 event carrying `b64` under `data_base64`.
pub fn base64_event_json(b64: &str) -> String {
    format!(
        r#"{{"data_base64":"{b64}","source":"{SOURCE}","id":"{EVENT_ID}","type":"{EVENT_TYPE}","specversion":"1.0","time":"{TIME}","subject":null,"datacontenttype":null,"dataschema":null}}"#
    )
}

/// A minimal event object with the given `specversion` and `id`.
pub fn minimal_event_json(specversion: &str, id: &str) -> String {
    format!(
        r#"{{"specversion":"{specversion}","id":"{id}","source":"{SOURCE}","type":"{EVENT_TYPE}"}}"#
    )
}
