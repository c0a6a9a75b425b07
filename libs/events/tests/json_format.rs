//! Structured JSON encoding and decoding through the public API.

use ce_events::json::{self, Decoded};
use ce_events::{Data, Event, EventError, SpecVersion, ViolationKind};
use ce_testing::fixtures;
use chrono::{FixedOffset, TimeZone};
use rstest::rstest;
use serde_json::Value;

fn fixture_event() -> Event {
    Event::builder()
        .id(fixtures::EVENT_ID)
        .source(fixtures::SOURCE)
        .event_type(fixtures::EVENT_TYPE)
        .time_str(fixtures::TIME)
        .build()
        .unwrap()
}

fn assert_fixture_attributes(event: &Event) {
    assert_eq!(event.spec_version(), Some(SpecVersion::V1_0));
    assert_eq!(event.id(), fixtures::EVENT_ID);
    assert_eq!(event.source(), fixtures::SOURCE);
    assert_eq!(event.event_type(), fixtures::EVENT_TYPE);
    assert_eq!(event.data(), None);
    assert_eq!(event.subject(), None);
    assert_eq!(event.datacontenttype(), None);
    assert_eq!(event.dataschema(), None);
    assert!(event.extensions().is_empty());

    let offset = FixedOffset::east_opt(4 * 3600).unwrap();
    let expected = offset
        .with_ymd_and_hms(2022, 7, 16, 12, 3, 20)
        .unwrap()
        + chrono::Duration::microseconds(519_216);
    assert_eq!(event.timestamp(), Some(expected));
}

#[test]
fn test_deserialize() {
    let event = json::event_from_json(fixtures::VALID_JSON).unwrap();
    assert_fixture_attributes(&event);
}

#[test]
fn test_deserialize_batch() {
    let batch = json::batch_from_json(&fixtures::valid_json_batch()).unwrap();
    assert_eq!(batch.len(), 1);
    assert_fixture_attributes(batch.get(0).unwrap());
}

#[test]
fn test_deserialize_dispatches_on_shape() {
    let single = json::from_json(fixtures::VALID_JSON).unwrap();
    assert!(matches!(single, Decoded::Single(_)));

    let batch = json::from_json(&fixtures::valid_json_batch()).unwrap();
    assert_eq!(batch.into_events().len(), 1);
}

#[test]
fn test_serialize_matches_fixture() {
    let text = json::to_json(&fixture_event()).unwrap();
    let written: Value = serde_json::from_str(&text).unwrap();
    let mut expected: Value = serde_json::from_str(fixtures::VALID_JSON).unwrap();
    expected
        .as_object_mut()
        .unwrap()
        .retain(|_, value| !value.is_null());
    assert_eq!(written, expected);
}

#[test]
fn test_serialize_batch_matches_fixture() {
    let batch = ce_events::Batch::new(vec![fixture_event()]).unwrap();
    let text = json::batch_to_json(&batch).unwrap();
    let written: Value = serde_json::from_str(&text).unwrap();
    assert!(written.is_array());
    assert_eq!(written[0]["id"], fixtures::EVENT_ID);
    assert_eq!(written[0]["time"], fixtures::TIME);
}

#[rstest]
#[case::string(Data::from("test"), None)]
#[case::bytes(Data::from(b"test".as_slice()), Some("dGVzdA=="))]
#[case::byte_array(Data::from(vec![2u8, 3, 5, 7]), Some("AgMFBw=="))]
fn test_serialize_data(#[case] data: Data, #[case] b64_expected: Option<&str>) {
    let event = fixture_event().to_builder().data(data).build().unwrap();

    let single: Value = serde_json::from_str(&json::to_json(&event).unwrap()).unwrap();
    let batch = ce_events::Batch::new(vec![event]).unwrap();
    let batched: Value = serde_json::from_str(&json::batch_to_json(&batch).unwrap()).unwrap();

    for written in [&single, &batched[0]] {
        match b64_expected {
            Some(b64) => {
                assert_eq!(written["data_base64"], b64);
                assert!(written.get("data").is_none());
            }
            None => {
                assert_eq!(written["data"], "test");
                assert!(written.get("data_base64").is_none());
            }
        }
    }
}

#[rstest]
#[case::string(b"test".as_slice(), "dGVzdA==")]
#[case::byte_array(&[2u8, 3, 5, 7], "AgMFBw==")]
fn test_deserialize_base64(#[case] bytes: &[u8], #[case] b64: &str) {
    let text = fixtures::base64_event_json(b64);

    let event = json::event_from_json(&text).unwrap();
    assert_eq!(event.data(), Some(&Data::Binary(bytes.to_vec())));

    let batch = json::batch_from_json(&format!("[{text}]")).unwrap();
    assert_eq!(batch.get(0).unwrap().data(), Some(&Data::Binary(bytes.to_vec())));
}

#[test]
fn test_malformed_json_is_parse_error() {
    let err = json::from_json(r#"{"specversion":"#).unwrap_err();
    assert!(err.is_parse_error());
    assert!(json::batch_from_json("[").unwrap_err().is_parse_error());
}

#[test]
fn test_missing_type_single_violation() {
    let text = r#"{"specversion":"1.0","id":"1","source":"/s"}"#;
    let err = json::event_from_json(text).unwrap_err();
    let violations = err.violations().unwrap();
    assert_eq!(violations.len(), 1);
    let violation = &violations.as_slice()[0];
    assert_eq!(violation.attribute, "type");
    assert_eq!(violation.kind, ViolationKind::MissingRequiredAttribute);
}

#[test]
fn test_mixed_version_batch_rejected() {
    let text = format!(
        "[{},{}]",
        fixtures::minimal_event_json("1.0", "a"),
        fixtures::minimal_event_json("0.3", "b"),
    );
    let err = json::batch_from_json(&text).unwrap_err();
    assert_eq!(
        err,
        EventError::BatchSpecVersionMismatch {
            index: 1,
            expected: "1.0".to_string(),
            found: "0.3".to_string(),
        }
    );
}

#[test]
fn test_invalid_batch_member_rejects_batch() {
    let text = format!(
        "[{},{}]",
        fixtures::minimal_event_json("1.0", "a"),
        fixtures::minimal_event_json("1.0", ""),
    );
    match json::batch_from_json(&text).unwrap_err() {
        EventError::InvalidBatchMember { index, violations } => {
            assert_eq!(index, 1);
            assert_eq!(violations.for_attribute("id").count(), 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_null_attributes_are_absent() {
    let event = json::event_from_json(fixtures::VALID_JSON).unwrap();
    let text = json::to_json(&event).unwrap();
    assert!(!text.contains("null"));
    assert_eq!(json::event_from_json(&text).unwrap(), event);
}
