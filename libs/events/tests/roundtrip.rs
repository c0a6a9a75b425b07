//! Property tests: encode then decode yields an equal event.

use ce_events::json;
use ce_events::{validate, Data, Event, ExtensionValue, SpecVersion};
use chrono::{DateTime, FixedOffset};
use proptest::prelude::*;

fn arb_data() -> impl Strategy<Value = Option<Data>> {
    prop_oneof![
        Just(None),
        "[ -~]{0,32}".prop_map(|s| Some(Data::Text(s))),
        proptest::collection::vec(any::<u8>(), 0..64).prop_map(|b| Some(Data::Binary(b))),
        any::<i64>().prop_map(|n| Some(Data::Json(serde_json::json!({ "n": n })))),
    ]
}

fn arb_extension() -> impl Strategy<Value = ExtensionValue> {
    prop_oneof![
        any::<bool>().prop_map(ExtensionValue::Boolean),
        any::<i32>().prop_map(ExtensionValue::Integer),
        "[a-zA-Z0-9 ]{0,16}".prop_map(ExtensionValue::String),
    ]
}

fn arb_time() -> impl Strategy<Value = DateTime<FixedOffset>> {
    (0i64..4_102_444_800, 0u32..1_000_000_000, -12i32..=12).prop_map(|(secs, nanos, hours)| {
        let offset = FixedOffset::east_opt(hours * 3600).unwrap();
        DateTime::from_timestamp(secs, nanos)
            .unwrap()
            .with_timezone(&offset)
    })
}

prop_compose! {
    fn arb_event()(
        version in prop_oneof![Just(SpecVersion::V1_0), Just(SpecVersion::V0_3)],
        id in "[a-zA-Z0-9-]{1,36}",
        source in "/[a-z]{1,12}",
        event_type in "[a-z]{1,8}(\\.[a-z]{1,8}){0,3}",
        subject in proptest::option::of("[a-z0-9/]{1,16}"),
        time in arb_time(),
        data in arb_data(),
        extensions in proptest::collection::btree_map("x[a-z0-9]{0,10}", arb_extension(), 0..4),
    ) -> Event {
        let mut builder = Event::builder()
            .spec_version(version)
            .id(id)
            .source(source)
            .event_type(event_type)
            .time(time);
        if let Some(subject) = subject {
            builder = builder.subject(subject);
        }
        if let Some(data) = data {
            builder = builder.data(data);
        }
        for (name, value) in extensions {
            builder = builder.extension(name, value);
        }
        builder.build().unwrap()
    }
}

proptest! {
    #[test]
    fn prop_json_roundtrip(event in arb_event()) {
        let text = json::to_json(&event).unwrap();
        let decoded = json::event_from_json(&text).unwrap();
        prop_assert_eq!(decoded, event);
    }

    #[test]
    fn prop_validation_idempotent(event in arb_event()) {
        let once = validate(event).unwrap();
        let twice = validate(once.clone()).unwrap();
        prop_assert_eq!(twice, once);
    }
}
