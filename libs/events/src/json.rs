//! Structured-mode JSON format.
//!
//! A single event is one JSON object with every attribute at the top level;
//! extensions are not nested. A batch is a JSON array of such objects.
//!
//! ```text
//! {"specversion":"1.0","id":"01HK2EA8G00000000000000001","source":"/mycontext",
//!  "type":"com.example.someevent","time":"2024-01-01T12:00:00Z",
//!  "datacontenttype":"application/json","data":{"key":"value"},"myext":"42"}
//! ```
//!
//! Binary payloads travel as base64 text under `data_base64` (1.0), or
//! under `data` flagged by `"datacontentencoding":"base64"` (0.3).
//! A JSON `null` for any key means the attribute is absent.

use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::trace;

use crate::event::{Data, Event, ExtensionValue, Extensions};
use crate::types::{self, AttributeKind};
use crate::version::{
    Attribute, BinaryEncoding, SpecVersion, BASE64_ENCODING, DATA, DATA_BASE64,
    DATA_CONTENT_ENCODING,
};
use crate::{
    Batch, EventError, ExtensionNameError, Validator, Violation, ViolationKind, Violations,
};

/// A decoded JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Single(Event),
    Batch(Batch),
}

impl Decoded {
    pub fn into_single(self) -> Option<Event> {
        match self {
            Decoded::Single(event) => Some(event),
            Decoded::Batch(_) => None,
        }
    }

    pub fn into_batch(self) -> Option<Batch> {
        match self {
            Decoded::Batch(batch) => Some(batch),
            Decoded::Single(_) => None,
        }
    }

    /// All decoded events, in document order.
    pub fn into_events(self) -> Vec<Event> {
        match self {
            Decoded::Single(event) => vec![event],
            Decoded::Batch(batch) => batch.into_events(),
        }
    }
}

/// JSON encoder/decoder bound to a [`Validator`].
#[derive(Debug, Clone, Default)]
pub struct JsonFormat {
    validator: Validator,
}

impl JsonFormat {
    pub fn new(validator: Validator) -> Self {
        Self { validator }
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Validates `event` and encodes it as a JSON object.
    pub fn serialize(&self, event: &Event) -> Result<String, EventError> {
        let event = self.validator.validate(event.clone())?;
        Ok(serde_json::to_string(&event)?)
    }

    /// Validates every member and encodes the batch as a JSON array.
    pub fn serialize_batch(&self, batch: &Batch) -> Result<String, EventError> {
        let batch = self.validate_batch(batch)?;
        Ok(serde_json::to_string(&batch)?)
    }

    /// Validates `event` and returns its JSON object.
    pub fn to_value(&self, event: &Event) -> Result<Value, EventError> {
        let event = self.validator.validate(event.clone())?;
        Ok(serde_json::to_value(&event)?)
    }

    /// Decodes a JSON object (single event) or array (batch).
    pub fn deserialize(&self, text: &str) -> Result<Decoded, EventError> {
        self.from_value(parse(text)?)
    }

    /// Decodes a JSON object holding exactly one event.
    pub fn deserialize_event(&self, text: &str) -> Result<Event, EventError> {
        match parse(text)? {
            Value::Object(map) => self.decode_single(map),
            other => Err(EventError::Parse(format!(
                "expected a JSON object, got {}",
                json_type(&other)
            ))),
        }
    }

    /// Decodes a JSON array of events.
    pub fn deserialize_batch(&self, text: &str) -> Result<Batch, EventError> {
        match parse(text)? {
            Value::Array(members) => self.decode_batch(members),
            other => Err(EventError::Parse(format!(
                "expected a JSON array, got {}",
                json_type(&other)
            ))),
        }
    }

    /// Decodes an already parsed JSON value.
    pub fn from_value(&self, value: Value) -> Result<Decoded, EventError> {
        match value {
            Value::Object(map) => self.decode_single(map).map(Decoded::Single),
            Value::Array(members) => self.decode_batch(members).map(Decoded::Batch),
            other => Err(EventError::Parse(format!(
                "expected a JSON object or array, got {}",
                json_type(&other)
            ))),
        }
    }

    fn validate_batch(&self, batch: &Batch) -> Result<Batch, EventError> {
        let events = batch
            .iter()
            .enumerate()
            .map(|(index, event)| {
                self.validator
                    .validate(event.clone())
                    .map_err(|violations| EventError::InvalidBatchMember { index, violations })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Batch::new(events)
    }

    fn decode_single(&self, map: Map<String, Value>) -> Result<Event, EventError> {
        trace!(keys = map.len(), "decoding single event");
        self.decode_event(map).map_err(EventError::Validation)
    }

    fn decode_batch(&self, members: Vec<Value>) -> Result<Batch, EventError> {
        trace!(members = members.len(), "decoding event batch");
        if members.is_empty() {
            return Err(EventError::EmptyBatch);
        }

        let mut events = Vec::with_capacity(members.len());
        for (index, member) in members.into_iter().enumerate() {
            let map = match member {
                Value::Object(map) => map,
                other => {
                    return Err(EventError::Parse(format!(
                        "batch member {index} is {}, expected an object",
                        json_type(&other)
                    )))
                }
            };
            let event = self
                .decode_event(map)
                .map_err(|violations| EventError::InvalidBatchMember { index, violations })?;
            events.push(event);
        }

        Batch::new(events)
    }

    /// Maps one JSON object onto an event and validates it.
    ///
    /// Wire-level problems (wrong JSON types, both payload keys present) are
    /// reported alongside the validator's findings.
    fn decode_event(&self, mut map: Map<String, Value>) -> Result<Event, Violations> {
        map.retain(|_, value| !value.is_null());

        let version = match map.remove("specversion") {
            None => return Err(Violations::new(vec![Violation::missing("specversion")])),
            Some(Value::String(s)) => match SpecVersion::parse(&s) {
                Some(version) => version,
                None => {
                    return Err(Violations::new(vec![Violation::new(
                        "specversion",
                        ViolationKind::UnsupportedSpecVersion { found: s },
                    )]))
                }
            },
            Some(other) => {
                return Err(Violations::new(vec![wrong_json_type(
                    "specversion",
                    AttributeKind::String,
                    &other,
                )]))
            }
        };

        let mut decoded = PartialEvent::new(version);
        for spec in version.attributes() {
            if spec.attribute == Attribute::SpecVersion {
                continue;
            }
            match map.remove(spec.name) {
                None => {}
                Some(Value::String(s)) => decoded.event.set_attribute(spec.attribute, s),
                Some(other) => decoded.reject(wrong_json_type(spec.name, spec.kind, &other)),
            }
        }

        decoded.take_data(&mut map);

        for (name, value) in map {
            match extension_from_json(&name, value) {
                Ok(value) => {
                    decoded.event.extensions.insert(name, value);
                }
                Err(violation) => decoded.reject(violation),
            }
        }

        decoded.finish(&self.validator)
    }
}

/// An event being decoded, plus the wire-level violations seen so far.
struct PartialEvent {
    event: Event,
    violations: Vec<Violation>,
}

impl PartialEvent {
    fn new(version: SpecVersion) -> Self {
        Self {
            event: Event::new(version.as_str(), "", "", ""),
            violations: Vec::new(),
        }
    }

    fn reject(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    fn take_data(&mut self, map: &mut Map<String, Value>) {
        let data = map.remove(DATA);
        let (data_base64, encoding) = match self.version().binary_encoding() {
            BinaryEncoding::DataBase64 => (map.remove(DATA_BASE64), None),
            BinaryEncoding::ContentEncoding => {
                // 0.3 carries binary payloads only under `data`.
                if map.remove(DATA_BASE64).is_some() {
                    self.reject(Violation::new(
                        DATA_BASE64,
                        ViolationKind::InvalidExtensionName(ExtensionNameError::Reserved),
                    ));
                }
                (None, map.remove(DATA_CONTENT_ENCODING))
            }
        };

        let base64_flagged = match encoding {
            None => false,
            Some(Value::String(ref s)) if s == BASE64_ENCODING => true,
            Some(other) => {
                self.reject(Violation::new(
                    DATA_CONTENT_ENCODING,
                    ViolationKind::InvalidAttributeType {
                        expected: AttributeKind::String,
                        got: format!("{other} (only \"{BASE64_ENCODING}\" is defined)"),
                    },
                ));
                false
            }
        };

        self.event.data = match (data, data_base64) {
            (Some(_), Some(_)) => {
                self.reject(Violation::new(DATA, ViolationKind::DataEncodingConflict));
                None
            }
            (None, Some(encoded)) => self.decode_base64(DATA_BASE64, encoded),
            (Some(encoded), None) if base64_flagged => self.decode_base64(DATA, encoded),
            (Some(Value::String(text)), None) => Some(Data::Text(text)),
            (Some(value), None) => Some(Data::Json(value)),
            (None, None) => None,
        };
    }

    fn decode_base64(&mut self, key: &str, value: Value) -> Option<Data> {
        let encoded = match value {
            Value::String(encoded) => encoded,
            other => {
                self.reject(wrong_json_type(key, AttributeKind::Binary, &other));
                return None;
            }
        };
        match types::decode_binary(&encoded) {
            Ok(bytes) => Some(Data::Binary(bytes)),
            Err(e) => {
                self.reject(Violation::invalid_type(key, AttributeKind::Binary, &e));
                None
            }
        }
    }

    fn version(&self) -> SpecVersion {
        self.event.spec_version().unwrap_or_default()
    }

    fn finish(self, validator: &Validator) -> Result<Event, Violations> {
        let PartialEvent {
            event,
            mut violations,
        } = self;

        match validator.validate(event) {
            Ok(event) if violations.is_empty() => Ok(event),
            Ok(_) => Err(Violations::new(violations)),
            Err(found) => {
                // An attribute with the wrong JSON type was left unset; the
                // validator would report it again as missing.
                let seen: Vec<String> = violations.iter().map(|v| v.attribute.clone()).collect();
                violations.extend(found.into_iter().filter(|v| !seen.contains(&v.attribute)));
                Err(Violations::new(violations))
            }
        }
    }
}

fn parse(text: &str) -> Result<Value, EventError> {
    serde_json::from_str(text).map_err(|e| EventError::Parse(e.to_string()))
}

fn extension_from_json(name: &str, value: Value) -> Result<ExtensionValue, Violation> {
    match value {
        Value::String(s) => Ok(ExtensionValue::String(s)),
        Value::Bool(b) => Ok(ExtensionValue::Boolean(b)),
        Value::Number(n) if n.is_u64() && n.as_i64().is_none() => Err(Violation::new(
            name,
            ViolationKind::InvalidAttributeType {
                expected: AttributeKind::Integer,
                got: format!("{n} (out of 32-bit range)"),
            },
        )),
        Value::Number(n) => {
            let Some(i) = n.as_i64() else {
                return Err(Violation::new(
                    name,
                    ViolationKind::InvalidAttributeType {
                        expected: AttributeKind::Integer,
                        got: format!("non-integer number {n}"),
                    },
                ));
            };
            types::integer_from_i64(i)
                .map(ExtensionValue::Integer)
                .map_err(|e| Violation::invalid_type(name, AttributeKind::Integer, &e))
        }
        other => Err(wrong_json_type(name, AttributeKind::String, &other)),
    }
}

fn wrong_json_type(attribute: &str, expected: AttributeKind, value: &Value) -> Violation {
    Violation::new(
        attribute,
        ViolationKind::InvalidAttributeType {
            expected,
            got: json_type(value).to_string(),
        },
    )
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// serde::Serialize
// =============================================================================

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let version = self.spec_version().ok_or_else(|| {
            S::Error::custom(format!("unsupported specversion '{}'", self.specversion()))
        })?;

        let mut map = serializer.serialize_map(None)?;
        for spec in version.attributes() {
            if let Some(value) = self.attribute(spec.attribute) {
                map.serialize_entry(spec.name, value)?;
            }
        }

        match self.data() {
            None => {}
            Some(Data::Json(value)) => map.serialize_entry(DATA, value)?,
            Some(Data::Text(text)) => map.serialize_entry(DATA, text)?,
            Some(Data::Binary(bytes)) => {
                let encoded = types::encode_binary(bytes);
                match version.binary_encoding() {
                    BinaryEncoding::DataBase64 => map.serialize_entry(DATA_BASE64, &encoded)?,
                    BinaryEncoding::ContentEncoding => {
                        map.serialize_entry(DATA_CONTENT_ENCODING, BASE64_ENCODING)?;
                        map.serialize_entry(DATA, &encoded)?;
                    }
                }
            }
        }

        serialize_extensions(&mut map, self.extensions())?;
        map.end()
    }
}

fn serialize_extensions<M: SerializeMap>(
    map: &mut M,
    extensions: &Extensions,
) -> Result<(), M::Error> {
    for (name, value) in extensions {
        map.serialize_entry(name, value)?;
    }
    Ok(())
}

impl Serialize for ExtensionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ExtensionValue::Boolean(b) => serializer.serialize_bool(*b),
            ExtensionValue::Integer(i) => serializer.serialize_i32(*i),
            other => serializer.serialize_str(&other.as_string()),
        }
    }
}

impl Serialize for Batch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for event in self {
            seq.serialize_element(event)?;
        }
        seq.end()
    }
}

// =============================================================================
// Free functions
// =============================================================================

/// Validates and encodes one event with default options.
pub fn to_json(event: &Event) -> Result<String, EventError> {
    JsonFormat::default().serialize(event)
}

/// Validates and encodes a batch with default options.
pub fn batch_to_json(batch: &Batch) -> Result<String, EventError> {
    JsonFormat::default().serialize_batch(batch)
}

/// Validates one event and returns its JSON object.
pub fn to_value(event: &Event) -> Result<Value, EventError> {
    JsonFormat::default().to_value(event)
}

/// Decodes a single event or a batch with default options.
pub fn from_json(text: &str) -> Result<Decoded, EventError> {
    JsonFormat::default().deserialize(text)
}

/// Decodes exactly one event.
pub fn event_from_json(text: &str) -> Result<Event, EventError> {
    JsonFormat::default().deserialize_event(text)
}

/// Decodes a batch.
pub fn batch_from_json(text: &str) -> Result<Batch, EventError> {
    JsonFormat::default().deserialize_batch(text)
}

/// Decodes an already parsed JSON value.
pub fn from_value(value: Value) -> Result<Decoded, EventError> {
    JsonFormat::default().from_value(value)
}
