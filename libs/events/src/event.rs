//! The CloudEvent value type and its builder.

use std::borrow::Cow;
use std::collections::BTreeMap;

use ce_id::DefaultGenerator;
use chrono::{DateTime, FixedOffset};

use crate::types::{self, AttributeKind};
use crate::version::{Attribute, SpecVersion};
use crate::{EventError, Validator};

/// An event payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// A structured JSON value.
    Json(serde_json::Value),
    /// Text, carried as a JSON string.
    Text(String),
    /// Raw bytes, carried as base64 text.
    Binary(Vec<u8>),
}

impl Data {
    pub fn is_binary(&self) -> bool {
        matches!(self, Data::Binary(_))
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Data::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Data::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Data::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for Data {
    fn from(value: serde_json::Value) -> Self {
        Data::Json(value)
    }
}

impl From<String> for Data {
    fn from(text: String) -> Self {
        Data::Text(text)
    }
}

impl From<&str> for Data {
    fn from(text: &str) -> Self {
        Data::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Data {
    fn from(bytes: Vec<u8>) -> Self {
        Data::Binary(bytes)
    }
}

impl From<&[u8]> for Data {
    fn from(bytes: &[u8]) -> Self {
        Data::Binary(bytes.to_vec())
    }
}

/// An extension attribute value.
///
/// JSON has no distinct types for URIs, timestamps or binary values, so
/// those travel as strings. Equality follows the wire: two string-like
/// values are equal when their canonical string forms are.
#[derive(Debug, Clone)]
pub enum ExtensionValue {
    String(String),
    Boolean(bool),
    Integer(i32),
    Uri(String),
    UriRef(String),
    Timestamp(String),
    Binary(Vec<u8>),
}

impl ExtensionValue {
    pub fn kind(&self) -> AttributeKind {
        match self {
            ExtensionValue::String(_) => AttributeKind::String,
            ExtensionValue::Boolean(_) => AttributeKind::Boolean,
            ExtensionValue::Integer(_) => AttributeKind::Integer,
            ExtensionValue::Uri(_) => AttributeKind::Uri,
            ExtensionValue::UriRef(_) => AttributeKind::UriRef,
            ExtensionValue::Timestamp(_) => AttributeKind::Timestamp,
            ExtensionValue::Binary(_) => AttributeKind::Binary,
        }
    }

    /// The value's string form.
    pub fn as_string(&self) -> Cow<'_, str> {
        match self {
            ExtensionValue::String(s)
            | ExtensionValue::Uri(s)
            | ExtensionValue::UriRef(s)
            | ExtensionValue::Timestamp(s) => Cow::Borrowed(s),
            ExtensionValue::Boolean(b) => Cow::Owned(b.to_string()),
            ExtensionValue::Integer(i) => Cow::Owned(i.to_string()),
            ExtensionValue::Binary(bytes) => Cow::Owned(types::encode_binary(bytes)),
        }
    }

    fn is_string_like(&self) -> bool {
        !matches!(
            self,
            ExtensionValue::Boolean(_) | ExtensionValue::Integer(_)
        )
    }
}

impl PartialEq for ExtensionValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ExtensionValue::Boolean(a), ExtensionValue::Boolean(b)) => a == b,
            (ExtensionValue::Integer(a), ExtensionValue::Integer(b)) => a == b,
            (a, b) if a.is_string_like() && b.is_string_like() => a.as_string() == b.as_string(),
            _ => false,
        }
    }
}

impl Eq for ExtensionValue {}

impl From<String> for ExtensionValue {
    fn from(s: String) -> Self {
        ExtensionValue::String(s)
    }
}

impl From<&str> for ExtensionValue {
    fn from(s: &str) -> Self {
        ExtensionValue::String(s.to_string())
    }
}

impl From<bool> for ExtensionValue {
    fn from(b: bool) -> Self {
        ExtensionValue::Boolean(b)
    }
}

impl From<i32> for ExtensionValue {
    fn from(i: i32) -> Self {
        ExtensionValue::Integer(i)
    }
}

impl From<Vec<u8>> for ExtensionValue {
    fn from(bytes: Vec<u8>) -> Self {
        ExtensionValue::Binary(bytes)
    }
}

impl From<DateTime<FixedOffset>> for ExtensionValue {
    fn from(ts: DateTime<FixedOffset>) -> Self {
        ExtensionValue::Timestamp(types::format_timestamp(&ts))
    }
}

/// Extension attributes keyed by name.
///
/// Sorted by name so serialization order is stable.
pub type Extensions = BTreeMap<String, ExtensionValue>;

/// A CloudEvent.
///
/// Constructing an `Event` does not validate it; [`Validator::validate`]
/// does, and returns the normalized event. Events are immutable once
/// built: use [`Event::to_builder`] to derive a modified copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub(crate) specversion: String,
    pub(crate) id: String,
    pub(crate) source: String,
    pub(crate) event_type: String,
    pub(crate) datacontenttype: Option<String>,
    pub(crate) dataschema: Option<String>,
    pub(crate) subject: Option<String>,
    pub(crate) time: Option<String>,
    pub(crate) data: Option<Data>,
    pub(crate) extensions: Extensions,
}

impl Event {
    /// Creates an unvalidated event from the four required attributes.
    pub fn new(
        specversion: impl Into<String>,
        id: impl Into<String>,
        source: impl Into<String>,
        event_type: impl Into<String>,
    ) -> Self {
        Self {
            specversion: specversion.into(),
            id: id.into(),
            source: source.into(),
            event_type: event_type.into(),
            datacontenttype: None,
            dataschema: None,
            subject: None,
            time: None,
            data: None,
            extensions: Extensions::new(),
        }
    }

    /// Creates a new event builder.
    pub fn builder() -> EventBuilder {
        EventBuilder::new()
    }

    /// Returns a builder seeded with this event's attributes.
    pub fn to_builder(&self) -> EventBuilder {
        EventBuilder {
            specversion: self.specversion.clone(),
            id: Some(self.id.clone()),
            source: Some(self.source.clone()),
            event_type: Some(self.event_type.clone()),
            datacontenttype: self.datacontenttype.clone(),
            dataschema: self.dataschema.clone(),
            subject: self.subject.clone(),
            time: self.time.clone(),
            data: self.data.clone(),
            extensions: self.extensions.clone(),
        }
    }

    pub fn specversion(&self) -> &str {
        &self.specversion
    }

    /// The parsed spec version, if supported.
    pub fn spec_version(&self) -> Option<SpecVersion> {
        SpecVersion::parse(&self.specversion)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn datacontenttype(&self) -> Option<&str> {
        self.datacontenttype.as_deref()
    }

    pub fn dataschema(&self) -> Option<&str> {
        self.dataschema.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// The `time` attribute in its string form.
    pub fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    /// The `time` attribute parsed. `None` if absent or not RFC 3339.
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.time
            .as_deref()
            .and_then(|t| types::parse_timestamp(t).ok())
    }

    pub fn data(&self) -> Option<&Data> {
        self.data.as_ref()
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extension(&self, name: &str) -> Option<&ExtensionValue> {
        self.extensions.get(name)
    }

    /// Reads a context attribute by tag. Required attributes are always
    /// `Some`, possibly empty.
    pub fn attribute(&self, attribute: Attribute) -> Option<&str> {
        match attribute {
            Attribute::SpecVersion => Some(&self.specversion),
            Attribute::Id => Some(&self.id),
            Attribute::Source => Some(&self.source),
            Attribute::Type => Some(&self.event_type),
            Attribute::DataContentType => self.datacontenttype.as_deref(),
            Attribute::DataSchema => self.dataschema.as_deref(),
            Attribute::Subject => self.subject.as_deref(),
            Attribute::Time => self.time.as_deref(),
        }
    }

    pub(crate) fn set_attribute(&mut self, attribute: Attribute, value: String) {
        match attribute {
            Attribute::SpecVersion => self.specversion = value,
            Attribute::Id => self.id = value,
            Attribute::Source => self.source = value,
            Attribute::Type => self.event_type = value,
            Attribute::DataContentType => self.datacontenttype = Some(value),
            Attribute::DataSchema => self.dataschema = Some(value),
            Attribute::Subject => self.subject = Some(value),
            Attribute::Time => self.time = Some(value),
        }
    }
}

/// Builder for constructing events.
///
/// `specversion` defaults to `1.0`. `id` and `time` are filled by a
/// [`DefaultGenerator`] when left unset; caller values are never replaced.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    specversion: String,
    id: Option<String>,
    source: Option<String>,
    event_type: Option<String>,
    datacontenttype: Option<String>,
    dataschema: Option<String>,
    subject: Option<String>,
    time: Option<String>,
    data: Option<Data>,
    extensions: Extensions,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self {
            specversion: SpecVersion::default().as_str().to_string(),
            id: None,
            source: None,
            event_type: None,
            datacontenttype: None,
            dataschema: None,
            subject: None,
            time: None,
            data: None,
            extensions: Extensions::new(),
        }
    }

    pub fn spec_version(mut self, version: SpecVersion) -> Self {
        self.specversion = version.as_str().to_string();
        self
    }

    /// Sets a raw `specversion` string, supported or not.
    pub fn specversion(mut self, specversion: impl Into<String>) -> Self {
        self.specversion = specversion.into();
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn datacontenttype(mut self, datacontenttype: impl Into<String>) -> Self {
        self.datacontenttype = Some(datacontenttype.into());
        self
    }

    pub fn dataschema(mut self, dataschema: impl Into<String>) -> Self {
        self.dataschema = Some(dataschema.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn time(mut self, time: impl Into<DateTime<FixedOffset>>) -> Self {
        self.time = Some(types::format_timestamp(&time.into()));
        self
    }

    /// Sets `time` from a string; checked at validation.
    pub fn time_str(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn data(mut self, data: impl Into<Data>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn extension(mut self, name: impl Into<String>, value: impl Into<ExtensionValue>) -> Self {
        self.extensions.insert(name.into(), value.into());
        self
    }

    pub fn without_extension(mut self, name: &str) -> Self {
        self.extensions.remove(name);
        self
    }

    /// Fills defaults and returns the event without validating it.
    pub fn assemble_with(self, generator: &DefaultGenerator) -> Event {
        let id = self
            .id
            .unwrap_or_else(|| generator.generate_id().to_string());
        let time = self
            .time
            .or_else(|| Some(types::format_timestamp(&generator.now().into())));

        Event {
            specversion: self.specversion,
            id,
            source: self.source.unwrap_or_default(),
            event_type: self.event_type.unwrap_or_default(),
            datacontenttype: self.datacontenttype,
            dataschema: self.dataschema,
            subject: self.subject,
            time,
            data: self.data,
            extensions: self.extensions,
        }
    }

    /// Builds and validates the event with the system default generator.
    pub fn build(self) -> Result<Event, EventError> {
        self.build_with(&DefaultGenerator::system())
    }

    /// Builds and validates the event with `generator` supplying defaults.
    pub fn build_with(self, generator: &DefaultGenerator) -> Result<Event, EventError> {
        let event = self.assemble_with(generator);
        Validator::default()
            .validate(event)
            .map_err(EventError::Validation)
    }
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self::new()
    }
}
