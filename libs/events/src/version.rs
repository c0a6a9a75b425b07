//! Supported CloudEvents spec versions and their attribute tables.
//!
//! Attribute rules are version-scoped. Each [`SpecVersion`] owns a static
//! table describing its context attributes; the validator and the JSON codec
//! select the table by tag instead of hard-coding 1.0 names.

use crate::types::AttributeKind;

/// A context attribute, independent of its wire name in a given version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    SpecVersion,
    Id,
    Source,
    Type,
    DataContentType,
    DataSchema,
    Subject,
    Time,
}

/// One row of a version's attribute table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpec {
    pub attribute: Attribute,
    /// Wire name in this version.
    pub name: &'static str,
    pub kind: AttributeKind,
    pub required: bool,
}

const fn spec(
    attribute: Attribute,
    name: &'static str,
    kind: AttributeKind,
    required: bool,
) -> AttributeSpec {
    AttributeSpec {
        attribute,
        name,
        kind,
        required,
    }
}

/// Attribute table for CloudEvents 1.0, in serialization order.
const V1_0_ATTRIBUTES: [AttributeSpec; 8] = [
    spec(Attribute::SpecVersion, "specversion", AttributeKind::String, true),
    spec(Attribute::Id, "id", AttributeKind::String, true),
    spec(Attribute::Source, "source", AttributeKind::UriRef, true),
    spec(Attribute::Type, "type", AttributeKind::String, true),
    spec(Attribute::DataContentType, "datacontenttype", AttributeKind::String, false),
    spec(Attribute::DataSchema, "dataschema", AttributeKind::Uri, false),
    spec(Attribute::Subject, "subject", AttributeKind::String, false),
    spec(Attribute::Time, "time", AttributeKind::Timestamp, false),
];

/// Attribute table for CloudEvents 0.3, in serialization order.
const V0_3_ATTRIBUTES: [AttributeSpec; 8] = [
    spec(Attribute::SpecVersion, "specversion", AttributeKind::String, true),
    spec(Attribute::Id, "id", AttributeKind::String, true),
    spec(Attribute::Source, "source", AttributeKind::UriRef, true),
    spec(Attribute::Type, "type", AttributeKind::String, true),
    spec(Attribute::DataContentType, "datacontenttype", AttributeKind::String, false),
    spec(Attribute::DataSchema, "schemaurl", AttributeKind::UriRef, false),
    spec(Attribute::Subject, "subject", AttributeKind::String, false),
    spec(Attribute::Time, "time", AttributeKind::Timestamp, false),
];

/// Wire key for structured or text payloads.
pub const DATA: &str = "data";

/// Wire key for base64 payloads (1.0).
pub const DATA_BASE64: &str = "data_base64";

/// 0.3 attribute announcing that `data` holds base64 text.
pub const DATA_CONTENT_ENCODING: &str = "datacontentencoding";

/// The only `datacontentencoding` value 0.3 defines for JSON.
pub const BASE64_ENCODING: &str = "base64";

/// How a version places binary payloads in a structured JSON event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryEncoding {
    /// Base64 text under `data_base64`.
    DataBase64,
    /// Base64 text under `data`, flagged by `datacontentencoding: base64`.
    ContentEncoding,
}

/// A CloudEvents spec version this crate supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SpecVersion {
    V0_3,
    #[default]
    V1_0,
}

impl SpecVersion {
    /// Every supported version, newest first.
    pub const ALL: [SpecVersion; 2] = [SpecVersion::V1_0, SpecVersion::V0_3];

    /// Parses a `specversion` value. Returns `None` for unsupported versions.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1.0" => Some(SpecVersion::V1_0),
            "0.3" => Some(SpecVersion::V0_3),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecVersion::V1_0 => "1.0",
            SpecVersion::V0_3 => "0.3",
        }
    }

    /// The attribute table for this version.
    pub fn attributes(&self) -> &'static [AttributeSpec] {
        match self {
            SpecVersion::V1_0 => &V1_0_ATTRIBUTES,
            SpecVersion::V0_3 => &V0_3_ATTRIBUTES,
        }
    }

    /// Looks up the table row for `attribute`.
    pub fn attribute(&self, attribute: Attribute) -> &'static AttributeSpec {
        let table = self.attributes();
        // Both tables list every Attribute variant in declaration order.
        &table[attribute as usize]
    }

    /// Looks up a table row by wire name.
    pub fn attribute_by_name(&self, name: &str) -> Option<&'static AttributeSpec> {
        self.attributes().iter().find(|spec| spec.name == name)
    }

    pub fn binary_encoding(&self) -> BinaryEncoding {
        match self {
            SpecVersion::V1_0 => BinaryEncoding::DataBase64,
            SpecVersion::V0_3 => BinaryEncoding::ContentEncoding,
        }
    }

    /// Returns true if `name` may not be used as an extension name.
    pub fn is_reserved(&self, name: &str) -> bool {
        if name == DATA || name == DATA_BASE64 {
            return true;
        }
        if *self == SpecVersion::V0_3 && name == DATA_CONTENT_ENCODING {
            return true;
        }
        // 1.0 names stay reserved in older versions too.
        V1_0_ATTRIBUTES.iter().any(|spec| spec.name == name)
            || self.attribute_by_name(name).is_some()
    }
}

impl std::fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
