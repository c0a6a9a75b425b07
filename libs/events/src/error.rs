//! Error types for event handling.

use thiserror::Error;

use crate::types::AttributeKind;

/// Failure of an Attribute Type System check.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// The value is not a valid URI or URI-reference.
    #[error("invalid URI '{value}': {reason}")]
    InvalidUri { value: String, reason: String },

    /// The value is not an RFC 3339 timestamp.
    #[error("invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    /// The value does not have the expected type.
    #[error("expected {expected}, got {got}")]
    InvalidType { expected: AttributeKind, got: String },
}

impl TypeError {
    /// Short description of what was found instead of a valid value.
    pub fn got(&self) -> String {
        match self {
            TypeError::InvalidUri { value, reason } => format!("'{value}' ({reason})"),
            TypeError::InvalidTimestamp { value, reason } => format!("'{value}' ({reason})"),
            TypeError::InvalidType { got, .. } => got.clone(),
        }
    }
}

/// Why an extension attribute name was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtensionNameError {
    #[error("name cannot be empty")]
    Empty,

    #[error("name is {len} characters, maximum is {max}")]
    TooLong { len: usize, max: usize },

    #[error("invalid character '{0}', only a-z and 0-9 are allowed")]
    InvalidCharacter(char),

    #[error("name is reserved for a context attribute")]
    Reserved,
}

/// The kind of a single validation violation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// The `specversion` value is not supported.
    #[error("unsupported specversion '{found}'")]
    UnsupportedSpecVersion { found: String },

    /// A required attribute is absent or empty.
    #[error("missing required attribute")]
    MissingRequiredAttribute,

    /// A present attribute has the wrong type or an invalid value.
    #[error("expected {expected}, got {got}")]
    InvalidAttributeType { expected: AttributeKind, got: String },

    /// An extension name breaks the naming rules.
    #[error("invalid extension name: {0}")]
    InvalidExtensionName(ExtensionNameError),

    /// Both `data` and `data_base64` are present.
    #[error("both data and data_base64 are present")]
    DataEncodingConflict,
}

/// One violation, tagged with the offending attribute name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{attribute}: {kind}")]
pub struct Violation {
    pub attribute: String,
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(attribute: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            attribute: attribute.into(),
            kind,
        }
    }

    pub fn missing(attribute: impl Into<String>) -> Self {
        Self::new(attribute, ViolationKind::MissingRequiredAttribute)
    }

    pub fn invalid_type(
        attribute: impl Into<String>,
        expected: AttributeKind,
        err: &TypeError,
    ) -> Self {
        Self::new(
            attribute,
            ViolationKind::InvalidAttributeType {
                expected,
                got: err.got(),
            },
        )
    }
}

/// The complete set of violations found for one event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self(violations)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Violation] {
        &self.0
    }

    /// Returns the violations reported for `attribute`.
    pub fn for_attribute<'a>(&'a self, attribute: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.0.iter().filter(move |v| v.attribute == attribute)
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.0
    }
}

impl std::fmt::Display for Violations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

impl From<Vec<Violation>> for Violations {
    fn from(violations: Vec<Violation>) -> Self {
        Self(violations)
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Errors that can occur when building, encoding or decoding events.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EventError {
    /// The input is not well-formed JSON, or has the wrong top-level shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// The event failed validation.
    #[error("validation failed: {0}")]
    Validation(Violations),

    /// Batch members disagree on `specversion`.
    #[error("batch member {index} has specversion '{found}', expected '{expected}'")]
    BatchSpecVersionMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    /// A batch member failed validation; the whole batch is rejected.
    #[error("batch member {index} is invalid: {violations}")]
    InvalidBatchMember { index: usize, violations: Violations },

    /// A batch must contain at least one event.
    #[error("batch must contain at least one event")]
    EmptyBatch,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl EventError {
    /// Returns true if the input never got as far as event construction.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, EventError::Parse(_))
    }

    /// Returns the violations carried by this error, if any.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            EventError::Validation(v) | EventError::InvalidBatchMember { violations: v, .. } => {
                Some(v)
            }
            _ => None,
        }
    }
}

impl From<Violations> for EventError {
    fn from(violations: Violations) -> Self {
        EventError::Validation(violations)
    }
}

impl From<serde_json::Error> for EventError {
    fn from(err: serde_json::Error) -> Self {
        EventError::Serialization(err.to_string())
    }
}
