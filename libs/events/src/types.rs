//! The CloudEvents attribute type system.
//!
//! Every context attribute and extension value has one of seven primitive
//! types. Each type has a canonical string form; the functions here check a
//! candidate string and return that canonical form, or a [`TypeError`].
//!
//! | Type          | Canonical string form                               |
//! |---------------|-----------------------------------------------------|
//! | String        | the string itself                                   |
//! | URI           | absolute URI, RFC 3986                              |
//! | URI-Reference | absolute URI or relative reference, RFC 3986        |
//! | Timestamp     | RFC 3339, `Z` for UTC, 0/3/6/9 fractional digits    |
//! | Binary        | base64 (standard alphabet, padded)                  |
//! | Boolean       | `true` or `false`                                   |
//! | Integer       | decimal, signed 32-bit range                        |

use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use regex::Regex;

use crate::TypeError;

/// RFC 3986 character set: unreserved, reserved and percent-escapes.
static URI_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9\-._~:/?#\[\]@!$&'()*+,;=]|%[0-9A-Fa-f]{2})*$")
        .expect("invalid regex")
});

static URI_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("invalid regex"));

/// RFC 2046 `type/subtype` with optional parameters.
static MEDIA_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^[A-Za-z0-9][A-Za-z0-9!#$&^_.+\-]*/[A-Za-z0-9][A-Za-z0-9!#$&^_.+\-]*(?:\s*;\s*[A-Za-z0-9!#$&^_.+\-]+=(?:"[^"]*"|[A-Za-z0-9!#$&^_.+\-]+))*\s*$"#,
    )
    .expect("invalid regex")
});

/// A CloudEvents primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    String,
    Uri,
    UriRef,
    Timestamp,
    Binary,
    Boolean,
    Integer,
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AttributeKind::String => "String",
            AttributeKind::Uri => "URI",
            AttributeKind::UriRef => "URI-Reference",
            AttributeKind::Timestamp => "Timestamp",
            AttributeKind::Binary => "Binary",
            AttributeKind::Boolean => "Boolean",
            AttributeKind::Integer => "Integer",
        };
        write!(f, "{}", s)
    }
}

/// Checks `value` against `kind` and returns its canonical string form.
pub fn canonicalize(kind: AttributeKind, value: &str) -> Result<String, TypeError> {
    match kind {
        AttributeKind::String => validate_string(value).map(str::to_string),
        AttributeKind::Uri => validate_uri(value).map(str::to_string),
        AttributeKind::UriRef => validate_uri_reference(value).map(str::to_string),
        AttributeKind::Timestamp => normalize_timestamp(value),
        AttributeKind::Binary => decode_binary(value).map(|bytes| encode_binary(&bytes)),
        AttributeKind::Boolean => parse_boolean(value).map(|b| b.to_string()),
        AttributeKind::Integer => parse_integer(value).map(|i| i.to_string()),
    }
}

// =============================================================================
// String
// =============================================================================

/// Accepts any string free of control characters and Unicode noncharacters.
pub fn validate_string(value: &str) -> Result<&str, TypeError> {
    if let Some(c) = value.chars().find(|&c| c.is_control() || is_noncharacter(c)) {
        return Err(TypeError::InvalidType {
            expected: AttributeKind::String,
            got: format!("disallowed character U+{:04X}", u32::from(c)),
        });
    }
    Ok(value)
}

fn is_noncharacter(c: char) -> bool {
    let cp = u32::from(c);
    (0xFDD0..=0xFDEF).contains(&cp) || (cp & 0xFFFE) == 0xFFFE
}

/// Accepts an RFC 2046 media type such as `application/json; charset=utf-8`.
pub fn validate_media_type(value: &str) -> Result<&str, TypeError> {
    if MEDIA_TYPE.is_match(value) {
        Ok(value)
    } else {
        Err(TypeError::InvalidType {
            expected: AttributeKind::String,
            got: format!("'{value}' (not a media type)"),
        })
    }
}

// =============================================================================
// URI and URI-Reference
// =============================================================================

/// Accepts an absolute URI (scheme required).
pub fn validate_uri(value: &str) -> Result<&str, TypeError> {
    check_uri_syntax(value)?;
    if !URI_SCHEME.is_match(value) {
        return Err(invalid_uri(value, "missing scheme"));
    }
    parse_absolute(value)?;
    Ok(value)
}

/// Accepts an absolute URI or a relative reference.
pub fn validate_uri_reference(value: &str) -> Result<&str, TypeError> {
    check_uri_syntax(value)?;
    if URI_SCHEME.is_match(value) {
        parse_absolute(value)?;
        return Ok(value);
    }

    // Without a scheme, a colon in the first segment would read as one.
    let first_segment = value.split(['/', '?', '#']).next().unwrap_or_default();
    if first_segment.contains(':') {
        return Err(invalid_uri(
            value,
            "relative reference cannot contain ':' in its first path segment",
        ));
    }
    Ok(value)
}

fn check_uri_syntax(value: &str) -> Result<(), TypeError> {
    if value.is_empty() {
        return Err(invalid_uri(value, "empty"));
    }
    if !URI_CHARS.is_match(value) {
        return Err(invalid_uri(
            value,
            "contains characters outside RFC 3986 or a malformed percent-escape",
        ));
    }
    if value.matches('#').count() > 1 {
        return Err(invalid_uri(value, "more than one fragment delimiter"));
    }
    Ok(())
}

fn parse_absolute(value: &str) -> Result<(), TypeError> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| invalid_uri(value, &e.to_string()))
}

fn invalid_uri(value: &str, reason: &str) -> TypeError {
    TypeError::InvalidUri {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

// =============================================================================
// Timestamp
// =============================================================================

/// Parses an RFC 3339 timestamp, keeping its UTC offset.
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, TypeError> {
    DateTime::parse_from_rfc3339(value).map_err(|e| TypeError::InvalidTimestamp {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Formats a timestamp in canonical RFC 3339 form.
pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses and re-formats a timestamp string.
pub fn normalize_timestamp(value: &str) -> Result<String, TypeError> {
    parse_timestamp(value).map(|ts| format_timestamp(&ts))
}

// =============================================================================
// Binary, Boolean, Integer
// =============================================================================

/// Decodes base64 text into bytes.
pub fn decode_binary(value: &str) -> Result<Vec<u8>, TypeError> {
    STANDARD.decode(value).map_err(|e| TypeError::InvalidType {
        expected: AttributeKind::Binary,
        got: format!("invalid base64 ({e})"),
    })
}

/// Encodes bytes as base64 text.
pub fn encode_binary(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn parse_boolean(value: &str) -> Result<bool, TypeError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(TypeError::InvalidType {
            expected: AttributeKind::Boolean,
            got: format!("'{other}'"),
        }),
    }
}

pub fn parse_integer(value: &str) -> Result<i32, TypeError> {
    value.parse::<i32>().map_err(|e| TypeError::InvalidType {
        expected: AttributeKind::Integer,
        got: format!("'{value}' ({e})"),
    })
}

/// Narrows a JSON integer to the CloudEvents 32-bit range.
pub fn integer_from_i64(value: i64) -> Result<i32, TypeError> {
    i32::try_from(value).map_err(|_| TypeError::InvalidType {
        expected: AttributeKind::Integer,
        got: format!("{value} (outside the signed 32-bit range)"),
    })
}
