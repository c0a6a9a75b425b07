//! Event validation.
//!
//! # Algorithm
//!
//! 1. `specversion` must be supported; otherwise validation stops with a
//!    single violation, since every later rule is version-scoped.
//! 2. Required attributes must be present and non-empty.
//! 3. Present optional attributes are checked against their type.
//! 4. Extension names and values are checked.
//! 5. The payload is normalized.
//!
//! The result is all-or-nothing: either the normalized event, or every
//! violation that was found.

use tracing::debug;

use crate::event::{Data, Event, ExtensionValue};
use crate::types;
use crate::version::{Attribute, AttributeSpec, SpecVersion};
use crate::{ExtensionNameError, Violation, ViolationKind, Violations};

/// Default maximum extension name length (CloudEvents 1.0 naming rule).
pub const DEFAULT_MAX_EXTENSION_NAME_LEN: usize = 20;

/// Tunable validation rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Longest accepted extension name, in characters.
    pub max_extension_name_len: usize,
}

impl ValidationOptions {
    pub fn with_max_extension_name_len(mut self, max: usize) -> Self {
        self.max_extension_name_len = max;
        self
    }
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_extension_name_len: DEFAULT_MAX_EXTENSION_NAME_LEN,
        }
    }
}

/// Checks events for conformance and normalizes them.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    options: ValidationOptions,
}

impl Validator {
    pub fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Validates `event`, returning it normalized or with every violation.
    pub fn validate(&self, event: Event) -> Result<Event, Violations> {
        let version = match check_spec_version(&event.specversion) {
            Ok(version) => version,
            Err(violation) => {
                debug!(specversion = %event.specversion, "event rejected: specversion");
                return Err(Violations::new(vec![violation]));
            }
        };

        let mut event = event;
        let mut violations = Vec::new();

        for spec in version.attributes() {
            if spec.attribute == Attribute::SpecVersion {
                continue;
            }
            let normalized = match event.attribute(spec.attribute) {
                None => continue,
                Some("") if spec.required => {
                    violations.push(Violation::missing(spec.name));
                    continue;
                }
                Some(value) => check_attribute(spec, value),
            };
            match normalized {
                Ok(value) => event.set_attribute(spec.attribute, value),
                Err(violation) => violations.push(violation),
            }
        }

        let mut extensions = std::mem::take(&mut event.extensions);
        for (name, value) in extensions.iter_mut() {
            if let Err(reason) = self.check_extension_name(version, name) {
                violations.push(Violation::new(
                    name.clone(),
                    ViolationKind::InvalidExtensionName(reason),
                ));
            }
            if let Err(violation) = normalize_extension_value(name, value) {
                violations.push(violation);
            }
        }
        event.extensions = extensions;

        event.data = match event.data.take() {
            Some(Data::Json(serde_json::Value::Null)) => None,
            Some(Data::Json(serde_json::Value::String(text))) => Some(Data::Text(text)),
            other => other,
        };

        if violations.is_empty() {
            Ok(event)
        } else {
            debug!(
                specversion = %version,
                id = %event.id,
                violations = violations.len(),
                "event rejected by validator"
            );
            Err(Violations::new(violations))
        }
    }

    /// Checks an extension name: `[a-z0-9]`, bounded length, not reserved.
    pub fn check_extension_name(
        &self,
        version: SpecVersion,
        name: &str,
    ) -> Result<(), ExtensionNameError> {
        if name.is_empty() {
            return Err(ExtensionNameError::Empty);
        }

        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        {
            return Err(ExtensionNameError::InvalidCharacter(c));
        }

        let len = name.chars().count();
        if len > self.options.max_extension_name_len {
            return Err(ExtensionNameError::TooLong {
                len,
                max: self.options.max_extension_name_len,
            });
        }

        if version.is_reserved(name) {
            return Err(ExtensionNameError::Reserved);
        }

        Ok(())
    }
}

/// Validates `event` with default options.
pub fn validate(event: Event) -> Result<Event, Violations> {
    Validator::default().validate(event)
}

fn check_spec_version(specversion: &str) -> Result<SpecVersion, Violation> {
    if specversion.is_empty() {
        return Err(Violation::missing("specversion"));
    }
    SpecVersion::parse(specversion).ok_or_else(|| {
        Violation::new(
            "specversion",
            ViolationKind::UnsupportedSpecVersion {
                found: specversion.to_string(),
            },
        )
    })
}

/// Checks one present context attribute and returns its canonical form.
fn check_attribute(spec: &AttributeSpec, value: &str) -> Result<String, Violation> {
    if value.is_empty() {
        return Err(Violation::new(
            spec.name,
            ViolationKind::InvalidAttributeType {
                expected: spec.kind,
                got: "empty string".to_string(),
            },
        ));
    }

    let canonical = types::canonicalize(spec.kind, value)
        .map_err(|e| Violation::invalid_type(spec.name, spec.kind, &e))?;

    if spec.attribute == Attribute::DataContentType {
        types::validate_media_type(&canonical)
            .map_err(|e| Violation::invalid_type(spec.name, spec.kind, &e))?;
    }

    Ok(canonical)
}

fn normalize_extension_value(name: &str, value: &mut ExtensionValue) -> Result<(), Violation> {
    let kind = value.kind();
    match value {
        ExtensionValue::Boolean(_) | ExtensionValue::Integer(_) | ExtensionValue::Binary(_) => {
            Ok(())
        }
        ExtensionValue::String(s)
        | ExtensionValue::Uri(s)
        | ExtensionValue::UriRef(s)
        | ExtensionValue::Timestamp(s) => {
            *s = types::canonicalize(kind, s)
                .map_err(|e| Violation::invalid_type(name, kind, &e))?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ce_testing::{deterministic_generator, fixtures};
    use rstest::rstest;

    fn minimal() -> Event {
        Event::new("1.0", fixtures::EVENT_ID, fixtures::SOURCE, fixtures::EVENT_TYPE)
    }

    fn kinds(violations: &Violations) -> Vec<(&str, &ViolationKind)> {
        violations
            .iter()
            .map(|v| (v.attribute.as_str(), &v.kind))
            .collect()
    }

    #[test]
    fn test_minimal_event_valid() {
        let event = validate(minimal()).unwrap();
        assert_eq!(event, minimal());
    }

    #[test]
    fn test_unsupported_spec_version_short_circuits() {
        let mut event = minimal();
        event.specversion = "0.2".to_string();
        event.id = String::new();
        event.source = "not a uri".to_string();

        let violations = validate(event).unwrap_err();
        assert_eq!(
            kinds(&violations),
            vec![(
                "specversion",
                &ViolationKind::UnsupportedSpecVersion {
                    found: "0.2".to_string()
                }
            )]
        );
    }

    #[test]
    fn test_missing_type_is_the_only_violation() {
        let event = Event::new("1.0", "id-1", "/mycontext", "");
        let violations = validate(event).unwrap_err();
        assert_eq!(
            kinds(&violations),
            vec![("type", &ViolationKind::MissingRequiredAttribute)]
        );
    }

    #[test]
    fn test_all_violations_reported() {
        let event = Event::builder()
            .id("")
            .source("has space")
            .event_type("t")
            .dataschema("relative/schema")
            .time_str("yesterday")
            .extension("Bad", "x")
            .assemble_with(&deterministic_generator());

        let violations = validate(event).unwrap_err();
        let attributes: Vec<_> = violations.iter().map(|v| v.attribute.as_str()).collect();
        assert_eq!(attributes, vec!["id", "source", "dataschema", "time", "Bad"]);
    }

    #[rstest]
    #[case("1.0", "source")]
    #[case("1.0", "id")]
    #[case("1.0", "data")]
    #[case("1.0", "dataschema")]
    #[case("0.3", "dataschema")]
    #[case("0.3", "schemaurl")]
    #[case("0.3", "datacontentencoding")]
    fn test_reserved_extension_names(#[case] specversion: &str, #[case] name: &str) {
        let event = minimal()
            .to_builder()
            .specversion(specversion)
            .extension(name, "x")
            .assemble_with(&deterministic_generator());

        let violations = validate(event).unwrap_err();
        let reserved = ViolationKind::InvalidExtensionName(ExtensionNameError::Reserved);
        assert!(violations
            .iter()
            .any(|v| v.attribute == name && v.kind == reserved));
    }

    #[rstest]
    #[case("", ExtensionNameError::Empty)]
    #[case("data_base64", ExtensionNameError::InvalidCharacter('_'))]
    #[case("myExt", ExtensionNameError::InvalidCharacter('E'))]
    #[case("abcdefghijklmnopqrstu", ExtensionNameError::TooLong { len: 21, max: 20 })]
    fn test_extension_name_rules(#[case] name: &str, #[case] expected: ExtensionNameError) {
        let validator = Validator::default();
        assert_eq!(
            validator.check_extension_name(SpecVersion::V1_0, name),
            Err(expected)
        );
    }

    #[test]
    fn test_extension_name_length_configurable() {
        let validator =
            Validator::new(ValidationOptions::default().with_max_extension_name_len(32));
        assert!(validator
            .check_extension_name(SpecVersion::V1_0, "abcdefghijklmnopqrstu")
            .is_ok());
    }

    #[test]
    fn test_schemaurl_is_reserved_only_in_v03() {
        let validator = Validator::default();
        assert!(validator
            .check_extension_name(SpecVersion::V1_0, "schemaurl")
            .is_ok());
        assert_eq!(
            validator.check_extension_name(SpecVersion::V0_3, "schemaurl"),
            Err(ExtensionNameError::Reserved)
        );
    }

    #[test]
    fn test_extension_values_checked() {
        let event = minimal()
            .to_builder()
            .extension(
                "goodtime",
                ExtensionValue::Timestamp("2024-01-01T00:00:00+00:00".into()),
            )
            .extension("badtime", ExtensionValue::Timestamp("noon".into()))
            .extension("baduri", ExtensionValue::Uri("relative".into()))
            .assemble_with(&deterministic_generator());

        let violations = validate(event).unwrap_err();
        let attributes: Vec<_> = violations.iter().map(|v| v.attribute.as_str()).collect();
        assert_eq!(attributes, vec!["badtime", "baduri"]);
    }

    #[test]
    fn test_normalization() {
        let event = minimal()
            .to_builder()
            .time_str("2024-01-01T12:00:00+00:00")
            .extension(
                "at",
                ExtensionValue::Timestamp("2024-01-01T12:00:00.5+00:00".into()),
            )
            .data(serde_json::json!("text payload"))
            .assemble_with(&deterministic_generator());

        let event = validate(event).unwrap();
        assert_eq!(event.time(), Some("2024-01-01T12:00:00Z"));
        assert_eq!(
            event.extension("at").unwrap().as_string(),
            "2024-01-01T12:00:00.500Z"
        );
        assert_eq!(event.data(), Some(&Data::Text("text payload".to_string())));
    }

    #[test]
    fn test_null_json_data_becomes_absent() {
        let event = minimal()
            .to_builder()
            .data(serde_json::Value::Null)
            .assemble_with(&deterministic_generator());
        assert_eq!(validate(event).unwrap().data(), None);
    }

    #[rstest]
    #[case(Attribute::DataContentType, "json")]
    #[case(Attribute::DataContentType, "")]
    #[case(Attribute::Subject, "")]
    #[case(Attribute::Subject, "two\nlines")]
    #[case(Attribute::DataSchema, "/relative")]
    fn test_invalid_optional_attribute(#[case] attribute: Attribute, #[case] value: &str) {
        let mut event = minimal();
        event.set_attribute(attribute, value.to_string());
        let violations = validate(event).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            violations.as_slice()[0].kind,
            ViolationKind::InvalidAttributeType { .. }
        ));
    }

    #[test]
    fn test_v03_schemaurl_accepts_relative_reference() {
        let mut event = minimal();
        event.specversion = "0.3".to_string();
        event.set_attribute(Attribute::DataSchema, "/schemas/v1".to_string());
        assert!(validate(event).is_ok());
    }

    #[test]
    fn test_missing_spec_version() {
        let mut event = minimal();
        event.specversion = String::new();
        let violations = validate(event).unwrap_err();
        assert_eq!(
            kinds(&violations),
            vec![("specversion", &ViolationKind::MissingRequiredAttribute)]
        );
    }
}
