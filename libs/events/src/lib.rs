//! # ce-events
//!
//! CloudEvents data model, validation and structured JSON format.
//!
//! ## Design Principles
//!
//! - Events are immutable values; a modified event is a new instance
//! - Construction never validates; [`Validator`] is the single gate
//! - Validation is all-or-nothing and reports every violation at once
//! - Attribute rules are owned by each [`SpecVersion`], selected by tag
//! - `id` and `time` defaults come from an injected [`DefaultGenerator`]
//!
//! ## Producing
//!
//! ```
//! use ce_events::{json, Event};
//!
//! let event = Event::builder()
//!     .source("/mycontext")
//!     .event_type("com.example.someevent")
//!     .datacontenttype("application/json")
//!     .data(serde_json::json!({"key": "value"}))
//!     .extension("myext", "42")
//!     .build()
//!     .unwrap();
//!
//! let text = json::to_json(&event).unwrap();
//! assert!(text.starts_with(r#"{"specversion":"1.0""#));
//! ```
//!
//! ## Consuming
//!
//! ```
//! use ce_events::json::{self, Decoded};
//!
//! let text = r#"{"specversion":"1.0","id":"1","source":"/s","type":"t","myext":true}"#;
//! let Decoded::Single(event) = json::from_json(text).unwrap() else {
//!     unreachable!()
//! };
//! assert_eq!(event.event_type(), "t");
//! ```

mod batch;
mod error;
mod event;
pub mod json;
pub mod types;
mod validate;
mod version;

pub use batch::Batch;
pub use error::{EventError, ExtensionNameError, TypeError, Violation, ViolationKind, Violations};
pub use event::{Data, Event, EventBuilder, ExtensionValue, Extensions};
pub use types::AttributeKind;
pub use validate::{validate, ValidationOptions, Validator, DEFAULT_MAX_EXTENSION_NAME_LEN};
pub use version::{
    Attribute, AttributeSpec, BinaryEncoding, SpecVersion, BASE64_ENCODING, DATA, DATA_BASE64,
    DATA_CONTENT_ENCODING,
};

/// Re-export the default generator so producers need only this crate.
pub use ce_id::{Clock, DefaultGenerator, EntropySource, GeneratedId};
