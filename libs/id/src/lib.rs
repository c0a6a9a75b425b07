//! # ce-id
//!
//! Event identifiers and default attribute generation for CloudEvents.
//!
//! ## Design Principles
//!
//! - Generated IDs are ULIDs: 48-bit millisecond timestamp + 80 random bits
//! - The canonical string form is 26 characters of Crockford base32
//! - Strings sort lexicographically in creation order (per millisecond)
//! - Clock and entropy are injected, never read from hidden globals
//!
//! ## Example
//!
//! ```
//! use ce_id::DefaultGenerator;
//!
//! let generator = DefaultGenerator::system();
//! let id = generator.generate_id();
//! assert_eq!(id.to_string().len(), 26);
//! ```

mod error;
mod generator;
mod types;

pub use error::IdError;
pub use generator::{Clock, DefaultGenerator, EntropySource, SystemClock, ThreadRngEntropy};
pub use types::GeneratedId;

/// Re-export ulid for consumers that need raw ULID operations
pub use ulid::Ulid;
