//! Default generation of `id` and `time` attribute values.
//!
//! The generator reads wall-clock time and entropy through the [`Clock`] and
//! [`EntropySource`] traits so tests can substitute deterministic sources.
//! Both traits require `Send + Sync`; one generator may be shared by any
//! number of producers.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::GeneratedId;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Returns the current UTC instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Source of random bits for identifiers.
pub trait EntropySource: Send + Sync {
    /// Returns fresh random bits. Only the low 80 bits are used.
    fn next_u128(&self) -> u128;
}

/// Wall clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Entropy from the thread-local CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngEntropy;

impl EntropySource for ThreadRngEntropy {
    fn next_u128(&self) -> u128 {
        rand::random()
    }
}

/// Supplies values for attributes the caller left unset.
#[derive(Clone)]
pub struct DefaultGenerator {
    clock: Arc<dyn Clock>,
    entropy: Arc<dyn EntropySource>,
}

impl DefaultGenerator {
    /// Creates a generator over the given clock and entropy source.
    pub fn new(clock: impl Clock + 'static, entropy: impl EntropySource + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
            entropy: Arc::new(entropy),
        }
    }

    /// Creates a generator backed by the system clock and thread RNG.
    pub fn system() -> Self {
        Self::new(SystemClock, ThreadRngEntropy)
    }

    /// Generates a fresh identifier stamped with the clock's current time.
    ///
    /// Instants before the Unix epoch are clamped to zero.
    pub fn generate_id(&self) -> GeneratedId {
        let millis = u64::try_from(self.clock.now().timestamp_millis()).unwrap_or(0);
        GeneratedId::from_parts(millis, self.entropy.next_u128())
    }

    /// Returns the current instant for the `time` attribute.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

impl Default for DefaultGenerator {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for DefaultGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultGenerator").finish_non_exhaustive()
    }
}
