//! Test support for the ce-* crates.
//!
//! Nothing here is meant for production use.

use std::sync::atomic::{AtomicU64, Ordering};

use ce_id::{Clock, DefaultGenerator, EntropySource};
use chrono::{DateTime, Utc};

pub mod fixtures;

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Entropy that counts up from a starting value.
#[derive(Debug, Default)]
pub struct SequenceEntropy(AtomicU64);

impl SequenceEntropy {
    pub fn starting_at(start: u64) -> Self {
        Self(AtomicU64::new(start))
    }
}

impl EntropySource for SequenceEntropy {
    fn next_u128(&self) -> u128 {
        u128::from(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

/// A generator frozen at [`fixtures::fixed_instant`] whose first ID is
/// [`fixtures::FIRST_GENERATED_ID`].
pub fn deterministic_generator() -> DefaultGenerator {
    DefaultGenerator::new(
        FixedClock::new(fixtures::fixed_instant()),
        SequenceEntropy::starting_at(1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_generator() {
        let generator = deterministic_generator();
        assert_eq!(
            generator.generate_id().to_string(),
            fixtures::FIRST_GENERATED_ID
        );
        assert_eq!(generator.now(), fixtures::fixed_instant());
        assert_ne!(
            generator.generate_id().to_string(),
            fixtures::FIRST_GENERATED_ID
        );
    }
}
