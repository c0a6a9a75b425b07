//! The generated identifier type.

use crate::{IdError, Ulid};

/// Length of the canonical base32 rendering.
const ENCODED_LEN: usize = 26;

/// A generated, lexicographically sortable event identifier.
///
/// Wraps a ULID. The string form is what lands in the CloudEvents `id`
/// attribute; callers are free to use any other non-empty string instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeneratedId(Ulid);

impl GeneratedId {
    /// Builds an ID from a millisecond timestamp and random bits.
    ///
    /// Only the low 48 bits of `timestamp_ms` and the low 80 bits of
    /// `random` are kept.
    #[must_use]
    pub fn from_parts(timestamp_ms: u64, random: u128) -> Self {
        Self(Ulid::from_parts(timestamp_ms, random))
    }

    /// Creates an ID from a raw ULID.
    #[must_use]
    pub const fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    /// Returns the underlying ULID.
    #[must_use]
    pub const fn ulid(&self) -> Ulid {
        self.0
    }

    /// Returns the timestamp portion in milliseconds since the Unix epoch.
    #[must_use]
    pub fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }

    /// Parses an ID from its 26-character base32 form.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        if s.is_empty() {
            return Err(IdError::Empty);
        }

        if s.len() != ENCODED_LEN {
            return Err(IdError::InvalidLength(s.len()));
        }

        let ulid = s
            .parse::<Ulid>()
            .map_err(|e| IdError::InvalidUlid(e.to_string()))?;

        Ok(Self(ulid))
    }
}

impl std::fmt::Display for GeneratedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for GeneratedId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<GeneratedId> for String {
    fn from(id: GeneratedId) -> Self {
        id.to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================
