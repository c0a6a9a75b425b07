//! Event batches.

use crate::{Event, EventError};

/// An ordered, non-empty sequence of events sharing one `specversion`.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    events: Vec<Event>,
}

impl Batch {
    /// Creates a batch, checking it is non-empty and version-consistent.
    ///
    /// Members are not validated here; encoding validates each one.
    pub fn new(events: Vec<Event>) -> Result<Self, EventError> {
        let Some(first) = events.first() else {
            return Err(EventError::EmptyBatch);
        };

        if let Some((index, event)) = events
            .iter()
            .enumerate()
            .find(|(_, e)| e.specversion() != first.specversion())
        {
            return Err(EventError::BatchSpecVersionMismatch {
                index,
                expected: first.specversion().to_string(),
                found: event.specversion().to_string(),
            });
        }

        Ok(Self { events })
    }

    /// The `specversion` shared by every member.
    pub fn specversion(&self) -> &str {
        self.events
            .first()
            .map(Event::specversion)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl IntoIterator for Batch {
    type Item = Event;
    type IntoIter = std::vec::IntoIter<Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl TryFrom<Vec<Event>> for Batch {
    type Error = EventError;

    fn try_from(events: Vec<Event>) -> Result<Self, Self::Error> {
        Self::new(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(specversion: &str, id: &str) -> Event {
        Event::new(specversion, id, "/mycontext", "com.example.someevent")
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert_eq!(Batch::new(vec![]), Err(EventError::EmptyBatch));
    }

    #[test]
    fn test_mixed_versions_rejected() {
        let err = Batch::new(vec![event("1.0", "a"), event("1.0", "b"), event("0.3", "c")])
            .unwrap_err();
        assert_eq!(
            err,
            EventError::BatchSpecVersionMismatch {
                index: 2,
                expected: "1.0".to_string(),
                found: "0.3".to_string(),
            }
        );
    }

    #[test]
    fn test_order_preserved() {
        let batch = Batch::new(vec![event("0.3", "a"), event("0.3", "b")]).unwrap();
        assert_eq!(batch.specversion(), "0.3");
        assert_eq!(batch.len(), 2);
        let ids: Vec<_> = batch.iter().map(Event::id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
