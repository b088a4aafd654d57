//! The live table of in-flight invocations and its point-in-time snapshots.
//!
//! [`LiveTable`] is owned by the status authority and never shared. Readers
//! only ever see a [`Snapshot`], which is a deep copy taken between two
//! events.

use super::event::{Event, EventKind};
use crate::{id::InvocationId, operation::Operation};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One in-flight invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub id: InvocationId,
    pub operation: Arc<Operation>,
    pub started_at: Instant,
}

impl Invocation {
    /// Time elapsed between the start of the invocation and `now`.
    ///
    /// Saturates to zero if `now` precedes the start.
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }
}

/// An event that contradicts the table's contents.
///
/// This can only happen if an event was lost or duplicated on its way to the
/// authority, so the table no longer reflects reality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("begin for invocation {0} which is already live")]
    DuplicateBegin(InvocationId),
    #[error("end for invocation {0} which is not live")]
    UnknownEnd(InvocationId),
}

/// The set of currently running invocations, keyed by id.
#[derive(Debug, Default)]
pub struct LiveTable {
    entries: HashMap<InvocationId, Invocation>,
}

impl LiveTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one event into the table.
    ///
    /// `Begin` inserts a record started at the event's timestamp, `End`
    /// removes the record with the same id. The table is left untouched when
    /// an error is returned.
    ///
    /// # Errors
    ///
    /// Returns an [`InvariantViolation`] for a `Begin` whose id is already
    /// live or an `End` whose id is not.
    pub fn apply(&mut self, event: Event) -> Result<(), InvariantViolation> {
        match event.kind {
            EventKind::Begin => {
                if self.entries.contains_key(&event.id) {
                    return Err(InvariantViolation::DuplicateBegin(event.id));
                }
                self.entries.insert(
                    event.id,
                    Invocation {
                        id: event.id,
                        operation: event.operation,
                        started_at: event.occurred_at,
                    },
                );
                Ok(())
            }
            EventKind::End => self
                .entries
                .remove(&event.id)
                .map(|_| ())
                .ok_or(InvariantViolation::UnknownEnd(event.id)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies the current contents into an independent [`Snapshot`], ordered
    /// by id.
    pub fn snapshot(&self) -> Snapshot {
        let mut entries: Vec<_> = self.entries.values().cloned().collect();
        entries.sort_unstable_by_key(|inv| inv.id);
        Snapshot {
            taken_at: Instant::now(),
            entries,
        }
    }
}

/// An immutable copy of the live table at one instant.
#[derive(Debug, Clone)]
pub struct Snapshot {
    taken_at: Instant,
    entries: Vec<Invocation>,
}

impl Snapshot {
    /// The instant the copy was made.
    pub const fn taken_at(&self) -> Instant {
        self.taken_at
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Invocation> {
        self.entries.iter()
    }

    pub fn contains(&self, id: InvocationId) -> bool {
        self.entries.iter().any(|inv| inv.id == id)
    }

    /// Ids of every live invocation, ascending.
    pub fn ids(&self) -> Vec<InvocationId> {
        self.entries.iter().map(|inv| inv.id).collect()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Invocation;
    type IntoIter = core::slice::Iter<'a, Invocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Request;

    fn op(name: &str) -> Arc<Operation> {
        Arc::new(Operation::from_fn(name, "test", |_req: Request| async {
            Ok(String::new())
        }))
    }

    #[test]
    fn begin_inserts_and_end_removes() {
        let alpha = op("/alpha");
        let mut table = LiveTable::new();

        table.apply(Event::begin(1, alpha.clone())).unwrap();
        table.apply(Event::begin(2, alpha.clone())).unwrap();
        assert_eq!(table.len(), 2);

        table.apply(Event::end(1, alpha.clone())).unwrap();
        let snap = table.snapshot();
        assert_eq!(snap.ids(), vec![2]);

        table.apply(Event::end(2, alpha)).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn begin_keeps_event_timestamp() {
        let alpha = op("/alpha");
        let begin = Event::begin(7, alpha);
        let at = begin.occurred_at;

        let mut table = LiveTable::new();
        table.apply(begin).unwrap();

        let snap = table.snapshot();
        let inv = snap.iter().next().unwrap();
        assert_eq!(inv.started_at, at);
        assert_eq!(inv.operation.name(), "/alpha");
    }

    #[test]
    fn end_for_unknown_id_is_rejected() {
        let alpha = op("/alpha");
        let mut table = LiveTable::new();

        assert_eq!(
            table.apply(Event::end(3, alpha.clone())),
            Err(InvariantViolation::UnknownEnd(3))
        );

        table.apply(Event::begin(3, alpha.clone())).unwrap();
        table.apply(Event::end(3, alpha.clone())).unwrap();
        assert_eq!(
            table.apply(Event::end(3, alpha)),
            Err(InvariantViolation::UnknownEnd(3))
        );
    }

    #[test]
    fn duplicate_begin_is_rejected_without_overwriting() {
        let alpha = op("/alpha");
        let beta = op("/beta");
        let mut table = LiveTable::new();

        table.apply(Event::begin(5, alpha)).unwrap();
        assert_eq!(
            table.apply(Event::begin(5, beta)),
            Err(InvariantViolation::DuplicateBegin(5))
        );

        let snap = table.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.iter().next().unwrap().operation.name(), "/alpha");
    }

    #[test]
    fn snapshot_is_isolated_from_later_mutation() {
        let alpha = op("/alpha");
        let mut table = LiveTable::new();
        table.apply(Event::begin(1, alpha.clone())).unwrap();

        let before = table.snapshot();

        table.apply(Event::end(1, alpha.clone())).unwrap();
        table.apply(Event::begin(2, alpha)).unwrap();

        assert_eq!(before.ids(), vec![1]);
        assert!(before.contains(1));
        assert!(!before.contains(2));
        assert_eq!(table.snapshot().ids(), vec![2]);
    }

    #[test]
    fn snapshot_is_ordered_by_id() {
        let alpha = op("/alpha");
        let mut table = LiveTable::new();
        for id in [9, 3, 27, 1] {
            table.apply(Event::begin(id, alpha.clone())).unwrap();
        }
        assert_eq!(table.snapshot().ids(), vec![1, 3, 9, 27]);
    }

    #[test]
    fn elapsed_saturates_before_start() {
        let inv = Invocation {
            id: 1,
            operation: op("/alpha"),
            started_at: Instant::now() + Duration::from_secs(1),
        };
        assert_eq!(inv.elapsed_at(Instant::now()), Duration::ZERO);
    }
}
