use crate::{id::InvocationId, operation::Operation};
use core::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Which edge of an invocation an [`Event`] marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Begin,
    End,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Begin => f.write_str("begin"),
            Self::End => f.write_str("end"),
        }
    }
}

/// A lifecycle notification sent from an invocation to the status authority.
///
/// Events are transient: the authority folds them into its live table and
/// drops them.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: InvocationId,
    pub operation: Arc<Operation>,
    pub kind: EventKind,
    pub occurred_at: Instant,
}

impl Event {
    pub fn new(id: InvocationId, operation: Arc<Operation>, kind: EventKind) -> Self {
        Self {
            id,
            operation,
            kind,
            occurred_at: Instant::now(),
        }
    }

    pub fn begin(id: InvocationId, operation: Arc<Operation>) -> Self {
        Self::new(id, operation, EventKind::Begin)
    }

    pub fn end(id: InvocationId, operation: Arc<Operation>) -> Self {
        Self::new(id, operation, EventKind::End)
    }
}
