//! In-flight tracking: the status authority and the types it exchanges.
//!
//! A single Tokio task (the *authority*) owns the [`LiveTable`]. Callers talk
//! to it exclusively through a [`StatusHandle`], which queues [`Event`]s and
//! requests [`Snapshot`]s over one ordered, unbounded MPSC channel. There is
//! no lock around the table; serialisation comes from the authority handling
//! one message at a time.
//!
//! ```text
//! invocation 1 ──┐
//! invocation 2 ──┼── Begin/End ──► authority ──► LiveTable
//! invocation N ──┘                    │
//! status reader ── Snapshot ──────────┘──► Snapshot (deep copy)
//! ```
//!
//! ## Submodules
//!
//! - `event` - [`Event`] and [`EventKind`].
//! - `table` - [`LiveTable`], [`Invocation`], [`Snapshot`].
//! - `authority` - the authority loop.
//! - `handle` - [`StatusHandle`], the only way in.

mod authority;
mod event;
mod handle;
mod table;

pub use event::{Event, EventKind};
pub use handle::StatusHandle;
pub use table::{InvariantViolation, Invocation, LiveTable, Snapshot};
