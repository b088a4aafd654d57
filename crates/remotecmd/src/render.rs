//! Plain-text renderings served by the listing and status operations.

use crate::{operation::Operation, status::Snapshot};
use core::fmt::Write;

/// Header row of the status table.
pub const STATUS_HEADER: &str = "No\tId\tDur (ms)\tCommand";

/// Renders the operation listing, one `name<TAB>description` line per
/// operation, in the order given.
pub fn listing<'a>(operations: impl IntoIterator<Item = &'a Operation>) -> String {
    let mut out = String::from("Available commands:\n\n");
    for op in operations {
        // Writing into a `String` cannot fail.
        let _ = writeln!(out, "{}\t{}", op.name(), op.description());
    }
    out
}

/// Renders a snapshot as a tab-separated table.
///
/// Rows follow the snapshot's order. Durations are measured up to the
/// instant the snapshot was taken and truncated to whole milliseconds.
pub fn status_table(snapshot: &Snapshot) -> String {
    let taken_at = snapshot.taken_at();
    let mut out = String::with_capacity(32 * (snapshot.len() + 1));
    out.push_str(STATUS_HEADER);
    out.push('\n');

    for (n, inv) in snapshot.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}",
            n + 1,
            inv.id,
            inv.elapsed_at(taken_at).as_millis(),
            inv.operation.name()
        );
    }
    out
}
