use super::{
    event::Event,
    table::{LiveTable, Snapshot},
};
use tokio::sync::{mpsc, oneshot};

/// A request to the status authority.
///
/// Events and snapshot requests share one ordered queue, so a snapshot
/// requested after an event was sent always reflects that event.
#[derive(Debug)]
pub(crate) enum Command {
    Event(Event),
    Snapshot { response: oneshot::Sender<Snapshot> },
    Shutdown { response: oneshot::Sender<()> },
}

/// The status authority: sole owner of the [`LiveTable`].
///
/// Processes one [`Command`] at a time until a `Shutdown` is received or
/// every sender has been dropped. It never waits on anything but its own
/// queue.
///
/// # Panics
///
/// Panics when an event contradicts the table (an `End` for an id that is
/// not live, or a `Begin` for one that is). Such an event means the table
/// has diverged from reality.
pub(crate) async fn authority_loop(mut rx: mpsc::UnboundedReceiver<Command>) {
    tracing::trace!("Status authority started");

    let mut table = LiveTable::new();

    while let Some(command) = rx.recv().await {
        match command {
            Command::Event(event) => {
                tracing::debug!(
                    id = event.id,
                    operation = event.operation.name(),
                    kind = %event.kind,
                    "invocation event"
                );
                if let Err(violation) = table.apply(event) {
                    tracing::error!(%violation, live = table.len(), "live table invariant broken");
                    panic!("status authority: {violation}");
                }
            }
            Command::Snapshot { response } => {
                // The requester may have given up; nothing to do then.
                let _ = response.send(table.snapshot());
            }
            Command::Shutdown { response } => {
                tracing::debug!(live = table.len(), "Status authority received shutdown signal");
                if response.send(()).is_err() {
                    tracing::error!("Status authority failed to acknowledge shutdown");
                }
                break;
            }
        }
    }

    tracing::trace!("Status authority stopped");
}
