use super::{
    authority::{Command, authority_loop},
    event::Event,
    table::Snapshot,
};
use crate::error::{Error, Result};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Cheap, cloneable access to the status authority.
///
/// All interaction with the live table goes through this handle: events are
/// queued with [`emit`](Self::emit), copies are requested with
/// [`snapshot`](Self::snapshot). Nothing else can reach the table.
#[derive(Debug, Clone)]
pub struct StatusHandle {
    tx: mpsc::UnboundedSender<Command>,
    shutdown_token: CancellationToken,
}

impl StatusHandle {
    /// Spawns the status authority on the current Tokio runtime and returns a
    /// handle to it.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(authority_loop(rx));
        Self {
            tx,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Queues an event for the authority.
    ///
    /// The queue is unbounded, so this never waits.
    ///
    /// # Errors
    ///
    /// - [`Error::ServiceShutdown`] once [`shutdown`](Self::shutdown) has been
    ///   called.
    /// - [`Error::AuthorityUnavailable`] if the authority has stopped.
    pub fn emit(&self, event: Event) -> Result<()> {
        if self.shutdown_token.is_cancelled() {
            return Err(Error::ServiceShutdown);
        }
        self.send(Command::Event(event))
    }

    /// Queues an event regardless of shutdown state.
    ///
    /// Used for `End` events, which must follow every `Begin` that made it
    /// through.
    pub(crate) fn emit_always(&self, event: Event) -> Result<()> {
        self.send(Command::Event(event))
    }

    /// Requests an independent copy of the live table.
    ///
    /// The copy reflects every event queued through this handle before the
    /// call, and nothing queued after the authority answered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthorityUnavailable`] if the authority has stopped.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let (response, rx) = oneshot::channel();
        self.send(Command::Snapshot { response })?;
        rx.await.map_err(|_| Error::AuthorityUnavailable)
    }

    /// Refuses every later `Begin` on all clones of this handle.
    ///
    /// `End` events and snapshot requests are still served, so invocations
    /// already running can finish and be observed leaving the table.
    pub fn refuse_new(&self) {
        self.shutdown_token.cancel();
    }

    /// Returns `true` once [`refuse_new`](Self::refuse_new) or
    /// [`shutdown`](Self::shutdown) has been called on any clone of this
    /// handle.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Stops the authority.
    ///
    /// New `Begin` events are refused from this point on. The authority
    /// acknowledges and exits; any `End` still in flight afterwards is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthorityUnavailable`] if the authority had already
    /// stopped.
    pub async fn shutdown(&self) -> Result<()> {
        self.refuse_new();

        let (response, rx) = oneshot::channel();
        self.send(Command::Shutdown { response })?;
        rx.await.map_err(|_| Error::AuthorityUnavailable)
    }

    fn send(&self, command: Command) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| Error::AuthorityUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{Operation, Request};
    use std::sync::Arc;

    fn op(name: &str) -> Arc<Operation> {
        Arc::new(Operation::from_fn(name, "test", |_req: Request| async {
            Ok(String::new())
        }))
    }

    #[tokio::test]
    async fn snapshot_reflects_events_sent_before_it() {
        let status = StatusHandle::spawn();
        let alpha = op("/alpha");

        status.emit(Event::begin(1, alpha.clone())).unwrap();
        status.emit(Event::begin(2, alpha.clone())).unwrap();
        status.emit(Event::end(1, alpha)).unwrap();

        let snap = status.snapshot().await.unwrap();
        assert_eq!(snap.ids(), vec![2]);
    }

    #[tokio::test]
    async fn shutdown_refuses_new_begins_but_accepts_ends() {
        let status = StatusHandle::spawn();
        let alpha = op("/alpha");
        status.emit(Event::begin(1, alpha.clone())).unwrap();

        status.clone().refuse_new();

        assert!(status.is_shut_down());
        assert_eq!(
            status.emit(Event::begin(2, alpha.clone())),
            Err(Error::ServiceShutdown)
        );
        status.emit_always(Event::end(1, alpha)).unwrap();
        assert!(status.snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn requests_fail_after_authority_stops() {
        let status = StatusHandle::spawn();
        status.shutdown().await.unwrap();

        // Let the authority task finish and drop its receiver.
        tokio::task::yield_now().await;
        while !status.tx.is_closed() {
            tokio::task::yield_now().await;
        }

        assert_eq!(status.snapshot().await.unwrap_err(), Error::AuthorityUnavailable);
        assert_eq!(status.shutdown().await, Err(Error::AuthorityUnavailable));
    }

    #[tokio::test]
    async fn unknown_end_terminates_authority() {
        let status = StatusHandle::spawn();

        status.emit(Event::end(99, op("/alpha"))).unwrap();

        assert_eq!(status.snapshot().await.unwrap_err(), Error::AuthorityUnavailable);
    }
}
