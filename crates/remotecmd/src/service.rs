//! The service context: registry, id source and status authority in one
//! explicitly constructed value.
//!
//! A [`Service`] is built once at startup with a [`ServiceBuilder`] and
//! cloned into whatever transport serves it. There is no process-wide state;
//! dropping every clone (after [`Service::shutdown`]) tears everything down.

use crate::{
    builtin,
    error::{Error, Result},
    id::{AtomicIdSource, IdSource},
    invocation::invoke,
    operation::{Operation, Request},
    registry::Registry,
    render,
    status::{Snapshot, StatusHandle},
};
use core::time::Duration;
use std::sync::{Arc, OnceLock};
use tokio::time::{Instant, sleep};

/// How often [`Service::shutdown`] re-checks the live table while draining.
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Collects operations before the registry is frozen into a [`Service`].
pub struct ServiceBuilder {
    registry: Registry,
    ids: Arc<dyn IdSource>,
    status: StatusHandle,
    listing: Arc<OnceLock<String>>,
}

impl ServiceBuilder {
    /// Starts from an empty registry, an [`AtomicIdSource`] and the given
    /// status authority.
    pub fn new(status: StatusHandle) -> Self {
        Self {
            registry: Registry::new(),
            ids: Arc::new(AtomicIdSource::new()),
            status,
            listing: Arc::new(OnceLock::new()),
        }
    }

    /// Replaces the id source.
    #[must_use]
    pub fn with_id_source(mut self, ids: impl IdSource + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    /// Registers the `/help` listing and the `/status` report.
    ///
    /// # Errors
    ///
    /// Fails if either name is already registered.
    pub fn with_builtins(self) -> Result<Self> {
        let help = builtin::help_operation(self.listing.clone());
        let status = builtin::status_operation(self.status.clone());
        self.register(help)?.register(status)
    }

    /// Registers one operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateOperation`] if the name is already taken.
    pub fn register(mut self, operation: Operation) -> Result<Self> {
        self.registry.register(operation)?;
        Ok(self)
    }

    /// Freezes the registry and renders the listing.
    pub fn build(self) -> Service {
        let listing = render::listing(self.registry.operations().iter().map(|op| &**op));
        // `build` consumes the builder, so the cell is always empty here.
        let _ = self.listing.set(listing);

        Service {
            registry: Arc::new(self.registry),
            ids: self.ids,
            status: self.status,
        }
    }
}

/// A ready-to-serve command service.
///
/// Cloning is cheap; every clone shares the same registry, id source and
/// status authority.
#[derive(Clone)]
pub struct Service {
    registry: Arc<Registry>,
    ids: Arc<dyn IdSource>,
    status: StatusHandle,
}

impl Service {
    /// Spawns a status authority on the current Tokio runtime and returns a
    /// builder around it.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::new(StatusHandle::spawn())
    }

    /// Dispatches `request` to the operation routed under `route` and runs it
    /// under in-flight tracking.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownOperation`] if nothing is routed under `route` and
    ///   no default route exists.
    /// - Anything [`invoke`] returns.
    pub async fn handle(&self, route: &str, request: Request) -> Result<String> {
        let operation = self
            .registry
            .resolve(route)
            .ok_or_else(|| Error::UnknownOperation {
                name: route.to_owned(),
            })?;
        invoke(operation, request, self.ids.as_ref(), &self.status).await
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub const fn status(&self) -> &StatusHandle {
        &self.status
    }

    /// A copy of the live table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthorityUnavailable`] if the authority has stopped.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        self.status.snapshot().await
    }

    /// Gracefully shuts the tracker down.
    ///
    /// - Refuses new invocations.
    /// - Waits up to `drain_timeout` for running invocations to finish.
    /// - Stops the status authority.
    ///
    /// Returns the number of invocations still running when the authority
    /// was stopped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthorityUnavailable`] if the authority was already
    /// gone.
    pub async fn shutdown(&self, drain_timeout: Duration) -> Result<usize> {
        // === Phase 0: Stop accepting new invocations ===
        tracing::info!("Refusing new invocations");
        self.status.refuse_new();

        // === Phase 1: Wait for in-flight invocations to drain ===
        let deadline = Instant::now() + drain_timeout;
        let mut live = self.status.snapshot().await?.len();
        tracing::info!("Draining in-flight invocations ({live} active)");

        while live > 0 && Instant::now() < deadline {
            sleep(DRAIN_POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now()))).await;
            live = self.status.snapshot().await?.len();
        }

        if live == 0 {
            tracing::debug!("All in-flight invocations drained");
        } else {
            tracing::warn!("Graceful drain timed out ({live} invocations still active)");
        }

        // === Phase 2: Stop the authority ===
        self.status.shutdown().await?;
        tracing::info!("Status authority shut down");

        Ok(live)
    }
}
