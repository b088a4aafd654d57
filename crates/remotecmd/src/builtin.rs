//! Operations every service carries: the listing and the status report.

use crate::{
    error::Result,
    operation::{Handler, Operation, Request},
    registry::{HELP_NAME, STATUS_NAME},
    render,
    status::StatusHandle,
};
use futures::future::{BoxFuture, FutureExt};
use std::sync::{Arc, OnceLock};

/// Serves the listing rendered once the registry is complete.
pub(crate) struct ListingHandler {
    listing: Arc<OnceLock<String>>,
}

impl Handler for ListingHandler {
    fn call(&self, _request: Request) -> BoxFuture<'_, Result<String>> {
        let body = self.listing.get().cloned().unwrap_or_default();
        futures::future::ready(Ok(body)).boxed()
    }
}

pub(crate) fn help_operation(listing: Arc<OnceLock<String>>) -> Operation {
    Operation::new(HELP_NAME, "Returns this text", ListingHandler { listing })
}

/// Renders a snapshot of the live table.
pub(crate) struct StatusHandler {
    status: StatusHandle,
}

impl Handler for StatusHandler {
    fn call(&self, _request: Request) -> BoxFuture<'_, Result<String>> {
        async move {
            self.status
                .snapshot()
                .await
                .map(|snapshot| render::status_table(&snapshot))
        }
        .boxed()
    }
}

pub(crate) fn status_operation(status: StatusHandle) -> Operation {
    Operation::new(STATUS_NAME, "Currently running commands", StatusHandler { status })
}
