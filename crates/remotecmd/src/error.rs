//! Error types for command dispatch and in-flight tracking.
//!
//! [`Error`] covers every caller-facing failure of the service. Client input
//! errors are raised before an invocation id is issued, so they never reach
//! the status authority. Handler failures are raised after `Begin` has been
//! emitted; the invocation guard still emits the matching `End`.
//!
//! ## Error Cases
//! - `MethodNotAllowed`: the request used a verb other than `GET`.
//! - `InvalidRequest`: the request was malformed or a parameter did not parse.
//! - `UnknownOperation`: no route matched and no default route is installed.
//! - `Handler`: the underlying operation failed.
//! - `AuthorityUnavailable`: the status authority is gone (it panicked on an
//!   invariant breach or was never started).
//! - `ServiceShutdown`: the tracker has been shut down.
//! - `DuplicateOperation`: two operations were registered under one name.
//!
//! Invariant breaches inside the authority are not represented here. They are
//! fatal and terminate the authority task.

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the command service.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// Only read-only `GET` requests are accepted.
    #[error("Method not allowed: {method}")]
    MethodNotAllowed { method: String },

    /// The request was malformed or carried an unparsable parameter.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// No operation is routed under this name.
    #[error("Unknown operation: {name}")]
    UnknownOperation { name: String },

    /// The operation's handler failed.
    #[error("Operation {operation} failed: {reason}")]
    Handler { operation: String, reason: String },

    /// The status authority stopped receiving requests.
    #[error("Status authority is unavailable")]
    AuthorityUnavailable,

    /// The tracker is shutting down and refuses new invocations.
    #[error("Service is shutting down")]
    ServiceShutdown,

    /// An operation with the same name is already registered.
    #[error("Operation {name} is already registered")]
    DuplicateOperation { name: String },
}

impl Error {
    /// Shorthand for [`Error::InvalidRequest`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::Handler`].
    pub fn handler(operation: impl Into<String>, reason: impl ToString) -> Self {
        Self::Handler {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns `true` for errors caused by the caller's input.
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MethodNotAllowed { .. } | Self::InvalidRequest { .. } | Self::UnknownOperation { .. }
        )
    }
}
