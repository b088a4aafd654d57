//! Operations and the handler contract they are built on.
//!
//! An [`Operation`] is a named, documented unit of work. Its [`Handler`] is an
//! opaque callable: the tracker never looks inside it, it only brackets each
//! call with `Begin`/`End` events.

use crate::error::Result;
use core::fmt;
use core::future::Future;
use futures::future::{BoxFuture, FutureExt};
use std::collections::BTreeMap;
use std::sync::Arc;

/// The request verb, reduced to what the wrapper needs to decide on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Other(String),
}

impl Verb {
    /// Parses a verb as it appears on the wire. Matching is case-sensitive,
    /// the same as HTTP method tokens.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "GET" => Self::Get,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transport-independent inbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub verb: Verb,
    pub params: BTreeMap<String, String>,
}

impl Request {
    pub fn new(verb: Verb) -> Self {
        Self {
            verb,
            params: BTreeMap::new(),
        }
    }

    /// A `GET` request with no parameters.
    pub fn get() -> Self {
        Self::new(Verb::Get)
    }

    /// Adds a parameter, replacing any earlier value under the same key.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Returns the parameter value, or `None` when absent.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// The work behind an [`Operation`].
///
/// `validate` runs before an invocation id is issued. Anything it rejects is a
/// client error and leaves no trace in the status table. `call` runs between
/// the `Begin` and `End` events; its failure does not affect `End` emission.
pub trait Handler: Send + Sync + 'static {
    /// Checks the request before any tracking happens.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`](crate::Error::InvalidRequest) when the
    /// request cannot be served.
    fn validate(&self, _request: &Request) -> Result<()> {
        Ok(())
    }

    /// Runs the operation and produces the response body.
    fn call(&self, request: Request) -> BoxFuture<'_, Result<String>>;
}

/// Adapts an async closure into a [`Handler`].
pub struct FnHandler<F> {
    f: F,
}

impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    fn call(&self, request: Request) -> BoxFuture<'_, Result<String>> {
        (self.f)(request).boxed()
    }
}

/// Wraps `f` so it can be used as a [`Handler`].
pub fn handler_fn<F>(f: F) -> FnHandler<F> {
    FnHandler { f }
}

/// A named, documented operation.
///
/// Immutable once built. The name doubles as the routing key.
#[derive(Clone)]
pub struct Operation {
    name: String,
    description: String,
    handler: Arc<dyn Handler>,
}

impl Operation {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: impl Handler,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            handler: Arc::new(handler),
        }
    }

    /// Builds an operation from an async closure.
    ///
    /// # Example
    /// ```
    /// use remotecmd::{Operation, Request};
    ///
    /// let op = Operation::from_fn("/ping", "Replies pong", |_req: Request| async {
    ///     Ok("pong\n".to_string())
    /// });
    /// assert_eq!(op.name(), "/ping");
    /// ```
    pub fn from_fn<F, Fut>(name: impl Into<String>, description: impl Into<String>, f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        Self::new(name, description, handler_fn(f))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
