//! The wrapper that brackets every operation call with `Begin`/`End` events.

use crate::{
    error::{Error, Result},
    id::{IdSource, InvocationId},
    operation::{Operation, Request, Verb},
    status::{Event, StatusHandle},
};
use std::sync::Arc;

/// RAII guard for one tracked invocation.
///
/// Emits `Begin` when created and the matching `End` when dropped. Because
/// the `End` lives in `Drop`, it is sent on every exit path: normal return,
/// handler error, panic unwinding, or the enclosing future being dropped
/// mid-call.
pub struct InvocationGuard {
    id: InvocationId,
    operation: Arc<Operation>,
    status: StatusHandle,
}

impl InvocationGuard {
    /// Emits `Begin` for `id` and arms the guard.
    ///
    /// # Errors
    ///
    /// Fails if the authority refuses the `Begin`. No guard is created in that
    /// case, so no `End` will follow.
    pub fn begin(id: InvocationId, operation: Arc<Operation>, status: StatusHandle) -> Result<Self> {
        status.emit(Event::begin(id, operation.clone()))?;
        Ok(Self {
            id,
            operation,
            status,
        })
    }

    pub const fn id(&self) -> InvocationId {
        self.id
    }
}

impl Drop for InvocationGuard {
    fn drop(&mut self) {
        if let Err(e) = self
            .status
            .emit_always(Event::end(self.id, self.operation.clone()))
        {
            tracing::warn!(id = self.id, operation = self.operation.name(), "failed to emit end: {e}");
        }
    }
}

/// Runs one call of `operation` under in-flight tracking.
///
/// 1. Rejects non-`GET` verbs and requests the handler does not validate,
///    before any id is issued.
/// 2. Takes an id from `ids` and emits `Begin`.
/// 3. Calls the handler, holding an [`InvocationGuard`] across the call so
///    `End` is emitted however the call finishes.
///
/// # Errors
///
/// - [`Error::MethodNotAllowed`] / [`Error::InvalidRequest`] for rejected
///   requests (nothing tracked).
/// - [`Error::ServiceShutdown`] / [`Error::AuthorityUnavailable`] if `Begin`
///   could not be emitted.
/// - Whatever the handler returns.
#[tracing::instrument(skip_all, fields(operation = operation.name(), id = tracing::field::Empty))]
pub async fn invoke(
    operation: Arc<Operation>,
    request: Request,
    ids: &dyn IdSource,
    status: &StatusHandle,
) -> Result<String> {
    if request.verb != Verb::Get {
        return Err(Error::MethodNotAllowed {
            method: request.verb.to_string(),
        });
    }
    operation.handler().validate(&request)?;

    let id = ids.next_id();
    tracing::Span::current().record("id", id);

    let _guard = InvocationGuard::begin(id, operation.clone(), status.clone())?;

    let result = operation.handler().call(request).await;
    if let Err(e) = &result {
        tracing::debug!("handler failed: {e}");
    }
    result
}
