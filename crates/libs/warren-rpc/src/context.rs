//! The request-scoped binding of the envelope currently being dispatched.
//!
//! Handlers that want the full [`RequestEnvelope`] without threading it
//! through their own signatures can read it here while a dispatch with
//! request context enabled is in flight. The binding is task-local: it can
//! never leak between concurrently handled messages, and leaving the
//! dispatch scope — by return, error, or cancellation — always clears it.

use std::future::Future;

use crate::message::RequestEnvelope;

tokio::task_local! {
    static CURRENT_REQUEST: RequestEnvelope;
}

/// The envelope currently being dispatched on this task, if any.
///
/// `None` outside a dispatch, and always `None` when the server was
/// configured without request context.
pub fn current_request() -> Option<RequestEnvelope> {
    CURRENT_REQUEST.try_with(Clone::clone).ok()
}

/// Runs `dispatch` with `envelope` bound as the current request. The binding
/// is released when the returned future completes, on every exit path.
pub(crate) async fn scope<F: Future>(envelope: RequestEnvelope, dispatch: F) -> F::Output {
    CURRENT_REQUEST.scope(envelope, dispatch).await
}
